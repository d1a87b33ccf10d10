use std::{
    collections::HashMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, Sender},
    thread,
};

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::communication::{Message, MessageType};

/// Handle to the audio thread, alarm sounds loop until they get stopped.
#[derive(Debug, Clone)]
pub struct Player {
    sender: Sender<Message>,
}

impl Player {
    #[must_use]
    pub fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        if let Err(e) = thread::Builder::new()
            .name("alarm-player".to_string())
            .spawn(move || run(&receiver))
        {
            log::error!("couldn't start the audio thread: {e}");
        }
        Self { sender }
    }

    pub fn start(&self, slot: usize, sound: Option<PathBuf>) {
        self.send(Message::new(MessageType::AlarmTriggered { sound }, slot));
    }

    pub fn stop(&self, slot: usize) {
        self.send(Message::new(MessageType::AlarmStopped, slot));
    }

    fn send(&self, message: Message) {
        if self.sender.send(message).is_err() {
            log::error!("audio thread is gone, alarms will only be visual");
        }
    }
}

fn open_sound(stream: &OutputStream, path: &Path) -> Result<Sink, Box<dyn std::error::Error>> {
    let sound = BufReader::new(File::open(path)?);
    // repeat until stopped
    let input = Decoder::new(sound)?.repeat_infinite();
    let sink = Sink::connect_new(stream.mixer());
    sink.append(input);
    sink.play();
    Ok(sink)
}

fn run(receiver: &Receiver<Message>) {
    let stream = match rodio::OutputStreamBuilder::open_default_stream() {
        Ok(stream) => Some(stream),
        Err(e) => {
            log::error!("couldn't open an audio device: {e}");
            None
        }
    };
    let mut sinks: HashMap<usize, Sink> = HashMap::new();
    for Message { kind, slot } in receiver {
        match kind {
            MessageType::AlarmTriggered { sound: Some(path) } => {
                let Some(stream) = &stream else {
                    continue;
                };
                match open_sound(stream, &path) {
                    Ok(sink) => {
                        log::info!("alarm {} playing {}", slot + 1, path.display());
                        if let Some(old) = sinks.insert(slot, sink) {
                            old.stop();
                        }
                    }
                    Err(e) => log::error!("couldn't play {}: {e}", path.display()),
                }
            }
            MessageType::AlarmTriggered { sound: None } => {
                log::info!("alarm {} ringing silently", slot + 1);
            }
            MessageType::AlarmStopped => {
                if let Some(sink) = sinks.remove(&slot) {
                    log::info!("alarm {} stopped", slot + 1);
                    sink.stop();
                }
            }
        }
    }
    log::debug!("audio thread shutting down");
}
