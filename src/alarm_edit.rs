use std::path::{Path, PathBuf};

use chrono::{NaiveTime, Timelike};
use eframe::egui::{self, RichText, ScrollArea, Window};

use crate::{
    alarm::{Alarm, SoundMode},
    config::Sound,
    widgets::{dial_values, Knob},
};

const KNOB_RADIUS: f32 = 56.0;

/// A draft of one alarm slot while the alarm editor is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmBuilder {
    pub slot: usize,
    pub hour: u32,
    pub minute: u32,
    pub active: bool,
    pub vibrate: bool,
    pub sound_mode: SoundMode,
    pub sound_index: usize,
    pub song: Option<PathBuf>,
}

pub enum EditingState {
    Cancelled,
    Editing,
    /// put the slot back to its defaults
    Reset,
    Done(AlarmBuilder),
}

impl AlarmBuilder {
    #[must_use]
    pub fn new(slot: usize, alarm: &Alarm) -> Self {
        // if the alarm is set for 5:00 the editor starts at 5:00
        Self {
            slot,
            hour: alarm.time().hour(),
            minute: alarm.time().minute(),
            active: alarm.is_active(),
            vibrate: alarm.vibrate,
            sound_mode: alarm.sound_mode,
            sound_index: alarm.sound_index,
            song: alarm.song.clone(),
        }
    }

    #[must_use]
    pub fn time(&self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour.min(23), self.minute.min(59), 0).unwrap_or_default()
    }

    /// write the draft into the slot
    ///
    /// goes through the alarm's setters so a changed time or active flag
    /// drops any snooze or deferral
    pub fn apply(self, alarm: &mut Alarm) {
        alarm.set_time(self.time());
        if alarm.is_active() != self.active {
            alarm.set_active(self.active);
        }
        alarm.vibrate = self.vibrate;
        alarm.sound_mode = self.sound_mode;
        alarm.sound_index = self.sound_index;
        alarm.song = self.song;
    }

    pub(crate) fn render_time_editor(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            ui.label(RichText::new(format!("{:02}:{:02}", self.hour, self.minute)).heading());
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Hour");
                    ui.add(Knob::new(&mut self.hour, dial_values(24, 3)).radius(Some(KNOB_RADIUS)));
                });
                ui.vertical(|ui| {
                    ui.label("Minute");
                    let hand = ui.visuals().selection.bg_fill;
                    ui.add(
                        Knob::new(&mut self.minute, dial_values(60, 5))
                            .radius(Some(KNOB_RADIUS))
                            .hand_color(Some(hand)),
                    );
                });
            });
        });
    }

    pub(crate) fn render_sound_editor(&mut self, ui: &mut egui::Ui, sounds: &[Sound]) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                for mode in [SoundMode::Sounds, SoundMode::Music, SoundMode::Silence] {
                    ui.selectable_value(&mut self.sound_mode, mode, mode.to_string());
                }
            });
            match self.sound_mode {
                SoundMode::Sounds => Self::render_alarm_sound_selector(&mut self.sound_index, ui, sounds),
                SoundMode::Music => self.render_song_picker(ui),
                SoundMode::Silence => {
                    ui.label("no sound");
                }
            }
            ui.checkbox(&mut self.vibrate, "flash while ringing");
        });
    }

    pub(crate) fn render_alarm_sound_selector(sound_index: &mut usize, ui: &mut egui::Ui, sounds: &[Sound]) {
        // keep the list from making the editor too big
        ScrollArea::vertical()
            .id_salt("alarm sounds")
            .max_height(120.0)
            .show(ui, |ui| {
                for (i, sound) in sounds.iter().enumerate() {
                    ui.selectable_value(sound_index, i, sound.name());
                }
            });
    }

    fn render_song_picker(&mut self, ui: &mut egui::Ui) {
        ui.label(
            self.song
                .as_deref()
                .and_then(Path::file_name)
                .map_or_else(|| "no song picked".to_string(), |name| name.to_string_lossy().into_owned()),
        );
        if ui.button("Choose song…").clicked() {
            let file_dialog = rfd::FileDialog::new()
                .set_title("Pick alarm song")
                .add_filter("audio", &["mp3", "wav", "ogg", "flac", "m4a"]);
            let file_dialog = match directories::UserDirs::new()
                .and_then(|u| u.audio_dir().map(Path::to_path_buf))
            {
                Some(audio_path) => file_dialog.set_directory(audio_path),
                None => file_dialog,
            };
            if let Some(path) = file_dialog.pick_file() {
                log::info!("picked song {}", path.display());
                self.song = Some(path);
            }
        }
    }

    pub fn render_alarm_editor(&mut self, ctx: &egui::Context, sounds: &[Sound]) -> EditingState {
        let mut ret = EditingState::Editing;
        Window::new(format!("Alarm {}", self.slot + 1))
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.checkbox(&mut self.active, "active");
                ui.horizontal(|ui| {
                    self.render_time_editor(ui);
                    ui.separator();
                    self.render_sound_editor(ui, sounds);
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("done").clicked() {
                        ret = EditingState::Done(self.clone());
                    } else if ui.button("cancel").clicked() {
                        ret = EditingState::Cancelled;
                    } else if ui.button("reset").clicked() {
                        ret = EditingState::Reset;
                    }
                });
            });
        ret
    }
}
