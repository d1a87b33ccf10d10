use std::{error::Error, path::Path, path::PathBuf};

use best_clock::{
    alarm::{parse_time, Alarm, SoundMode},
    config::Config,
    error::{ConfigError, Result},
    player::Player,
    Clock,
};
use chrono::Local;
use clap::{Parser, Subcommand};
use eframe::{egui::ViewportBuilder, run_native};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// use this config file instead of the default one
    #[clap(long, short)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// write a fresh config and create the sounds directory
    Init {
        #[clap(long, short)]
        force: bool,
    },
    /// show the alarms and what they are doing
    List,
    /// set the time of an alarm (HH:MM or HHMM) and switch it on
    Set { slot: usize, time: String },
    Enable { slot: usize },
    Disable { slot: usize },
    /// put an alarm back to its defaults
    Reset { slot: usize },
    Appearance {
        #[clap(long)]
        color: Option<usize>,
        #[clap(long)]
        font: Option<usize>,
        #[clap(long)]
        brightness: Option<f32>,
    },
}

fn main() -> std::result::Result<(), Box<dyn Error>> {
    // initilize the logger
    if let Err(e) = simple_file_logger::init_logger!("best_clock") {
        eprintln!("couldn't initialize logger: {e:?}");
    }

    let args = Args::parse();
    let config_path = match args.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    match args.command {
        Some(command) => run_command(command, &config_path).map_err(Into::into),
        None => run_gui(config_path),
    }
}

fn run_gui(config_path: PathBuf) -> std::result::Result<(), Box<dyn Error>> {
    let sounds_path = Config::sounds_path()?;
    let player = Player::spawn();
    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Best Clock")
            .with_fullscreen(true),
        ..Default::default()
    };
    log::info!("starting clock with config {}", config_path.display());
    run_native(
        "Best Clock",
        native_options,
        Box::new(move |_| Ok(Box::new(Clock::new(config_path, sounds_path, player)))),
    )
    .map_err(Into::into)
}

/// unlike the gui a broken file is an error here, so it doesn't get overwritten
fn load_for_edit(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        Ok(Config::new())
    }
}

fn set_active(config_path: &Path, slot: usize, active: bool) -> Result<()> {
    let slot = Config::slot_index(slot)?;
    let mut config = load_for_edit(config_path)?;
    config.alarms[slot].set_active(active);
    config.save(config_path)
}

fn describe_sound(config: &Config, alarm: &Alarm) -> String {
    match alarm.sound_mode {
        SoundMode::Sounds => config
            .sounds
            .get(alarm.sound_index)
            .map_or_else(|| "sound ?".to_string(), ToString::to_string),
        SoundMode::Music => alarm.song.as_ref().map_or_else(
            || "music (none picked)".to_string(),
            |song| format!("music:{}", song.display()),
        ),
        SoundMode::Silence => SoundMode::Silence.to_string(),
    }
}

fn run_command(command: Command, config_path: &Path) -> Result<()> {
    match command {
        Command::Init { force } => {
            if force || !config_path.exists() {
                Config::new().save(config_path)?;
                println!("wrote {}", config_path.display());
            } else {
                println!(
                    "{} already exists, use --force to overwrite it",
                    config_path.display()
                );
            }
            let sounds_path = Config::sounds_path()?;
            std::fs::create_dir_all(&sounds_path).map_err(|source| ConfigError::Write {
                path: sounds_path.clone(),
                source,
            })?;
            println!("alarm sounds go in {}", sounds_path.display());
        }
        Command::List => {
            let config = Config::load_or_default(config_path);
            let now = Local::now().naive_local();
            for (slot, alarm) in config.alarms.iter().enumerate() {
                println!(
                    "{}  {}  {:<3}  {:<8}  {}{}",
                    slot + 1,
                    alarm.time().format("%H:%M"),
                    if alarm.is_active() { "on" } else { "off" },
                    alarm.state(now).to_string(),
                    describe_sound(&config, alarm),
                    if alarm.vibrate { "  flash" } else { "" }
                );
            }
            println!(
                "color {}  font {}  brightness {:.2}  snooze {} min",
                config.color(),
                config.font(),
                config.brightness(),
                config.snooze_minutes
            );
        }
        Command::Set { slot, time } => {
            let slot = Config::slot_index(slot)?;
            let parsed = parse_time(&time).ok_or(ConfigError::InvalidTime(time))?;
            let mut config = load_for_edit(config_path)?;
            config.alarms[slot].set_time(parsed);
            config.alarms[slot].set_active(true);
            config.save(config_path)?;
        }
        Command::Enable { slot } => set_active(config_path, slot, true)?,
        Command::Disable { slot } => set_active(config_path, slot, false)?,
        Command::Reset { slot } => {
            let slot = Config::slot_index(slot)?;
            let mut config = load_for_edit(config_path)?;
            config.reset_alarm(slot);
            config.save(config_path)?;
        }
        Command::Appearance {
            color,
            font,
            brightness,
        } => {
            let mut config = load_for_edit(config_path)?;
            if let Some(color) = color {
                config.color_index = color;
            }
            if let Some(font) = font {
                config.font_index = font;
            }
            if let Some(brightness) = brightness {
                config.set_brightness(brightness);
            }
            config.normalize();
            config.save(config_path)?;
        }
    }
    Ok(())
}
