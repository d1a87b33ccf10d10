use std::{
    fmt,
    ops::{Index, IndexMut, RangeInclusive},
    path::{Path, PathBuf},
};

use chrono::format::{Item, StrftimeItems};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{
    alarm::{Alarm, SoundMode, ALARM_COUNT},
    appearance::{ClockColor, ClockFont},
    error::{ConfigError, Result},
};

/// the display never gets darker than this
pub const MIN_BRIGHTNESS: f32 = 0.1;
pub const MAX_BRIGHTNESS: f32 = 1.0;

const fn default_brightness() -> f32 {
    MAX_BRIGHTNESS
}

/// the range of the snooze length, in minutes
pub const SNOOZE_MINUTES: RangeInclusive<u32> = 1..=30;

const fn default_snooze_minutes() -> u32 {
    9
}

fn default_time_format() -> String {
    "%H:%M".to_string()
}

fn default_sounds() -> Vec<Sound> {
    vec![
        Sound::beep_beep(),
        Sound::ring(),
        Sound::bing_bong(),
        Sound::tick_tock(),
        Sound::rain(),
    ]
}

/// The fixed alarm slots.
///
/// Stored as a plain list so hand edited files with too few or too many
/// alarms still load: missing slots get the default alarm, extra ones are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Alarm>", into = "Vec<Alarm>")]
pub struct AlarmSlots {
    slots: [Alarm; ALARM_COUNT],
}

impl AlarmSlots {
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Alarm> {
        self.slots.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Alarm> {
        self.slots.get_mut(slot)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alarm> {
        self.slots.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Alarm> {
        self.slots.iter_mut()
    }

    pub fn as_mut_slice(&mut self) -> &mut [Alarm] {
        &mut self.slots
    }
}

impl Index<usize> for AlarmSlots {
    type Output = Alarm;

    fn index(&self, slot: usize) -> &Self::Output {
        &self.slots[slot]
    }
}

impl IndexMut<usize> for AlarmSlots {
    fn index_mut(&mut self, slot: usize) -> &mut Self::Output {
        &mut self.slots[slot]
    }
}

impl From<Vec<Alarm>> for AlarmSlots {
    fn from(value: Vec<Alarm>) -> Self {
        let mut obj = Self::default();
        obj.slots
            .iter_mut()
            .zip(value)
            .for_each(|(slot, alarm)| *slot = alarm);
        obj
    }
}

impl From<AlarmSlots> for Vec<Alarm> {
    fn from(val: AlarmSlots) -> Self {
        val.slots.into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub color_index: usize,
    #[serde(default)]
    pub font_index: usize,
    #[serde(default = "default_brightness")]
    brightness: f32,
    #[serde(default = "default_snooze_minutes")]
    pub snooze_minutes: u32,
    /// 0 means snoozing as often as you like
    #[serde(default)]
    pub snooze_limit: u32,
    #[serde(default = "default_sounds")]
    pub sounds: Vec<Sound>,
    #[serde(default)]
    pub alarms: AlarmSlots,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_format: default_time_format(),
            color_index: 0,
            font_index: 0,
            brightness: default_brightness(),
            snooze_minutes: default_snooze_minutes(),
            snooze_limit: 0,
            sounds: default_sounds(),
            alarms: AlarmSlots::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// if the file can't be read or isn't a valid config
    pub fn load(path: &Path) -> Result<Self> {
        let config = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&config).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.normalize();
        Ok(config)
    }

    /// never fails, a missing or broken file gives the default config
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("{e}, using defaults");
            Self::default()
        })
    }

    /// # Errors
    /// if the config can't be serialized or written
    pub fn save(&self, path: &Path) -> Result<()> {
        let config = toml::to_string(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, config).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("saved config to {}", path.display());
        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "best_clock").ok_or(ConfigError::NoProjectDirs)
    }

    /// # Errors
    /// if there is no home directory to put the config in
    pub fn config_path() -> Result<PathBuf> {
        let mut path = Self::project_dirs()?.config_dir().to_path_buf();
        path.push("config.toml");
        Ok(path)
    }

    /// # Errors
    /// if there is no home directory to put the sounds in
    pub fn sounds_path() -> Result<PathBuf> {
        let mut path = Self::project_dirs()?.data_dir().to_path_buf();
        path.push("sounds");
        Ok(path)
    }

    #[must_use]
    pub fn is_config_present() -> bool {
        Self::config_path().is_ok_and(|path| path.exists())
    }

    #[must_use]
    pub const fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = if brightness.is_nan() {
            default_brightness()
        } else {
            brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS)
        };
    }

    /// pulls every index and level back into range after a load
    pub fn normalize(&mut self) {
        self.set_brightness(self.brightness);
        self.color_index = self.color_index.min(ClockColor::ALL.len() - 1);
        self.font_index = self.font_index.min(ClockFont::ALL.len() - 1);
        if StrftimeItems::new(&self.time_format).any(|item| matches!(item, Item::Error)) {
            log::warn!("invalid time format {:?}, using the default", self.time_format);
            self.time_format = default_time_format();
        }
        self.snooze_minutes = self
            .snooze_minutes
            .clamp(*SNOOZE_MINUTES.start(), *SNOOZE_MINUTES.end());
        if self.sounds.is_empty() {
            self.sounds = default_sounds();
        }
        let last_sound = self.sounds.len() - 1;
        for alarm in self.alarms.iter_mut() {
            alarm.sound_index = alarm.sound_index.min(last_sound);
        }
    }

    #[must_use]
    pub fn color(&self) -> ClockColor {
        ClockColor::ALL[self.color_index.min(ClockColor::ALL.len() - 1)]
    }

    #[must_use]
    pub fn font(&self) -> ClockFont {
        ClockFont::ALL[self.font_index.min(ClockFont::ALL.len() - 1)]
    }

    /// turns a 1 based slot number from the user into an index
    ///
    /// # Errors
    /// if there is no such slot
    pub fn slot_index(slot: usize) -> Result<usize> {
        if (1..=ALARM_COUNT).contains(&slot) {
            Ok(slot - 1)
        } else {
            Err(ConfigError::InvalidSlot {
                slot,
                max: ALARM_COUNT,
            })
        }
    }

    pub fn reset_alarm(&mut self, slot: usize) {
        if let Some(alarm) = self.alarms.get_mut(slot) {
            alarm.reset();
        }
    }

    /// the file an alarm should play, falling back to the first preset sound
    /// when its own sound or song is gone
    #[must_use]
    pub fn alarm_source(&self, slot: usize, sounds_dir: &Path) -> Option<PathBuf> {
        let alarm = self.alarms.get(slot)?;
        let preset = |index: usize| {
            self.sounds
                .get(index)
                .map(|sound| sound.resolve(sounds_dir))
                .filter(|path| path.exists())
        };
        let fallback = |missing: &dyn fmt::Display| {
            log::warn!("{missing} is missing, alarm {} uses the default sound", slot + 1);
            preset(0)
        };
        let source = match alarm.sound_mode {
            SoundMode::Silence => return None,
            SoundMode::Music => match &alarm.song {
                Some(song) if song.exists() => Some(song.clone()),
                Some(song) => fallback(&song.display()),
                None => fallback(&"song"),
            },
            SoundMode::Sounds => preset(alarm.sound_index).or_else(|| {
                fallback(&format!("sound {}", alarm.sound_index))
            }),
        };
        if source.is_none() {
            log::warn!("nothing to play for alarm {}, it will only flash", slot + 1);
        }
        source
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Sound {
    pub name: String,
    /// relative paths live in the sounds directory
    pub path: PathBuf,
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}",
            self.name,
            self.path
                .file_name()
                .map_or_else(|| self.path.to_string_lossy(), |name| name.to_string_lossy())
        )
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::beep_beep()
    }
}

impl Sound {
    #[must_use]
    pub const fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }

    fn preset(name: &str, file: &str) -> Self {
        Self {
            name: name.to_string(),
            path: PathBuf::from(file),
        }
    }

    #[must_use]
    pub fn ring() -> Self {
        Self::preset("ring", "ring.mp3")
    }

    #[must_use]
    pub fn bing_bong() -> Self {
        Self::preset("bing bong", "bing_bong.mp3")
    }

    #[must_use]
    pub fn tick_tock() -> Self {
        Self::preset("tick tock", "tick_tock.mp3")
    }

    #[must_use]
    pub fn beep_beep() -> Self {
        Self::preset("beep beep", "beep_beep.mp3")
    }

    #[must_use]
    pub fn rain() -> Self {
        Self::preset("rain", "rain.mp3")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    #[must_use]
    pub fn resolve(&self, sounds_dir: &Path) -> PathBuf {
        if self.path.is_absolute() {
            self.path.clone()
        } else {
            sounds_dir.join(&self.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.time_format, "%H:%M");
        assert_eq!(config.snooze_minutes, 9);
        assert_eq!(config.snooze_limit, 0);
        assert!((config.brightness() - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.alarms.iter().count(), ALARM_COUNT);
        assert!(config.alarms.iter().all(|alarm| !alarm.is_active()));
        assert_eq!(config.sounds[0].name(), "beep beep");
    }

    #[test]
    fn brightness_has_a_floor() {
        let mut config = Config::default();
        config.set_brightness(0.0);
        assert!((config.brightness() - MIN_BRIGHTNESS).abs() < f32::EPSILON);
        config.set_brightness(3.0);
        assert!((config.brightness() - MAX_BRIGHTNESS).abs() < f32::EPSILON);
        config.set_brightness(f32::NAN);
        assert!((config.brightness() - MAX_BRIGHTNESS).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_file_is_normalized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
color_index = 99
font_index = 42
brightness = 0.01
snooze_minutes = 0

[[alarms]]
time = 06:30:00
active = true
sound_mode = "music"
sound_index = 12
song = "/nowhere/song.mp3"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.color_index, ClockColor::ALL.len() - 1);
        assert_eq!(config.font_index, ClockFont::ALL.len() - 1);
        assert!((config.brightness() - MIN_BRIGHTNESS).abs() < f32::EPSILON);
        assert_eq!(config.snooze_minutes, 1);
        assert_eq!(config.alarms[0].hhmm(), 630);
        assert!(config.alarms[0].is_active());
        assert_eq!(config.alarms[0].sound_mode, SoundMode::Music);
        assert_eq!(config.alarms[0].sound_index, config.sounds.len() - 1);
        assert_eq!(config.alarms[1], Alarm::default());
        assert_eq!(config.alarms[2], Alarm::default());
    }

    #[test]
    fn broken_time_format_is_replaced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "time_format = \"%Q\"\nsnooze_minutes = 90\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.time_format, "%H:%M");
        assert_eq!(config.snooze_minutes, 30);

        let mut config = Config::default();
        config.time_format = "%l:%M %p".to_string();
        config.normalize();
        assert_eq!(config.time_format, "%l:%M %p");
    }

    #[test]
    fn saved_seconds_do_not_shift_the_alarm() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[[alarms]]\ntime = 07:00:30\nactive = true\n").unwrap();
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.alarms[0].time(), NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert!(config.alarms[0].is_ringing(now));
        assert!(!config.alarms[0].is_ringing(now + chrono::Duration::minutes(15)));
    }

    #[test]
    fn extra_alarms_are_dropped() {
        let alarms: Vec<Alarm> = (0..5)
            .map(|hour| Alarm::new(NaiveTime::from_hms_opt(hour, 0, 0).unwrap()))
            .collect();
        let slots = AlarmSlots::from(alarms);
        assert_eq!(slots.iter().count(), ALARM_COUNT);
        assert_eq!(slots[2].hhmm(), 200);
    }

    #[test]
    fn runtime_state_is_not_saved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let now = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(7, 1, 0)
            .unwrap();

        let mut config = Config::default();
        config.alarms[0].set_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        config.alarms[0].set_active(true);
        config.alarms[0].dismiss(now);
        config.save(&path).unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(!saved.contains("reset_at"));
        assert!(!saved.contains("snooze_until"));

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.alarms[0].reset_at(), None);
        assert!(loaded.alarms[0].is_ringing(now));
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "brightness = [").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert_eq!(Config::load_or_default(&path), Config::default());
        assert_eq!(
            Config::load_or_default(&dir.path().join("missing.toml")),
            Config::default()
        );
    }

    #[test]
    fn slot_numbers_are_one_based() {
        assert_eq!(Config::slot_index(1).unwrap(), 0);
        assert_eq!(Config::slot_index(3).unwrap(), 2);
        assert!(matches!(
            Config::slot_index(0),
            Err(ConfigError::InvalidSlot { slot: 0, max: 3 })
        ));
        assert!(Config::slot_index(4).is_err());
    }

    #[test]
    fn alarm_source_falls_back_to_default_sound() {
        let dir = tempdir().unwrap();
        let default_sound = dir.path().join("beep_beep.mp3");
        std::fs::write(&default_sound, b"").unwrap();
        let song = dir.path().join("song.mp3");
        std::fs::write(&song, b"").unwrap();

        let mut config = Config::default();
        // ring.mp3 was never written
        config.alarms[0].sound_index = 1;
        assert_eq!(config.alarm_source(0, dir.path()), Some(default_sound.clone()));

        config.alarms[1].sound_mode = SoundMode::Music;
        config.alarms[1].song = Some(song.clone());
        assert_eq!(config.alarm_source(1, dir.path()), Some(song));
        config.alarms[1].song = Some(dir.path().join("gone.mp3"));
        assert_eq!(config.alarm_source(1, dir.path()), Some(default_sound));

        config.alarms[2].sound_mode = SoundMode::Silence;
        assert_eq!(config.alarm_source(2, dir.path()), None);
        assert_eq!(config.alarm_source(7, dir.path()), None);
    }

    #[test]
    fn nothing_to_play_without_sound_files() {
        let dir = tempdir().unwrap();
        let config = Config::default();
        assert_eq!(config.alarm_source(0, dir.path()), None);
    }

    #[test]
    fn reset_alarm_restores_default_slot() {
        let mut config = Config::default();
        config.alarms[1].set_active(true);
        config.alarms[1].vibrate = false;
        config.reset_alarm(1);
        assert_eq!(config.alarms[1], Alarm::default());
    }
}
