use std::{fmt, path::PathBuf};

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize};

/// how many alarm slots the clock has, slots are never added or removed
pub const ALARM_COUNT: usize = 3;

/// how long an alarm rings (and how long a dismissal defers it) in minutes
pub const ALARM_DURATION_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlarmState {
    #[default]
    Idle,
    Snoozing,
    Ringing,
    Deferred,
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::Snoozing => "snoozing",
            Self::Ringing => "ringing",
            Self::Deferred => "deferred",
        })
    }
}

/// what the alarm plays when it goes off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundMode {
    /// one of the preset sounds
    #[default]
    Sounds,
    /// a song picked by the user
    Music,
    /// no sound, the display flashes (if vibrate is on)
    Silence,
}

impl fmt::Display for SoundMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sounds => "sounds",
            Self::Music => "music",
            Self::Silence => "silence",
        })
    }
}

/// result of asking a ringing alarm to snooze
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOutcome {
    /// the alarm wakes up again at the given time
    Snoozed(NaiveDateTime),
    /// the snooze limit was hit, the alarm got deferred instead
    LimitReached,
    /// nothing to snooze
    NotRinging,
}

const fn always_true() -> bool {
    true
}

fn default_time() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default()
}

fn whole_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// alarms go off on the minute, so seconds in a hand edited file are dropped
fn deserialize_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
    toml_datetime_compat::deserialize(deserializer).map(whole_minute)
}

/// one alarm slot
///
/// the runtime fields (snooze and deferral) are never written to disk and are
/// thrown away whenever the alarm is switched on or off or its time changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    #[serde(
        serialize_with = "toml_datetime_compat::serialize",
        deserialize_with = "deserialize_time",
        default = "default_time"
    )]
    time: NaiveTime,
    #[serde(default)]
    active: bool,
    #[serde(default = "always_true")]
    pub vibrate: bool,
    #[serde(default)]
    pub sound_mode: SoundMode,
    #[serde(default)]
    pub sound_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<PathBuf>,
    /// when a snoozed alarm starts ringing again
    #[serde(skip)]
    snooze_until: Option<NaiveDateTime>,
    #[serde(skip)]
    snooze_count: u32,
    #[serde(skip)]
    deactivated_at: Option<NaiveDateTime>,
    /// when the deferral started by `deactivated_at` runs out
    #[serde(skip)]
    reset_at: Option<NaiveDateTime>,
}

impl Default for Alarm {
    fn default() -> Self {
        Self::new(default_time())
    }
}

impl PartialEq for Alarm {
    /// only compares what gets saved
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time
            && self.active == other.active
            && self.vibrate == other.vibrate
            && self.sound_mode == other.sound_mode
            && self.sound_index == other.sound_index
            && self.song == other.song
    }
}

#[must_use]
pub fn truncate_to_minute(time: NaiveDateTime) -> NaiveDateTime {
    time.date()
        .and_hms_opt(time.hour(), time.minute(), 0)
        .unwrap_or(time)
}

/// `HHMM` as a number, ie 0730 for half past seven
#[must_use]
pub fn from_hhmm(hhmm: u16) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(u32::from(hhmm / 100), u32::from(hhmm % 100), 0)
}

/// accepts both `HH:MM` and `HHMM`
#[must_use]
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim();
    if input.contains(':') {
        NaiveTime::parse_from_str(input, "%H:%M").ok()
    } else if (3..=4).contains(&input.len()) {
        input.parse().ok().and_then(from_hhmm)
    } else {
        None
    }
}

impl Alarm {
    #[must_use]
    pub fn new(time: NaiveTime) -> Self {
        Self {
            time: whole_minute(time),
            active: false,
            vibrate: true,
            sound_mode: SoundMode::default(),
            sound_index: 0,
            song: None,
            snooze_until: None,
            snooze_count: 0,
            deactivated_at: None,
            reset_at: None,
        }
    }

    #[must_use]
    pub const fn time(&self) -> NaiveTime {
        self.time
    }

    #[must_use]
    pub fn hhmm(&self) -> u16 {
        // hour < 24 and minute < 60 so this always fits
        u16::try_from(self.time.hour() * 100 + self.time.minute()).unwrap_or_default()
    }

    /// changing the time starts over, an old snooze or dismissal no longer applies
    pub fn set_time(&mut self, time: NaiveTime) {
        let time = whole_minute(time);
        if time != self.time {
            self.time = time;
            self.clear_runtime();
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// toggling in either direction clears snooze and deferral
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        self.clear_runtime();
    }

    /// back to the factory slot
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn snooze_until(&self) -> Option<NaiveDateTime> {
        self.snooze_until
    }

    #[must_use]
    pub const fn snooze_count(&self) -> u32 {
        self.snooze_count
    }

    #[must_use]
    pub const fn deactivated_at(&self) -> Option<NaiveDateTime> {
        self.deactivated_at
    }

    #[must_use]
    pub const fn reset_at(&self) -> Option<NaiveDateTime> {
        self.reset_at
    }

    /// start of the most recent occurrence of the alarm at or before `now`
    ///
    /// when today's alarm time is still ahead this is yesterday's, which is
    /// what lets a window that starts before midnight keep ringing after it.
    #[must_use]
    pub fn occurrence_start(&self, now: NaiveDateTime) -> NaiveDateTime {
        let now = truncate_to_minute(now);
        let today = now.date().and_time(self.time);
        if today <= now {
            today
        } else {
            today - Duration::days(1)
        }
    }

    /// whether `now` lies in `[time, time + ALARM_DURATION_MINUTES)`
    #[must_use]
    pub fn in_window(&self, now: NaiveDateTime) -> bool {
        let elapsed = truncate_to_minute(now) - self.occurrence_start(now);
        elapsed < Duration::minutes(ALARM_DURATION_MINUTES)
    }

    #[must_use]
    pub fn is_deferred(&self, now: NaiveDateTime) -> bool {
        self.reset_at.is_some_and(|reset_at| now < reset_at)
    }

    #[must_use]
    pub fn is_snoozing(&self, now: NaiveDateTime) -> bool {
        self.active && self.snooze_until.is_some_and(|wake| now < wake)
    }

    #[must_use]
    pub fn state(&self, now: NaiveDateTime) -> AlarmState {
        if !self.active {
            return AlarmState::Idle;
        }
        if self.is_deferred(now) {
            return AlarmState::Deferred;
        }
        if let Some(wake) = self.snooze_until {
            if now < wake {
                return AlarmState::Snoozing;
            }
            if now - wake < Duration::minutes(ALARM_DURATION_MINUTES) {
                return AlarmState::Ringing;
            }
            // the snoozed ring ran out, fall back to the schedule
        }
        if self.in_window(now) {
            AlarmState::Ringing
        } else {
            AlarmState::Idle
        }
    }

    #[must_use]
    pub fn is_ringing(&self, now: NaiveDateTime) -> bool {
        self.state(now) == AlarmState::Ringing
    }

    /// snooze a ringing alarm for `minutes`
    ///
    /// with a non zero `limit` the request after the `limit`th snooze defers
    /// the alarm instead.
    pub fn snooze(&mut self, now: NaiveDateTime, minutes: u32, limit: u32) -> SnoozeOutcome {
        if !self.is_ringing(now) {
            return SnoozeOutcome::NotRinging;
        }
        if limit > 0 && self.snooze_count >= limit {
            log::info!("snooze limit of {limit} reached, deferring alarm {}", self.time);
            self.dismiss(now);
            return SnoozeOutcome::LimitReached;
        }
        let wake = truncate_to_minute(now) + Duration::minutes(i64::from(minutes));
        self.snooze_until = Some(wake);
        self.snooze_count += 1;
        log::info!("alarm {} snoozed until {wake}", self.time);
        SnoozeOutcome::Snoozed(wake)
    }

    /// stop a ringing or snoozing alarm for its current occurrence
    ///
    /// the deferral runs until the scheduled window of that occurrence is over,
    /// so it can never outlast `ALARM_DURATION_MINUTES` past the alarm time.
    pub fn dismiss(&mut self, now: NaiveDateTime) {
        self.snooze_until = None;
        self.snooze_count = 0;
        self.deactivated_at = Some(now);
        self.reset_at =
            Some(self.occurrence_start(now) + Duration::minutes(ALARM_DURATION_MINUTES));
        log::info!("alarm {} deferred until {:?}", self.time, self.reset_at);
    }

    /// forget runtime state that no longer affects the alarm
    pub fn refresh(&mut self, now: NaiveDateTime) {
        if self.reset_at.is_some_and(|reset_at| now >= reset_at) {
            log::debug!("deferral of alarm {} expired", self.time);
            self.deactivated_at = None;
            self.reset_at = None;
        }
        if self.snooze_until.is_some() && self.state(now) == AlarmState::Idle {
            log::debug!("snooze of alarm {} ran out", self.time);
            self.snooze_until = None;
            self.snooze_count = 0;
        }
    }

    fn clear_runtime(&mut self) {
        self.snooze_until = None;
        self.snooze_count = 0;
        self.deactivated_at = None;
        self.reset_at = None;
    }
}
