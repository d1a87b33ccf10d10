//! Walks the clock through simulated mornings, minute by minute, the way the
//! app's 1 second poll does.

use best_clock::{
    alarm::{AlarmState, SnoozeOutcome, ALARM_DURATION_MINUTES},
    config::Config,
    monitor::{AlarmEvent, AlarmMonitor},
};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tempfile::tempdir;

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn config_with_alarm(hour: u32, minute: u32) -> Config {
    let mut config = Config::default();
    config.alarms[0].set_time(NaiveTime::from_hms_opt(hour, minute, 0).unwrap());
    config.alarms[0].set_active(true);
    config
}

/// every minute in `[from, to)` at which slot 0 rings
fn ringing_minutes(
    config: &mut Config,
    monitor: &mut AlarmMonitor,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Vec<NaiveDateTime> {
    let mut minutes = vec![];
    let mut now = from;
    while now < to {
        monitor.poll(config.alarms.as_mut_slice(), now);
        if monitor.states()[0] == AlarmState::Ringing {
            minutes.push(now);
        }
        now += Duration::minutes(1);
    }
    minutes
}

#[test]
fn rings_for_the_whole_window_and_no_longer() {
    let mut config = config_with_alarm(6, 30);
    let mut monitor = AlarmMonitor::new();
    let minutes = ringing_minutes(&mut config, &mut monitor, at(3, 6, 0), at(3, 8, 0));
    assert_eq!(minutes.len(), ALARM_DURATION_MINUTES as usize);
    assert_eq!(minutes.first(), Some(&at(3, 6, 30)));
    assert_eq!(minutes.last(), Some(&at(3, 6, 44)));
}

#[test]
fn window_crossing_midnight() {
    let mut config = config_with_alarm(23, 50);
    let mut monitor = AlarmMonitor::new();
    let minutes = ringing_minutes(&mut config, &mut monitor, at(3, 23, 0), at(4, 1, 0));
    assert_eq!(minutes.len(), ALARM_DURATION_MINUTES as usize);
    assert_eq!(minutes.last(), Some(&at(4, 0, 4)));
}

#[test]
fn stopped_after_midnight() {
    let mut config = config_with_alarm(23, 55);
    let mut monitor = AlarmMonitor::new();
    let minutes = ringing_minutes(&mut config, &mut monitor, at(3, 23, 50), at(4, 0, 5));
    assert_eq!(minutes.len(), 10);

    config.alarms[0].dismiss(at(4, 0, 5));
    assert_eq!(config.alarms[0].reset_at(), Some(at(4, 0, 10)));
    monitor.poll(config.alarms.as_mut_slice(), at(4, 0, 7));
    assert_eq!(monitor.states()[0], AlarmState::Deferred);
    monitor.poll(config.alarms.as_mut_slice(), at(4, 0, 10));
    assert_eq!(monitor.states()[0], AlarmState::Idle);
    assert_eq!(config.alarms[0].reset_at(), None);
}

#[test]
fn snooze_then_stop() {
    let mut config = config_with_alarm(7, 0);
    let mut monitor = AlarmMonitor::new();

    assert_eq!(
        monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 0)),
        vec![AlarmEvent::StartedRinging(0)]
    );

    let snoozed = config.alarms[0].snooze(
        at(3, 7, 4) + Duration::seconds(50),
        config.snooze_minutes,
        config.snooze_limit,
    );
    assert_eq!(snoozed, SnoozeOutcome::Snoozed(at(3, 7, 13)));

    let minutes = ringing_minutes(&mut config, &mut monitor, at(3, 7, 5), at(3, 7, 14));
    assert_eq!(minutes.first(), Some(&at(3, 7, 13)));

    config.alarms[0].dismiss(at(3, 7, 14));
    assert_eq!(
        monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 14)),
        vec![AlarmEvent::StoppedRinging(0)]
    );
    // deferral ends with the scheduled window, 07:15
    assert!(ringing_minutes(&mut config, &mut monitor, at(3, 7, 14), at(3, 9, 0)).is_empty());
    assert_eq!(config.alarms[0].reset_at(), None);

    // and tomorrow it rings again
    let minutes = ringing_minutes(&mut config, &mut monitor, at(4, 6, 55), at(4, 7, 5));
    assert_eq!(minutes.first(), Some(&at(4, 7, 0)));
}

#[test]
fn snooze_limit_ends_the_episode() {
    let mut config = config_with_alarm(7, 0);
    config.snooze_minutes = 1;
    config.snooze_limit = 1;
    let mut monitor = AlarmMonitor::new();

    monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 0));
    assert!(matches!(
        config.alarms[0].snooze(at(3, 7, 0), 1, 1),
        SnoozeOutcome::Snoozed(_)
    ));
    monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 1));
    assert_eq!(monitor.states()[0], AlarmState::Ringing);
    assert_eq!(
        config.alarms[0].snooze(at(3, 7, 1), 1, 1),
        SnoozeOutcome::LimitReached
    );
    monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 2));
    assert_eq!(monitor.states()[0], AlarmState::Deferred);
}

#[test]
fn switching_off_silences_and_forgets() {
    let mut config = config_with_alarm(7, 0);
    let mut monitor = AlarmMonitor::new();
    monitor.poll(config.alarms.as_mut_slice(), at(3, 7, 0));
    config.alarms[0].snooze(at(3, 7, 1), 5, 0);
    config.alarms[0].set_active(false);
    assert_eq!(config.alarms[0].snooze_until(), None);
    assert!(ringing_minutes(&mut config, &mut monitor, at(3, 7, 1), at(3, 8, 0)).is_empty());

    // back on inside the window rings straight away
    config.alarms[0].set_active(true);
    assert!(config.alarms[0].is_ringing(at(3, 7, 10)));
}

#[test]
fn saved_alarms_survive_a_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut config = config_with_alarm(5, 15);
    config.alarms[2].set_time(NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    config.set_brightness(0.4);
    config.color_index = 3;
    config.save(&path).unwrap();

    let mut restarted = Config::load(&path).unwrap();
    assert_eq!(restarted, config);
    assert_eq!(restarted.alarms[0].hhmm(), 515);
    assert!(!restarted.alarms[2].is_active());

    let mut monitor = AlarmMonitor::new();
    assert_eq!(
        monitor.poll(restarted.alarms.as_mut_slice(), at(3, 5, 20)),
        vec![AlarmEvent::StartedRinging(0)]
    );
}
