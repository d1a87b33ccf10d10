use chrono::NaiveDateTime;

use crate::alarm::{Alarm, AlarmState, ALARM_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmEvent {
    StartedRinging(usize),
    StoppedRinging(usize),
}

/// Watches the alarm slots between polls and reports when one starts or
/// stops ringing.
#[derive(Debug, Default)]
pub struct AlarmMonitor {
    states: [AlarmState; ALARM_COUNT],
}

impl AlarmMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn states(&self) -> &[AlarmState; ALARM_COUNT] {
        &self.states
    }

    #[must_use]
    pub fn any_ringing(&self) -> bool {
        self.states.contains(&AlarmState::Ringing)
    }

    pub fn ringing(&self) -> impl Iterator<Item = usize> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == AlarmState::Ringing)
            .map(|(slot, _)| slot)
    }

    pub fn poll(&mut self, alarms: &mut [Alarm], now: NaiveDateTime) -> Vec<AlarmEvent> {
        let mut events = vec![];
        for (slot, (alarm, previous)) in alarms.iter_mut().zip(&mut self.states).enumerate() {
            alarm.refresh(now);
            let state = alarm.state(now);
            if state == *previous {
                continue;
            }
            log::info!("alarm {} is now {state} (was {previous})", slot + 1);
            match (*previous, state) {
                (AlarmState::Ringing, _) => events.push(AlarmEvent::StoppedRinging(slot)),
                (_, AlarmState::Ringing) => events.push(AlarmEvent::StartedRinging(slot)),
                _ => {}
            }
            *previous = state;
        }
        events
    }
}
