use std::path::PathBuf;

pub struct Message {
    pub kind: MessageType,
    pub slot: usize,
}

impl Message {
    #[must_use]
    pub const fn new(kind: MessageType, slot: usize) -> Self {
        Self { kind, slot }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageType {
    /// `None` means the alarm rings silently
    AlarmTriggered { sound: Option<PathBuf> },
    // snoozed, dismissed, switched off or its window ran out
    AlarmStopped,
}
