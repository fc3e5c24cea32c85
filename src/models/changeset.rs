use super::event::CalendarEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub before: CalendarEvent,
    pub after: CalendarEvent,
}

/// Classified difference between two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub added: Vec<CalendarEvent>,
    pub removed: Vec<CalendarEvent>,
    pub modified: Vec<Modification>,
}

impl Changeset {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}
