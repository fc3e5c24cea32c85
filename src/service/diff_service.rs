use std::collections::HashMap;

use crate::models::changeset::{Changeset, Modification};
use crate::models::event::CalendarEvent;

/// Snapshot keyed by uid. Entries keep the position of a uid's first
/// occurrence while a later duplicate replaces the record itself.
struct KeyedSnapshot<'a> {
    entries: Vec<&'a CalendarEvent>,
    index: HashMap<&'a str, usize>,
}

impl<'a> KeyedSnapshot<'a> {
    fn build(events: &'a [CalendarEvent]) -> Self {
        let mut entries: Vec<&'a CalendarEvent> = Vec::with_capacity(events.len());
        let mut index: HashMap<&'a str, usize> = HashMap::with_capacity(events.len());
        for event in events {
            match index.get(event.uid.as_str()) {
                Some(&pos) => entries[pos] = event,
                None => {
                    index.insert(event.uid.as_str(), entries.len());
                    entries.push(event);
                }
            }
        }
        Self { entries, index }
    }

    fn get(&self, uid: &str) -> Option<&'a CalendarEvent> {
        self.index.get(uid).map(|&pos| self.entries[pos])
    }

    fn contains(&self, uid: &str) -> bool {
        self.index.contains_key(uid)
    }
}

pub struct DiffService;

impl DiffService {
    /// Compares two snapshots by uid.
    ///
    /// Added records follow `new`'s order, removed records follow `old`'s
    /// order and modified pairs follow `new`'s order.
    pub fn diff(old: &[CalendarEvent], new: &[CalendarEvent]) -> Changeset {
        let old_keyed = KeyedSnapshot::build(old);
        let new_keyed = KeyedSnapshot::build(new);

        let added = new_keyed
            .entries
            .iter()
            .filter(|event| !old_keyed.contains(&event.uid))
            .map(|event| (*event).clone())
            .collect();

        let removed = old_keyed
            .entries
            .iter()
            .filter(|event| !new_keyed.contains(&event.uid))
            .map(|event| (*event).clone())
            .collect();

        let modified = new_keyed
            .entries
            .iter()
            .filter_map(|after| {
                let before = old_keyed.get(&after.uid)?;
                (before != *after).then(|| Modification {
                    before: before.clone(),
                    after: (*after).clone(),
                })
            })
            .collect();

        Changeset {
            added,
            removed,
            modified,
        }
    }
}
