use crate::models::changeset::Changeset;
use crate::models::event::CalendarEvent;

pub const DEFAULT_HEADER: &str = "**Roosterwijziging:** @everyone";

const ADDED_MARKER: &str = "🟢";
const REMOVED_MARKER: &str = "🔴";
const MODIFIED_MARKER: &str = "✏️";

/// Renders a changeset into the announcement posted to the channel.
#[derive(Debug, Clone)]
pub struct ChangeMessageService {
    header: String,
}

impl Default for ChangeMessageService {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER)
    }
}

impl ChangeMessageService {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    /// Returns `None` for an empty changeset; there is nothing to announce.
    pub fn build_message(&self, changeset: &Changeset) -> Option<String> {
        if changeset.is_empty() {
            return None;
        }

        let mut lines = vec![self.header.clone()];
        for event in &changeset.added {
            lines.push(event_line(ADDED_MARKER, event));
        }
        for event in &changeset.removed {
            lines.push(event_line(REMOVED_MARKER, event));
        }
        for change in &changeset.modified {
            lines.push(format!(
                "- {} **{}**",
                MODIFIED_MARKER,
                date_label(&change.before)
            ));
            lines.push(format!(
                "   • *Vorige:* **{}** {}",
                change.before.name,
                time_range(&change.before)
            ));
            lines.push(format!(
                "   • *Nieuwe:* **{}** {}",
                change.after.name,
                time_range(&change.after)
            ));
        }
        Some(lines.join("\n"))
    }
}

fn event_line(marker: &str, event: &CalendarEvent) -> String {
    format!(
        "- {} **{}** {}, **{}**",
        marker,
        date_label(event),
        time_range(event),
        event.name
    )
}

/// Day and month of the start, e.g. `05-03`.
pub fn date_label(event: &CalendarEvent) -> String {
    event.start.format("%d-%m").to_string()
}

/// Start and end wall-clock times in the feed's own offset, e.g. `14:00 - 16:00`.
pub fn time_range(event: &CalendarEvent) -> String {
    format!(
        "{} - {}",
        event.start.format("%H:%M"),
        event.end.format("%H:%M")
    )
}
