//! Reminder cards: title prefix and date-line encodings.
//!
//! On the wire a reminder is a plain sticky note whose title starts with a
//! checkbox prefix and whose content's first line may hold `Date: YYYY-MM-DD`.
//! These helpers convert between that text encoding and the typed
//! [`NoteVariant::Reminder`](crate::doc::NoteVariant) used in memory. Nothing
//! here fails: malformed input degrades to "unset" or a placeholder.

#[cfg(test)]
#[path = "reminder_test.rs"]
mod reminder_test;

use serde::Deserialize;
use time::OffsetDateTime;
use time::macros::format_description;

/// Title prefix of a completed reminder.
pub const CHECKED_PREFIX: &str = "[x] ";

/// Title prefix of a pending reminder.
pub const UNCHECKED_PREFIX: &str = "[ ] ";

/// Titles starting with this (and no prefix) are old-style reminders.
pub const LEGACY_TITLE: &str = "Reminder";

/// Name shown when a reminder title is empty.
pub const PLACEHOLDER_NAME: &str = "Reminder Task";

/// Body written under a fresh date line.
pub const PLACEHOLDER_BODY: &str = "Write notes here...";

/// Label shown for a reminder without a usable date.
pub const UNSET_DATE_LABEL: &str = "Set date";

const DATE_LINE_PREFIX: &str = "Date: ";

/// A task record from the surrounding to-do list, used to seed reminders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `YYYY-MM-DD`, possibly empty.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: Option<String>,
}

/// Checked state and display name decoded from a reminder title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTitle {
    pub checked: bool,
    pub name: String,
}

/// Whether a sticky note title marks the note as a reminder.
#[must_use]
pub fn is_reminder_title(title: &str) -> bool {
    title.starts_with(CHECKED_PREFIX) || title.starts_with(UNCHECKED_PREFIX) || title == LEGACY_TITLE
}

/// Decode a reminder title, stripping the checkbox prefix.
#[must_use]
pub fn parse_title(title: &str) -> ReminderTitle {
    let raw = title.trim();
    let (checked, rest) = if let Some(rest) = raw.strip_prefix(CHECKED_PREFIX) {
        (true, rest)
    } else if let Some(rest) = raw.strip_prefix(UNCHECKED_PREFIX) {
        (false, rest)
    } else {
        (false, raw)
    };
    let name = if rest.is_empty() { PLACEHOLDER_NAME } else { rest };
    ReminderTitle { checked, name: name.to_string() }
}

/// Encode a reminder title with its checkbox prefix.
#[must_use]
pub fn format_title(checked: bool, name: &str) -> String {
    let prefix = if checked { CHECKED_PREFIX } else { UNCHECKED_PREFIX };
    format!("{prefix}{name}")
}

/// The `YYYY-MM-DD` value on the first content line, if it holds one.
#[must_use]
pub fn date_value(content: &str) -> Option<&str> {
    let first = content.split('\n').next().unwrap_or_default();
    let value = first.strip_prefix(DATE_LINE_PREFIX)?.trim();
    is_date_shaped(value).then_some(value)
}

/// Write `date` into the content's date line, adding one if missing.
///
/// An existing `Date: ` first line is replaced in place. Otherwise a date
/// line and a blank line are prepended to the trimmed body, or to the
/// placeholder body when the content is blank.
#[must_use]
pub fn set_date(content: &str, date: &str) -> String {
    let date_line = format!("{DATE_LINE_PREFIX}{date}");
    let mut lines: Vec<&str> = content.split('\n').collect();
    if lines.first().is_some_and(|l| l.starts_with(DATE_LINE_PREFIX)) {
        lines[0] = &date_line;
        return lines.join("\n");
    }
    let body = content.trim();
    let body = if body.is_empty() { PLACEHOLDER_BODY } else { body };
    format!("{date_line}\n\n{body}")
}

/// Short month/day label such as `"Mar 4"`, or `"Set date"` when unset or invalid.
#[must_use]
pub fn format_date_label(date: Option<&str>) -> String {
    let Some(value) = date.filter(|v| !v.is_empty()) else {
        return UNSET_DATE_LABEL.to_string();
    };
    let Ok(parsed) = time::Date::parse(value, format_description!("[year]-[month]-[day]")) else {
        return UNSET_DATE_LABEL.to_string();
    };
    match parsed.format(format_description!("[month repr:short] [day padding:none]")) {
        Ok(label) => label,
        Err(_) => UNSET_DATE_LABEL.to_string(),
    }
}

/// Initial reminder content for a task: date, time and description lines
/// (blank ones dropped) followed by the placeholder body.
#[must_use]
pub fn content_from_task(task: &Task, today: &str) -> String {
    let date = if task.date.is_empty() { today } else { task.date.as_str() };
    let lines = [
        format!("{DATE_LINE_PREFIX}{date}"),
        task.time.as_deref().filter(|t| !t.is_empty()).map(|t| format!("Time: {t}")).unwrap_or_default(),
        task.description
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(|d| format!("Description: {d}"))
            .unwrap_or_default(),
        PLACEHOLDER_BODY.to_string(),
    ];
    lines
        .into_iter()
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Today's local date as `YYYY-MM-DD` (UTC when the local offset is unknown).
#[must_use]
pub fn today() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let date = now.date();
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

fn is_date_shaped(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
