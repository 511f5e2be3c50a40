use super::*;

// --- Titles ---

#[test]
fn detects_reminder_titles() {
    assert!(is_reminder_title("[x] Done"));
    assert!(is_reminder_title("[ ] Pending"));
    assert!(is_reminder_title("Reminder"));
    assert!(!is_reminder_title("Reminders for Friday"));
    assert!(!is_reminder_title("Reminder: call mom"));
    assert!(!is_reminder_title("New Note"));
    assert!(!is_reminder_title("[y] Nope"));
}

#[test]
fn parse_strips_prefixes() {
    assert_eq!(parse_title("[x] Pay rent"), ReminderTitle { checked: true, name: "Pay rent".into() });
    assert_eq!(parse_title("[ ] Pay rent"), ReminderTitle { checked: false, name: "Pay rent".into() });
}

#[test]
fn parse_legacy_title_is_unchecked_with_full_name() {
    assert_eq!(parse_title("Reminder"), ReminderTitle { checked: false, name: "Reminder".into() });
}

#[test]
fn parse_empty_name_uses_placeholder() {
    assert_eq!(parse_title("").name, PLACEHOLDER_NAME);
    assert_eq!(parse_title("   ").name, PLACEHOLDER_NAME);
    let prefixed_only = parse_title("[x] x");
    assert_eq!(prefixed_only.name, "x");
}

#[test]
fn format_then_parse_round_trips() {
    for checked in [true, false] {
        let title = format_title(checked, "Water plants");
        assert_eq!(parse_title(&title), ReminderTitle { checked, name: "Water plants".into() });
    }
}

// --- Date line ---

#[test]
fn date_value_reads_first_line() {
    assert_eq!(date_value("Date: 2025-03-04\n\nbody"), Some("2025-03-04"));
    assert_eq!(date_value("Date: 2025-03-04"), Some("2025-03-04"));
}

#[test]
fn date_value_rejects_malformed() {
    assert_eq!(date_value(""), None);
    assert_eq!(date_value("body\nDate: 2025-03-04"), None);
    assert_eq!(date_value("Date: 2025-3-4"), None);
    assert_eq!(date_value("Date: tomorrow"), None);
    assert_eq!(date_value("date: 2025-03-04"), None);
}

#[test]
fn set_date_replaces_existing_line() {
    let content = "Date: 2024-01-01\n\nBuy milk";
    assert_eq!(set_date(content, "2025-03-04"), "Date: 2025-03-04\n\nBuy milk");
}

#[test]
fn set_date_prepends_to_body() {
    assert_eq!(set_date("  Buy milk  ", "2025-03-04"), "Date: 2025-03-04\n\nBuy milk");
}

#[test]
fn set_date_on_blank_uses_placeholder() {
    assert_eq!(set_date("", "2025-03-04"), format!("Date: 2025-03-04\n\n{PLACEHOLDER_BODY}"));
}

#[test]
fn set_then_read_round_trips() {
    for content in ["", "notes", "Date: 1999-12-31\nold"] {
        let updated = set_date(content, "2025-03-04");
        assert_eq!(date_value(&updated), Some("2025-03-04"));
    }
}

// --- Labels ---

#[test]
fn label_formats_short_month_and_day() {
    assert_eq!(format_date_label(Some("2025-03-04")), "Mar 4");
    assert_eq!(format_date_label(Some("2025-12-25")), "Dec 25");
}

#[test]
fn label_falls_back_when_unset_or_invalid() {
    assert_eq!(format_date_label(None), UNSET_DATE_LABEL);
    assert_eq!(format_date_label(Some("")), UNSET_DATE_LABEL);
    assert_eq!(format_date_label(Some("2025-13-45")), UNSET_DATE_LABEL);
    assert_eq!(format_date_label(Some("garbage")), UNSET_DATE_LABEL);
}

// --- Tasks ---

#[test]
fn task_content_includes_present_fields() {
    let task = Task {
        id: "t1".into(),
        title: "Dentist".into(),
        description: Some("Bring card".into()),
        date: "2025-05-06".into(),
        time: Some("09:30".into()),
    };
    assert_eq!(
        content_from_task(&task, "2000-01-01"),
        "Date: 2025-05-06\nTime: 09:30\nDescription: Bring card\nWrite notes here..."
    );
}

#[test]
fn task_content_drops_blank_fields_and_defaults_date() {
    let task = Task { id: "t2".into(), title: "Gym".into(), time: Some(String::new()), ..Task::default() };
    assert_eq!(content_from_task(&task, "2025-01-02"), "Date: 2025-01-02\nWrite notes here...");
}

#[test]
fn today_is_date_shaped() {
    let value = today();
    assert_eq!(date_value(&format!("Date: {value}")), Some(value.as_str()));
}
