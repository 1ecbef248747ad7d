use chrono::{NaiveDate, NaiveTime};

/// Parses a human-entered date strictly shaped `DD-MM-YYYY`.
///
/// The components are rebuilt through the calendar, so well-shaped but
/// non-existent dates (31-02-2024) come back as `None` just like malformed
/// input.
pub fn parse_entry_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'-' || bytes[5] != b'-' {
        return None;
    }

    let day = &text[0..2];
    let month = &text[3..5];
    let year = &text[6..10];

    if ![day, month, year]
        .iter()
        .all(|part| part.bytes().all(|b| b.is_ascii_digit()))
    {
        return None;
    }

    NaiveDate::from_ymd_opt(
        year.parse().ok()?,
        month.parse().ok()?,
        day.parse().ok()?,
    )
}

/// `YYYY-MM-DD`, the ordering persisted to storage.
pub fn to_storage_format(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `DD/MM/YYYY`, the ordering shown in the UI.
pub fn to_display_format(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Worked duration between two times of day on the same reference day,
/// formatted `HH:MM:SS`. `None` when either side is missing (open record).
pub fn elapsed(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> Option<String> {
    let start = clock_in?;
    let end = clock_out?;

    let total_secs = end.signed_duration_since(start).num_seconds();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    Some(format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
}
