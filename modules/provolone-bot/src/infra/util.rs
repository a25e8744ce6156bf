// Small helpers shared by the file-writing components.

use chrono::{DateTime, Utc};

/// Timestamp fragment for generated file names: `20250301_120000`.
pub fn file_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%S").to_string()
}

/// First `max_chars` characters of `text`, for log previews.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_timestamp_is_sortable() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(file_timestamp(now), "20250301_090507");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("🦃 Turkey", 3), "🦃 T");
        assert_eq!(preview("short", 50), "short");
    }
}
