use chrono::{DateTime, Local};

/// Human-readable fallback for messages without a `readable_date`
/// attribute, in the same `dd.mm.yyyy hh:mm:ss` shape the backup app
/// writes, rendered in local time.
pub fn format_readable_date(timestamp_ms: i64) -> String {
    match local_time(timestamp_ms) {
        Some(dt) => dt.format("%d.%m.%Y %H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Timestamp segment for synthesized attachment file names,
/// `_yyyy-mm-dd_hh-mm-ss` with no characters a filesystem would reject
pub fn format_file_timestamp(timestamp_ms: i64) -> String {
    match local_time(timestamp_ms) {
        Some(dt) => dt.format("_%Y-%m-%d_%H-%M-%S").to_string(),
        None => format!("_{}", timestamp_ms),
    }
}

fn local_time(timestamp_ms: i64) -> Option<DateTime<Local>> {
    DateTime::from_timestamp_millis(timestamp_ms).map(|utc| utc.with_timezone(&Local))
}
