/// Formats a countdown as `MM:SS`, using total minutes (no hour rollover).
pub fn seconds_to_minutes(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Formats an accumulated duration as `HH:MM:SS`.
pub fn seconds_to_time(secs: u64) -> String {
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}
