use std::time::Duration;

/// Shown while a duration is unknown, and forever when it cannot be resolved.
pub const DURATION_PLACEHOLDER: &str = "--:--";

/// Format a duration as `M:SS`, or `"N sec"` under one minute.
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{secs} sec")
    } else {
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

/// Format an elapsed/total pair for transport readouts, as `MM:SS / MM:SS`.
pub fn format_clock(elapsed: Duration, total: Option<Duration>) -> String {
    let mmss = |d: Duration| {
        let secs = d.as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    };
    match total {
        Some(t) => format!("{} / {}", mmss(elapsed), mmss(t)),
        None => format!("{} / {}", mmss(elapsed), DURATION_PLACEHOLDER),
    }
}
