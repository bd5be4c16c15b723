/// Minimum percent change that counts as growth or decline for a window length.
///
/// | Window (days) | Threshold |
/// |---------------|-----------|
/// | <= 7          | 1.0 %     |
/// | <= 30         | 2.0 %     |
/// | > 30          | 3.0 %     |
pub fn threshold(window_days: u32) -> f64 {
    match window_days {
        0..=7 => 1.0,
        8..=30 => 2.0,
        _ => 3.0,
    }
}

/// Human-readable name of a window length, used in streak rationales.
pub fn window_label(window_days: u32) -> &'static str {
    match window_days {
        7 => "week",
        30 => "month",
        _ => "90 days",
    }
}
