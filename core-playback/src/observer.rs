//! Progress observer interface.

/// Receives periodic position updates while a controller is playing.
///
/// The controller only keeps a weak reference. Dropping the observer is the
/// way to unsubscribe; notifications to a dropped observer are skipped.
///
/// Callbacks run on a runtime worker, outside any controller lock, so an
/// observer may call back into the controller.
pub trait ProgressObserver: Send + Sync {
    /// `current_seconds` is the playback position, `total_formatted` the
    /// total duration as `MM:SS`.
    fn on_progress(&self, current_seconds: f64, total_formatted: &str);
}

/// Formats seconds as zero-padded `MM:SS`.
///
/// Fractions are truncated. Minutes are not wrapped at 60, so a 75-minute
/// track is `75:00`. Negative or non-finite input yields `00:00`.
pub fn format_mm_ss(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }

    let total = seconds as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
