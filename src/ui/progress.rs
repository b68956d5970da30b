use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar counting performance time in milliseconds
pub fn create_playback_progress(total_duration: f64) -> ProgressBar {
    let pb = ProgressBar::new(seconds_to_millis(total_duration));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("⣀⣤⣦⣶⣷⣿ "),
    );
    pb.set_prefix("Playing");
    pb
}

pub fn update_playback_progress(pb: &ProgressBar, current: f64, total: f64, paused: bool) {
    pb.set_position(seconds_to_millis(current.min(total)));
    let status = if paused { " (paused)" } else { "" };
    pb.set_message(format!("{:.1}s / {:.1}s{}", current.min(total), total, status));
}

fn seconds_to_millis(seconds: f64) -> u64 {
    (seconds.max(0.0) * 1000.0).round() as u64
}
