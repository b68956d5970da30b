//! User interface components
//!
//! This module provides terminal output for kantanplay, including:
//! - Performance information and conversion reports
//! - A playback progress bar
//!
//! Progress is drawn with the indicatif library.

mod progress;
mod report;

pub use progress::{create_playback_progress, update_playback_progress};
pub use report::{conversion_report, performance_info};
