//! Resolution tier classification
//!
//! Two classifiers exist: a heuristic over the stream path used by every
//! regeneration pass, and a width-based one applied to the SPS decoded by the
//! live stream probe.

use crate::models::Resolution;

/// Widest frame still classified as SD
pub const SD_MAX_WIDTH: u32 = 720;
/// Widest frame still classified as HD
pub const HD_MAX_WIDTH: u32 = 1080;

/// Classify a path by the first matching marker, checked case-insensitively
/// in the order `UHD`/`4K`, `HD`, `SD`. Paths without a marker are SD.
pub fn classify_path(path: &str) -> Resolution {
    let upper = path.to_uppercase();
    if upper.contains("UHD") || upper.contains("4K") {
        Resolution::Uhd
    } else if upper.contains("HD") {
        Resolution::Hd
    } else {
        Resolution::Sd
    }
}

/// Classify a decoded frame width
pub fn classify_width(width: u32) -> Resolution {
    if width <= SD_MAX_WIDTH {
        Resolution::Sd
    } else if width <= HD_MAX_WIDTH {
        Resolution::Hd
    } else {
        Resolution::Uhd
    }
}
