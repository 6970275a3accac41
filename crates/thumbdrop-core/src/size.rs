//! Human-readable byte sizes.

/// Unit labels in ascending 1024 steps.
const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count for display, e.g. `"512 B"` or `"1.2 MB"`.
///
/// Uses binary (1024) steps. Plain bytes print as integers; larger
/// units get one decimal place. Sizes beyond the largest unit stay in
/// that unit.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
