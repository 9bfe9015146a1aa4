//! Byte-count formatting for display surfaces.

const UNITS: &[&str] = &["kB", "MB", "GB", "TB", "PB", "EB"];

/// Format a byte count with SI units, e.g. `1_200_000` → `"1.2 MB"`.
///
/// Counts below one kilobyte render as plain bytes.
pub fn human_readable_bytes(bytes: u64) -> String {
    if bytes < 1000 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1000.0 && unit < UNITS.len() - 1 {
        value /= 1000.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
