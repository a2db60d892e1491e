const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Human readable byte count using 1024-based units, at most two decimals.
///
/// Trailing zeros are dropped, so `1024` is `"1 KB"` and `1536` is `"1.5 KB"`.
/// Anything past terabytes is still expressed in TB.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_owned();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    let name = UNITS.get(unit).copied().unwrap_or("TB");
    format!("{trimmed} {name}")
}
