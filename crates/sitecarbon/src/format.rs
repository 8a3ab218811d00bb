//! Human-scaled rendering of byte counts and emission quantities.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count with binary units, e.g. `"1.5 MB"`.
///
/// Up to two decimals, trailing zeros dropped. Gigabytes is the largest unit.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_decimals(value), UNITS[unit])
}

/// Format grams of CO2 at the most readable scale, e.g. `"860.35 mg CO₂"`.
pub fn format_emissions(grams: f64) -> String {
    if grams < 0.001 {
        format!("{:.2} μg CO₂", grams * 1_000_000.0)
    } else if grams < 1.0 {
        format!("{:.2} mg CO₂", grams * 1_000.0)
    } else if grams < 1_000.0 {
        format!("{grams:.2} g CO₂")
    } else {
        format!("{:.2} kg CO₂", grams / 1_000.0)
    }
}

/// Format milliseconds as seconds once past one second, e.g. `"2.4 s"`.
pub fn format_load_time(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms} ms")
    } else {
        format!("{:.1} s", ms as f64 / 1_000.0)
    }
}

fn trim_decimals(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
