use color_eyre::eyre::{Result, eyre};

/// Parses `#RRGGBB` (or `RRGGBB`) into its three channels.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3]> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(eyre!("Invalid colour '{value}', expected #RRGGBB"));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|e| eyre!("Invalid colour '{value}': {e}"))
    };
    Ok([channel(0..2)?, channel(2..4)?, channel(4..6)?])
}

/// Quality factors follow the `(0, 1]` convention of canvas encoders.
pub fn ensure_unit_quality(name: &str, value: f32) -> Result<f32> {
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(eyre!("{name} must be in (0, 1], got {value}"))
    }
}

pub fn ensure_unit_interval(name: &str, value: f32) -> Result<f32> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(eyre!("{name} must be in [0, 1], got {value}"))
    }
}
