//! Parsing helpers for catalog-reported parameter size and quantization
//! strings (spec §4.3, §8 round-trips).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static PARAMETER_SIZE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([KMB])").expect("static regex is valid"));

static QUANT_DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex is valid"));

/// Parse a catalog `parameter_size` string (`9B`, `2.7B`, `500M`, `1.2K`)
/// into a parameter count in billions. `M` and `K` scale by `1e-3` and
/// `1e-6` relative to `B`, matching the catalog's convention.
pub fn parse_parameter_size(raw: &str) -> Result<f64> {
    let caps = PARAMETER_SIZE_RE
        .captures(raw)
        .ok_or_else(|| Error::InvalidParameterSize(raw.to_string()))?;

    let magnitude: f64 = caps[1]
        .parse()
        .map_err(|_| Error::InvalidParameterSize(raw.to_string()))?;

    let scale = match &caps[2] {
        "B" => 1.0,
        "M" => 1e-3,
        "K" => 1e-6,
        unit => return Err(Error::InvalidParameterSize(format!("unknown unit {unit} in {raw}"))),
    };

    Ok(magnitude * scale)
}

/// Parse a catalog `quantization_level` string (`Q4_K_M`, `Q5_0`) into its
/// bit-width by extracting the first embedded integer.
pub fn parse_quant_bits(raw: &str) -> Result<u32> {
    QUANT_DIGITS_RE
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| Error::InvalidQuantization(raw.to_string()))
}
