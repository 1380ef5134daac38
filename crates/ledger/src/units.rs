//! Canonical conversion between human-entered decimal amounts and the
//! ledger's base-unit representation.
//!
//! Every price entering or leaving the system goes through these two
//! functions so the conversion exists exactly once; workflows must not
//! re-derive it per call site.

use thiserror::Error;

/// The ledger currency carries 18 decimal places
pub const DECIMALS: u32 = 18;

const SCALE: u128 = 10u128.pow(DECIMALS);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    #[error("invalid decimal amount: {0}")]
    Invalid(String),

    #[error("amount out of range: {0}")]
    Overflow(String),
}

/// Parse a decimal string like "1.5" into base units.
///
/// Accepts an optional fractional part of up to 18 digits. Rejects empty
/// input, signs, exponents and anything else that is not plain decimal.
pub fn parse_units(text: &str) -> Result<u128, UnitsError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(UnitsError::Invalid("empty amount".to_string()));
    }

    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::Invalid(text.to_string()));
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::Invalid(text.to_string()));
    }
    if frac.len() > DECIMALS as usize {
        return Err(UnitsError::Invalid(format!(
            "{} has more than {} decimal places",
            text, DECIMALS
        )));
    }

    let whole_units = if whole.is_empty() {
        0u128
    } else {
        whole
            .parse::<u128>()
            .map_err(|_| UnitsError::Overflow(text.to_string()))?
    };

    let frac_units = if frac.is_empty() {
        0u128
    } else {
        // Right-pad the fraction to 18 digits worth of base units
        let parsed = frac
            .parse::<u128>()
            .map_err(|_| UnitsError::Overflow(text.to_string()))?;
        parsed * 10u128.pow(DECIMALS - frac.len() as u32)
    };

    whole_units
        .checked_mul(SCALE)
        .and_then(|w| w.checked_add(frac_units))
        .ok_or_else(|| UnitsError::Overflow(text.to_string()))
}

/// Format base units back into a decimal string for display,
/// with trailing fractional zeros trimmed
pub fn format_units(value: u128) -> String {
    let whole = value / SCALE;
    let frac = value % SCALE;
    if frac == 0 {
        return whole.to_string();
    }
    let frac_str = format!("{:018}", frac);
    let trimmed = frac_str.trim_end_matches('0');
    format!("{}.{}", whole, trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whole_amounts() {
        assert_eq!(parse_units("0").unwrap(), 0);
        assert_eq!(parse_units("1").unwrap(), SCALE);
        assert_eq!(parse_units("42").unwrap(), 42 * SCALE);
    }

    #[test]
    fn test_parse_fractional_amounts() {
        assert_eq!(parse_units("1.0").unwrap(), SCALE);
        assert_eq!(parse_units("0.5").unwrap(), SCALE / 2);
        assert_eq!(parse_units("1.5").unwrap(), SCALE + SCALE / 2);
        assert_eq!(parse_units(".5").unwrap(), SCALE / 2);
        assert_eq!(parse_units("0.000000000000000001").unwrap(), 1);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(parse_units("").is_err());
        assert!(parse_units(".").is_err());
        assert!(parse_units("-1").is_err());
        assert!(parse_units("1e18").is_err());
        assert!(parse_units("1.2.3").is_err());
        assert!(parse_units("abc").is_err());
    }

    #[test]
    fn test_parse_rejects_excess_precision() {
        assert!(matches!(
            parse_units("0.0000000000000000001"),
            Err(UnitsError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let huge = "9".repeat(40);
        assert!(matches!(parse_units(&huge), Err(UnitsError::Overflow(_))));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_units(0), "0");
        assert_eq!(format_units(SCALE), "1");
        assert_eq!(format_units(SCALE + SCALE / 2), "1.5");
        assert_eq!(format_units(1), "0.000000000000000001");
    }

    #[test]
    fn test_round_trip() {
        for text in ["0", "1", "1.5", "0.25", "123.456"] {
            let units = parse_units(text).unwrap();
            assert_eq!(parse_units(&format_units(units)).unwrap(), units);
        }
    }
}
