//! `key=value` parameter overrides, as typed on the command line or at the
//! live control prompt.
//!
//! Values accept a `%` suffix, so `mix=35%` and `mix=0.35` mean the same
//! thing. For the integer parameters a percentage is taken literally
//! (`density=35%` is 35).

use grit_core::ParamId;

use crate::error::ConfigError;
use crate::validation::validate_param;

/// Parses a parameter value with an optional `%` suffix.
///
/// ```rust
/// use grit_config::parse_param_value;
/// use grit_core::ParamId;
///
/// assert_eq!(parse_param_value(ParamId::Mix, "35%"), Some(0.35));
/// assert_eq!(parse_param_value(ParamId::Density, "35%"), Some(35.0));
/// assert_eq!(parse_param_value(ParamId::Feedback, " 0.5 "), Some(0.5));
/// assert_eq!(parse_param_value(ParamId::Mix, "loud"), None);
/// ```
pub fn parse_param_value(id: ParamId, value: &str) -> Option<f32> {
    let value = value.trim();
    if let Some(pct) = value.strip_suffix('%') {
        let v = pct.trim().parse::<f32>().ok()?;
        return Some(if id.spec().integer { v } else { v / 100.0 });
    }
    value.parse::<f32>().ok()
}

/// Parses and range-checks a `key=value` override.
pub fn parse_override(input: &str) -> Result<(ParamId, f32), ConfigError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| ConfigError::invalid_override(input, "expected key=value"))?;
    let key = key.trim();
    let id = ParamId::from_name(key).map_err(|_| ConfigError::UnknownParameter(key.to_string()))?;
    let value = parse_param_value(id, value)
        .ok_or_else(|| ConfigError::invalid_override(input, "value is not a number"))?;
    validate_param(id, value)?;
    Ok((id, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_parameter() {
        assert_eq!(parse_override("density=80").unwrap(), (ParamId::Density, 80.0));
        assert_eq!(parse_override("noise=60").unwrap(), (ParamId::NoiseAmount, 60.0));
        assert_eq!(parse_override("mix = 25%").unwrap(), (ParamId::Mix, 0.25));
        assert_eq!(parse_override("feedback=0.9").unwrap(), (ParamId::Feedback, 0.9));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            parse_override("mix"),
            Err(ConfigError::InvalidOverride { .. })
        ));
        assert!(matches!(
            parse_override("gain=1"),
            Err(ConfigError::UnknownParameter(ref k)) if k == "gain"
        ));
        assert!(matches!(
            parse_override("mix=lots"),
            Err(ConfigError::InvalidOverride { .. })
        ));
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(matches!(
            parse_override("noise=61"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse_override("feedback=1.5"),
            Err(ConfigError::Validation(_))
        ));
    }
}
