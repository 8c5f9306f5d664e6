use crate::error::{Result, TradegeneError};
use serde::{Deserialize, Serialize};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<()>;
}

/// Rates live in (0, 1), or [0, 1) when `closed_lower` is set
pub(crate) fn check_rate(section: &str, name: &str, value: f64, closed_lower: bool) -> Result<()> {
    let lower_ok = if closed_lower { value >= 0.0 } else { value > 0.0 };
    if lower_ok && value < 1.0 {
        return Ok(());
    }
    let bracket = if closed_lower { "[0, 1)" } else { "(0, 1)" };
    Err(TradegeneError::Configuration(format!(
        "{}.{} must be in {}, got {}",
        section, name, bracket, value
    )))
}
