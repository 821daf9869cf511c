use serde::{Deserialize, Serialize};

use super::picker::VisitOrder;
use crate::errors::{ConfigurationError, Result};

/// Settings of the adaptive peak picker.
///
/// `window_size` is the largest m/z distance from the seed a walk may
/// reach. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakPickerConfig {
    pub min_req: usize,
    pub window_size: Option<f64>,
    pub small_peak: f64,
    pub strict: bool,
    pub sequential: bool,
}

impl Default for PeakPickerConfig {
    fn default() -> Self {
        Self {
            min_req: 1,
            window_size: None,
            small_peak: 0.1,
            strict: true,
            sequential: true,
        }
    }
}

impl PeakPickerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_req == 0 {
            return Err(ConfigurationError::InvalidPeakPickerSetting {
                name: "min_req",
                value: 0.0,
            }
            .into());
        }
        if let Some(window) = self.window_size {
            if window.is_nan() || window <= 0.0 {
                return Err(ConfigurationError::InvalidPeakPickerSetting {
                    name: "window_size",
                    value: window,
                }
                .into());
            }
        }
        if !(self.small_peak > 0.0 && self.small_peak < 1.0) {
            return Err(ConfigurationError::InvalidPeakPickerSetting {
                name: "small_peak",
                value: self.small_peak,
            }
            .into());
        }
        Ok(())
    }

    pub fn visit_order(&self) -> VisitOrder {
        if self.sequential {
            VisitOrder::Sequential
        } else {
            VisitOrder::DescendingIntensity
        }
    }

    pub(crate) fn window_exceeded(&self, distance: f64) -> bool {
        match self.window_size {
            Some(window) => distance.abs() > window,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImBinningError;

    #[test]
    fn test_defaults_are_valid() {
        let config = PeakPickerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.visit_order(), VisitOrder::Sequential);
        assert!(!config.window_exceeded(1e9));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PeakPickerConfig =
            serde_json::from_str(r#"{"min_req": 3, "window_size": 0.05}"#).unwrap();
        assert_eq!(config.min_req, 3);
        assert_eq!(config.window_size, Some(0.05));
        assert_eq!(config.small_peak, 0.1);
        assert!(config.strict);
        assert!(config.window_exceeded(0.06));
        assert!(!config.window_exceeded(-0.05));
    }

    #[test]
    fn test_invalid_settings() {
        let bad = [
            PeakPickerConfig {
                min_req: 0,
                ..Default::default()
            },
            PeakPickerConfig {
                window_size: Some(0.0),
                ..Default::default()
            },
            PeakPickerConfig {
                window_size: Some(f64::NAN),
                ..Default::default()
            },
            PeakPickerConfig {
                small_peak: 1.0,
                ..Default::default()
            },
            PeakPickerConfig {
                small_peak: f64::NAN,
                ..Default::default()
            },
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(ImBinningError::ConfigurationError(
                    ConfigurationError::InvalidPeakPickerSetting { .. }
                ))
            ));
        }
    }
}
