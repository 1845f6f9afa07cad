//! Idle vertical bobbing of the displayed model

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Sinusoidal vertical offset added at display time only; the edited pose is
/// never modified, so replicas stay in parity and edits stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bobbing {
    /// Peak offset in anchor units. Zero disables bobbing.
    #[serde(default)]
    pub amplitude: f32,
    #[serde(default = "default_period")]
    pub period_secs: f32,
}

impl Default for Bobbing {
    fn default() -> Self {
        Self {
            amplitude: 0.0,
            period_secs: default_period(),
        }
    }
}

fn default_period() -> f32 {
    2.0
}

impl Bobbing {
    pub fn offset(&self, elapsed_secs: f32) -> f32 {
        if self.amplitude == 0.0 || self.period_secs <= 0.0 {
            return 0.0;
        }
        self.amplitude * (elapsed_secs * TAU / self.period_secs).sin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_by_default() {
        assert_eq!(Bobbing::default().offset(0.37), 0.0);
    }

    #[test]
    fn test_peaks_at_quarter_period() {
        let bob = Bobbing { amplitude: 0.02, period_secs: 2.0 };
        assert!((bob.offset(0.5) - 0.02).abs() < 1e-6);
        assert!(bob.offset(1.0).abs() < 1e-6);
        assert!((bob.offset(1.5) + 0.02).abs() < 1e-6);
    }
}
