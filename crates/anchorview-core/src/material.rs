//! Material tuning applied to freshly loaded models

use serde::{Deserialize, Serialize};

/// Capability view of one surface material of a loaded model
pub trait MaterialSurface {
    /// Whether the material exposes physically based parameters
    fn supports_pbr(&self) -> bool;

    fn set_pbr(&mut self, metallic: f32, roughness: f32);
}

/// PBR parameters forced onto every capable surface after a model loads
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialTuning {
    #[serde(default = "default_metallic")]
    pub metallic: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
}

impl Default for MaterialTuning {
    fn default() -> Self {
        Self {
            metallic: default_metallic(),
            roughness: default_roughness(),
        }
    }
}

fn default_metallic() -> f32 {
    0.3
}

fn default_roughness() -> f32 {
    0.7
}

impl MaterialTuning {
    /// Tune `surface` if it supports PBR parameters. Returns whether it did.
    pub fn apply<S: MaterialSurface + ?Sized>(&self, surface: &mut S) -> bool {
        if !surface.supports_pbr() {
            return false;
        }
        surface.set_pbr(self.metallic.clamp(0.0, 1.0), self.roughness.clamp(0.0, 1.0));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSurface {
        pbr: bool,
        params: Option<(f32, f32)>,
    }

    impl MaterialSurface for FakeSurface {
        fn supports_pbr(&self) -> bool {
            self.pbr
        }

        fn set_pbr(&mut self, metallic: f32, roughness: f32) {
            self.params = Some((metallic, roughness));
        }
    }

    #[test]
    fn test_tunes_only_capable_surfaces() {
        let tuning = MaterialTuning::default();

        let mut lit = FakeSurface { pbr: true, params: None };
        assert!(tuning.apply(&mut lit));
        assert_eq!(lit.params, Some((0.3, 0.7)));

        let mut unlit = FakeSurface { pbr: false, params: None };
        assert!(!tuning.apply(&mut unlit));
        assert_eq!(unlit.params, None);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let tuning = MaterialTuning { metallic: 1.4, roughness: -0.5 };
        let mut surface = FakeSurface { pbr: true, params: None };
        tuning.apply(&mut surface);
        assert_eq!(surface.params, Some((1.0, 0.0)));
    }
}
