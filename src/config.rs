//! Construction parameters for a cube and its animation.

use std::time::Duration;

use crate::error::CubeError;
use crate::grid::MAX_LAYERS;
use crate::pieces::Palette;

/// Layers used when the requested count is unusable.
pub const FALLBACK_LAYERS: usize = 2;
/// Width used when the requested width is unusable.
pub const FALLBACK_WIDTH: f32 = 12.0;

#[derive(Clone, Debug, PartialEq)]
pub struct CubeConfig {
    /// Edge length of the whole cube in scene units.
    pub width: f32,
    pub layers: usize,
    /// Playback time of one animated turn.
    pub turn_duration: Duration,
    /// Interpolated frames per animated turn.
    pub animation_steps: u32,
    pub palette: Palette,
}

impl Default for CubeConfig {
    fn default() -> Self {
        CubeConfig {
            width: 12.0,
            layers: 3,
            turn_duration: Duration::from_millis(125),
            animation_steps: 3,
            palette: Palette::default(),
        }
    }
}

impl CubeConfig {
    pub fn with_layers(layers: usize) -> CubeConfig {
        CubeConfig {
            layers,
            ..CubeConfig::default()
        }
    }

    /// Checks the size parameters.
    pub fn validate(&self) -> Result<(), CubeError> {
        if !(2..=MAX_LAYERS).contains(&self.layers) {
            return Err(CubeError::InvalidLayers(self.layers));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(CubeError::InvalidWidth(self.width.to_string()));
        }
        Ok(())
    }

    /// Returns a usable config: if the size parameters are invalid they are
    /// replaced by the fallback 2 layer, width 12 cube.
    pub fn validated(self) -> CubeConfig {
        match self.validate() {
            Ok(()) => self,
            Err(err) => {
                log::warn!(
                    "{err}, falling back to {FALLBACK_LAYERS} layers of width {FALLBACK_WIDTH}"
                );
                CubeConfig {
                    width: FALLBACK_WIDTH,
                    layers: FALLBACK_LAYERS,
                    ..self
                }
            }
        }
    }

    /// Parses textual size parameters, falling back like [`validated`].
    ///
    /// [`validated`]: CubeConfig::validated
    pub fn from_text(width: &str, layers: &str) -> CubeConfig {
        let width = width.trim().parse::<f32>().unwrap_or(f32::NAN);
        let layers = layers.trim().parse::<usize>().unwrap_or(0);
        CubeConfig {
            width,
            layers,
            ..CubeConfig::default()
        }
        .validated()
    }

    /// Delay between interpolated frames; zero-length turns jump in one step.
    pub fn frame_delay(&self) -> (Duration, u32) {
        if self.turn_duration.is_zero() || self.animation_steps == 0 {
            return (Duration::ZERO, 1);
        }
        (
            self.turn_duration / self.animation_steps,
            self.animation_steps,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(CubeConfig::default().validate().is_ok());
        assert_eq!(CubeConfig::default().frame_delay(), (Duration::from_nanos(41_666_666), 3));
    }

    #[test_log::test]
    fn test_invalid_sizes_fall_back() {
        let config = CubeConfig::with_layers(1).validated();
        assert_eq!((config.layers, config.width), (2, 12.0));

        let config = CubeConfig::from_text("wide", "5");
        assert_eq!((config.layers, config.width), (2, 12.0));

        let config = CubeConfig::from_text("7.5", "4");
        assert_eq!((config.layers, config.width), (4, 7.5));
    }

    #[test]
    fn test_strict_validation_reports() {
        assert!(matches!(
            CubeConfig::with_layers(0).validate(),
            Err(CubeError::InvalidLayers(0))
        ));
        assert!(matches!(
            CubeConfig::with_layers(MAX_LAYERS + 1).validate(),
            Err(CubeError::InvalidLayers(_))
        ));
        let config = CubeConfig {
            width: -1.0,
            ..CubeConfig::default()
        };
        assert!(matches!(config.validate(), Err(CubeError::InvalidWidth(_))));
    }

    #[test]
    fn test_zero_duration_is_one_step() {
        let config = CubeConfig {
            turn_duration: Duration::ZERO,
            ..CubeConfig::default()
        };
        assert_eq!(config.frame_delay(), (Duration::ZERO, 1));
    }
}
