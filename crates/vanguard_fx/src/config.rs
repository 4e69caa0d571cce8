//! # Effect Configuration
//!
//! One TOML file describes every effect on the page:
//!
//! ```toml
//! [ambient]
//! count = 80
//!
//! [ambient.links]
//! distance = 140.0
//!
//! [decals]
//! max_decals = 32
//!
//! [frame]
//! budget_ms = 16.0
//! ```
//!
//! Missing sections fall back to defaults; unknown keys are rejected so a
//! typo never silently disables an effect.

use std::path::Path;

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::effects::{AmbientConfig, AmbientField, Burst, BurstConfig, DecalConfig, DecalLayer, PointerTrail, TrailConfig};
use crate::error::{FxError, FxResult};
use crate::frame::{FrameConfig, FrameLoop, Registration};
use crate::transition::{GlitchConfig, GlitchTransition, NavigationEvent};
use crate::variant::CursorVariant;

/// Every effect's settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectsConfig {
    /// Background particles.
    pub ambient: AmbientConfig,
    /// Cursor style preset. An explicit `[trail]` table overrides it.
    pub cursor: Option<CursorVariant>,
    /// Pointer trail.
    pub trail: Option<TrailConfig>,
    /// Bullet holes.
    pub decals: DecalConfig,
    /// Click sparks.
    pub burst: BurstConfig,
    /// Route transition.
    pub glitch: GlitchConfig,
    /// Frame loop.
    pub frame: FrameConfig,
}

impl EffectsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns [`FxError::Parse`] for malformed TOML or unknown keys, and
    /// [`FxError::InvalidConfig`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> FxResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| FxError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// Returns [`FxError::Io`] if the file can't be read, otherwise as
    /// [`EffectsConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> FxResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| FxError::Io(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "effects config loaded");
        Ok(config)
    }

    /// Validates every section.
    ///
    /// # Errors
    /// Returns the first [`FxError::InvalidConfig`] found.
    pub fn validate(&self) -> FxResult<()> {
        self.ambient.validate()?;
        self.trail_config().validate()?;
        self.decals.validate()?;
        self.burst.validate()?;
        self.glitch.validate()?;
        self.frame.validate()
    }

    /// Trail settings after applying the cursor preset.
    #[must_use]
    pub fn trail_config(&self) -> TrailConfig {
        match (&self.trail, self.cursor) {
            (Some(trail), _) => trail.clone(),
            (None, Some(cursor)) => cursor.trail_config(),
            (None, None) => TrailConfig::default(),
        }
    }

    /// Builds a frame loop with every configured effect registered.
    ///
    /// The returned registrations keep the effects alive; drop them to tear
    /// the page down.
    #[must_use]
    pub fn install(&self, frames: &FrameLoop, navigation: Receiver<NavigationEvent>) -> Vec<Registration> {
        let viewport = frames.viewport();
        vec![
            frames.register(Box::new(AmbientField::new(self.ambient.clone(), viewport))),
            frames.register(Box::new(DecalLayer::new(self.decals.clone()))),
            frames.register(Box::new(Burst::new(self.burst.clone()))),
            frames.register(Box::new(PointerTrail::new(self.trail_config()))),
            frames.register(Box::new(GlitchTransition::new(self.glitch.clone(), navigation, viewport))),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MAX_CAPACITY;
    use crate::math::Viewport;
    use crate::transition::navigation_channel;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EffectsConfig::from_toml_str("").unwrap();
        assert_eq!(config, EffectsConfig::default());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = EffectsConfig::from_toml_str(
            r##"
            cursor = "neon"

            [ambient]
            count = 12
            color = "#00FFAA"

            [ambient.links]
            distance = 90.0

            [decals]
            max_decals = 3
            "##,
        )
        .unwrap();

        assert_eq!(config.ambient.count, 12);
        assert!(config.ambient.links.is_some());
        assert!(config.ambient.force.is_none());
        assert_eq!(config.decals.max_decals, 3);
        assert_eq!(config.trail_config(), CursorVariant::Neon.trail_config());
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let err = EffectsConfig::from_toml_str("[decals]\nmax_decal = 3\n").unwrap_err();
        assert!(matches!(err, FxError::Parse(_)));
    }

    #[test]
    fn test_out_of_range_value_names_field() {
        let err = EffectsConfig::from_toml_str("[frame]\nmax_step = 0.0\n").unwrap_err();
        assert_eq!(
            err,
            FxError::InvalidConfig {
                field: "frame.max_step".to_string(),
                reason: "must be positive".to_string(),
            }
        );
    }

    #[test]
    fn test_entity_caps_are_bounded() {
        for (section, key) in [
            ("ambient", "count"),
            ("trail", "max_points"),
            ("decals", "max_decals"),
            ("burst", "max_particles"),
        ] {
            let at_limit = format!("[{section}]\n{key} = {MAX_CAPACITY}\n");
            assert!(EffectsConfig::from_toml_str(&at_limit).is_ok(), "{section}.{key} at limit");

            let huge = format!("[{section}]\n{key} = 9000000000000000000\n");
            let err = EffectsConfig::from_toml_str(&huge).unwrap_err();
            assert!(
                matches!(&err, FxError::InvalidConfig { field, .. } if *field == format!("{section}.{key}")),
                "{section}.{key}: {err}"
            );
        }

        assert!(EffectsConfig::from_toml_str("[burst.particle]\nspawn_count = 4000000000\n").is_err());
        assert!(EffectsConfig::from_toml_str("[decals]\ncrack_count = 100000\n").is_err());
        assert!(EffectsConfig::from_toml_str("[glitch]\nslices = 100000\n").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EffectsConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, FxError::Io(_)));
    }

    #[test]
    fn test_install_registers_every_effect() {
        let frames = FrameLoop::new(FrameConfig::default(), Viewport::new(800.0, 600.0));
        let (_tx, rx) = navigation_channel();
        let registrations = EffectsConfig::default().install(&frames, rx);

        assert_eq!(registrations.len(), 5);
        assert_eq!(frames.effect_count(), 5);
        drop(registrations);
        assert_eq!(frames.effect_count(), 0);
    }
}
