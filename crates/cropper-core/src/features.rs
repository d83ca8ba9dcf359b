//! Feature flags gating gestures and interactive affordances.
//!
//! Hosts supply a partially filled [`FeatureConfig`]; unset entries fall back
//! to the legacy single toggles in [`LegacyToggles`], then to hardcoded
//! defaults. The result is a fully resolved [`Features`] value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single named feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Drag the crop rectangle around.
    Drag,
    /// Resize through the eight handles.
    Resize,
    /// Interactive zoom steps.
    Zoom,
    /// Interactive rotation steps.
    Rotation,
    /// Rule-of-thirds grid overlay.
    Grid,
    /// Draw a new rectangle by dragging outside the current one.
    FreeStyle,
    /// Rectangle centres itself on the pointer while idle.
    CursorFollow,
    /// Draw a new rectangle, constraints applied on release only.
    PhotoshopStyle,
    /// Lasso selection collapsed to its bounding box.
    Freehand,
}

impl Feature {
    pub const ALL: [Feature; 9] = [
        Feature::Drag,
        Feature::Resize,
        Feature::Zoom,
        Feature::Rotation,
        Feature::Grid,
        Feature::FreeStyle,
        Feature::CursorFollow,
        Feature::PhotoshopStyle,
        Feature::Freehand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Feature::Drag => "drag",
            Feature::Resize => "resize",
            Feature::Zoom => "zoom",
            Feature::Rotation => "rotation",
            Feature::Grid => "grid",
            Feature::FreeStyle => "free_style",
            Feature::CursorFollow => "cursor_follow",
            Feature::PhotoshopStyle => "photoshop_style",
            Feature::Freehand => "freehand",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a feature name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown feature: {0}")]
pub struct UnknownFeature(pub String);

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownFeature(s.to_string()))
    }
}

/// Host-supplied feature flags; `None` means "use the fallback".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub drag: Option<bool>,
    pub resize: Option<bool>,
    pub zoom: Option<bool>,
    pub rotation: Option<bool>,
    pub grid: Option<bool>,
    pub free_style: Option<bool>,
    pub cursor_follow: Option<bool>,
    pub photoshop_style: Option<bool>,
    pub freehand: Option<bool>,
}

/// Single boolean toggles kept for backward compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyToggles {
    pub zoomable: bool,
    pub rotatable: bool,
    pub show_grid: bool,
}

impl Default for LegacyToggles {
    fn default() -> Self {
        Self {
            zoomable: true,
            rotatable: true,
            show_grid: true,
        }
    }
}

/// Fully resolved feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub drag: bool,
    pub resize: bool,
    pub zoom: bool,
    pub rotation: bool,
    pub grid: bool,
    pub free_style: bool,
    pub cursor_follow: bool,
    pub photoshop_style: bool,
    pub freehand: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self::resolve(&FeatureConfig::default(), &LegacyToggles::default())
    }
}

impl Features {
    /// Resolve explicit flags, then legacy toggles, then defaults.
    pub fn resolve(config: &FeatureConfig, legacy: &LegacyToggles) -> Self {
        Self {
            drag: config.drag.unwrap_or(true),
            resize: config.resize.unwrap_or(true),
            zoom: config.zoom.unwrap_or(legacy.zoomable),
            rotation: config.rotation.unwrap_or(legacy.rotatable),
            grid: config.grid.unwrap_or(legacy.show_grid),
            free_style: config.free_style.unwrap_or(false),
            cursor_follow: config.cursor_follow.unwrap_or(false),
            photoshop_style: config.photoshop_style.unwrap_or(false),
            freehand: config.freehand.unwrap_or(false),
        }
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Drag => self.drag,
            Feature::Resize => self.resize,
            Feature::Zoom => self.zoom,
            Feature::Rotation => self.rotation,
            Feature::Grid => self.grid,
            Feature::FreeStyle => self.free_style,
            Feature::CursorFollow => self.cursor_follow,
            Feature::PhotoshopStyle => self.photoshop_style,
            Feature::Freehand => self.freehand,
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let slot = match feature {
            Feature::Drag => &mut self.drag,
            Feature::Resize => &mut self.resize,
            Feature::Zoom => &mut self.zoom,
            Feature::Rotation => &mut self.rotation,
            Feature::Grid => &mut self.grid,
            Feature::FreeStyle => &mut self.free_style,
            Feature::CursorFollow => &mut self.cursor_follow,
            Feature::PhotoshopStyle => &mut self.photoshop_style,
            Feature::Freehand => &mut self.freehand,
        };
        *slot = enabled;
    }

    /// Every flag spelled out, for reporting back to the host.
    pub fn to_config(&self) -> FeatureConfig {
        FeatureConfig {
            drag: Some(self.drag),
            resize: Some(self.resize),
            zoom: Some(self.zoom),
            rotation: Some(self.rotation),
            grid: Some(self.grid),
            free_style: Some(self.free_style),
            cursor_follow: Some(self.cursor_follow),
            photoshop_style: Some(self.photoshop_style),
            freehand: Some(self.freehand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let f = Features::default();
        assert!(f.drag && f.resize && f.zoom && f.rotation && f.grid);
        assert!(!f.free_style && !f.cursor_follow && !f.photoshop_style && !f.freehand);
    }

    #[test]
    fn test_legacy_toggles_fill_unset_values() {
        let legacy = LegacyToggles {
            zoomable: false,
            rotatable: false,
            show_grid: false,
        };
        let f = Features::resolve(&FeatureConfig::default(), &legacy);
        assert!(!f.zoom);
        assert!(!f.rotation);
        assert!(!f.grid);
    }

    #[test]
    fn test_explicit_flags_beat_legacy_toggles() {
        let legacy = LegacyToggles {
            zoomable: false,
            rotatable: true,
            show_grid: false,
        };
        let config = FeatureConfig {
            zoom: Some(true),
            rotation: Some(false),
            ..FeatureConfig::default()
        };
        let f = Features::resolve(&config, &legacy);
        assert!(f.zoom);
        assert!(!f.rotation);
        assert!(!f.grid);
    }

    #[test]
    fn test_set_and_query_every_feature() {
        let mut f = Features::default();
        for feature in Feature::ALL {
            f.set(feature, true);
            assert!(f.is_enabled(feature), "{feature}");
            f.set(feature, false);
            assert!(!f.is_enabled(feature), "{feature}");
        }
    }

    #[test]
    fn test_feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(feature.name().parse::<Feature>(), Ok(feature));
        }
        assert_eq!(
            "lasso".parse::<Feature>(),
            Err(UnknownFeature("lasso".to_string()))
        );
    }

    #[test]
    fn test_to_config_resolves_back_to_same_features() {
        let mut f = Features::default();
        f.set(Feature::Freehand, true);
        f.set(Feature::Grid, false);
        let legacy = LegacyToggles::default();
        assert_eq!(Features::resolve(&f.to_config(), &legacy), f);
    }
}
