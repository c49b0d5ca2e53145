//! Field settings and presets
//!
//! Every tuned constant of the effect lives here so it can be adjusted
//! without touching the simulation. Persisted as JSON (LocalStorage on web,
//! a file on native).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::spring::SpringConfig;

/// Errors raised while loading or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Particle count for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 12,
            QualityPreset::Medium => PARTICLE_COUNT,
            QualityPreset::High => 80,
        }
    }

    /// Whether to render the drifting light beams
    pub fn beams_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Field settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Seed for particle placement (same seed, same field)
    pub seed: u64,

    // === Reveal panel ===
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub panel_spring: SpringConfig,

    // === Particle physics ===
    pub repulsion_radius: f32,
    pub max_repulsion: f32,
    pub max_offset: f32,
    pub bounce_strength: f32,
    pub bounce_margin: f32,
    pub particle_min_size: f32,
    pub particle_max_size: f32,
    pub particle_spring: SpringConfig,

    // === Highlights ===
    pub highlight_margin: f32,

    // === Cosmetic layers ===
    pub float_min_period: f32,
    pub float_max_period: f32,
    pub float_amplitude: f32,
    /// Particle effects on/off
    pub particles: bool,
    /// Light beams on/off
    pub beams: bool,

    // === Navbar ===
    pub dock_spring: SpringConfig,

    // === Accessibility ===
    /// Reduced motion (freezes floats and beams; physics still runs)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            seed: 0x5EED,

            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
            panel_spring: SpringConfig::panel(),

            repulsion_radius: REPULSION_RADIUS,
            max_repulsion: MAX_REPULSION,
            max_offset: MAX_OFFSET,
            bounce_strength: BOUNCE_STRENGTH,
            bounce_margin: BOUNCE_MARGIN,
            particle_min_size: PARTICLE_MIN_SIZE,
            particle_max_size: PARTICLE_MAX_SIZE,
            particle_spring: SpringConfig::particle(),

            highlight_margin: HIGHLIGHT_MARGIN,

            float_min_period: FLOAT_MIN_PERIOD,
            float_max_period: FLOAT_MAX_PERIOD,
            float_amplitude: FLOAT_AMPLITUDE,
            particles: true,
            beams: true,

            dock_spring: SpringConfig::dock(),

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        if preset == QualityPreset::Low {
            self.beams = false;
        }
    }

    /// Effective particle count
    pub fn particle_count(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    /// Effective beams (respects quality and reduced_motion)
    pub fn effective_beams(&self) -> bool {
        self.beams && self.quality.beams_enabled() && !self.reduced_motion
    }

    /// Effective particle float (respects reduced_motion)
    pub fn effective_float(&self) -> bool {
        !self.reduced_motion
    }

    pub fn obstacle_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.obstacle_width, self.obstacle_height)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive: [(&'static str, f32); 5] = [
            ("obstacle_width", self.obstacle_width),
            ("obstacle_height", self.obstacle_height),
            ("repulsion_radius", self.repulsion_radius),
            ("max_offset", self.max_offset),
            ("particle_min_size", self.particle_min_size),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }

        let non_negative: [(&'static str, f32); 5] = [
            ("max_repulsion", self.max_repulsion),
            ("bounce_strength", self.bounce_strength),
            ("bounce_margin", self.bounce_margin),
            ("highlight_margin", self.highlight_margin),
            ("float_amplitude", self.float_amplitude),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "must not be negative",
                });
            }
        }

        if !(self.particle_max_size > self.particle_min_size) {
            return Err(SettingsError::Invalid {
                field: "particle_max_size",
                reason: "must exceed particle_min_size",
            });
        }
        if !(self.float_min_period > 0.0 && self.float_max_period > self.float_min_period) {
            return Err(SettingsError::Invalid {
                field: "float_max_period",
                reason: "float periods must be positive and ascending",
            });
        }

        for (field, spring) in [
            ("panel_spring", &self.panel_spring),
            ("particle_spring", &self.particle_spring),
            ("dock_spring", &self.dock_spring),
        ] {
            if !spring.is_valid() {
                return Err(SettingsError::Invalid {
                    field,
                    reason: "mass and stiffness must be positive, damping non-negative",
                });
            }
        }

        Ok(())
    }

    /// Parse and validate settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write settings to a JSON file
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "reveal_field_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native: read from the path in `REVEAL_FIELD_SETTINGS`, else defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var("REVEAL_FIELD_SETTINGS") else {
            return Self::default();
        };
        match Self::load_from_path(&path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings at {}: {}", path, e);
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Ok(path) = std::env::var("REVEAL_FIELD_SETTINGS") else {
            log::debug!("REVEAL_FIELD_SETTINGS not set, {} not saved", Self::STORAGE_KEY);
            return;
        };
        if let Err(e) = self.save_to_path(&path) {
            log::warn!("Failed to save settings to {}: {}", path, e);
        }
    }
}
