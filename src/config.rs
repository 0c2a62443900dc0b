//! Capture policy configuration with JSON persistence
//!
//! The scroll/overlap/termination numbers are heuristics inherited from
//! the capture flow, not guaranteed-correct values; they are kept here
//! so callers can tune them for pages with lazy-loaded content.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Tunables for one capture run, persisted between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Hard cap on loop iterations so the run terminates even when
    /// scrolling stalls
    pub max_captures: u32,
    /// Margin in px added around the selection's crop bounds
    pub padding: i32,
    /// Overlap in px kept between consecutive slices when scrolling
    pub scroll_overlap: i32,
    /// Smallest forward scroll per iteration
    pub min_scroll_step: i32,
    /// Margin subtracted from a full-viewport seek scroll
    pub seek_margin: i32,
    /// Wait after maximizing, before anything is measured
    #[serde(default = "default_maximize_delay_ms")]
    pub maximize_delay_ms: u64,
    /// Wait after hiding chrome or jumping to the selection start
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Wait at the top of every iteration for the page to finish
    /// rendering
    #[serde(default = "default_capture_delay_ms")]
    pub capture_delay_ms: u64,
    /// Wait after each scroll before reading the new position
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,
}

fn default_maximize_delay_ms() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    200
}

fn default_capture_delay_ms() -> u64 {
    150
}

fn default_scroll_delay_ms() -> u64 {
    50
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_captures: 50,
            padding: 5,
            scroll_overlap: 30,
            min_scroll_step: 100,
            seek_margin: 50,
            maximize_delay_ms: default_maximize_delay_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            capture_delay_ms: default_capture_delay_ms(),
            scroll_delay_ms: default_scroll_delay_ms(),
        }
    }
}

impl CaptureConfig {
    /// A config with all delays zeroed, for deterministic test runs
    pub fn instant() -> Self {
        Self {
            maximize_delay_ms: 0,
            settle_delay_ms: 0,
            capture_delay_ms: 0,
            scroll_delay_ms: 0,
            ..Self::default()
        }
    }

    pub fn maximize_delay(&self) -> Duration {
        Duration::from_millis(self.maximize_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn capture_delay(&self) -> Duration {
        Duration::from_millis(self.capture_delay_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }

    /// Default location: `<config dir>/chatshot/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chatshot").join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|err| {
                log::warn!("Error loading config, using defaults: {err:?}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("No config directory available, not saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {err:?}");
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing config from {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating config dir {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, text).with_context(|| format!("writing config to {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_capture_policy() {
        let cfg = CaptureConfig::default();
        assert_eq!(cfg.max_captures, 50);
        assert_eq!(cfg.padding, 5);
        assert_eq!(cfg.scroll_overlap, 30);
        assert_eq!(cfg.min_scroll_step, 100);
    }

    #[test]
    fn test_instant_zeroes_only_delays() {
        let cfg = CaptureConfig::instant();
        assert_eq!(cfg.capture_delay(), Duration::ZERO);
        assert_eq!(cfg.scroll_delay(), Duration::ZERO);
        assert_eq!(cfg.max_captures, 50);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut cfg = CaptureConfig::default();
        cfg.max_captures = 12;
        cfg.padding = 8;
        cfg.save_to(&path).unwrap();

        let loaded = CaptureConfig::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn test_missing_delay_fields_fall_back() {
        // Older config files without the delay fields still parse
        let text = r#"{
            "max_captures": 10,
            "padding": 5,
            "scroll_overlap": 30,
            "min_scroll_step": 100,
            "seek_margin": 50
        }"#;
        let cfg: CaptureConfig = serde_json::from_str(text).unwrap();
        assert_eq!(cfg.max_captures, 10);
        assert_eq!(cfg.capture_delay_ms, 150);
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        assert!(CaptureConfig::load_from(Path::new("/nonexistent/config.json")).is_err());
    }
}
