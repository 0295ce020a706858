use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::data::GeoPoint;
use crate::views::map_view::{MapDefaults, FOCUS_ZOOM, OVERVIEW_ZOOM, REGION_CENTROID};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub map: MapConfig,
    pub assistant: AssistantConfig,
    pub behavior: BehaviorConfig,
}

/// Which panels share the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Table,
    #[default]
    Split,
    Map,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Table => ViewMode::Split,
            ViewMode::Split => ViewMode::Map,
            ViewMode::Map => ViewMode::Table,
        }
    }

    pub fn shows_table(self) -> bool {
        matches!(self, ViewMode::Table | ViewMode::Split)
    }

    pub fn shows_map(self) -> bool {
        matches!(self, ViewMode::Map | ViewMode::Split)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Table => "Таблиця",
            ViewMode::Split => "Розділений вид",
            ViewMode::Map => "Карта",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for markers and icons
    pub use_glyphs: bool,

    /// Layout on startup
    pub default_view: ViewMode,

    /// Colored status badge in the category column
    pub show_status_badges: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// [lat, lng] shown when nothing is selected
    pub default_center: [f64; 2],

    /// Zoom when nothing is selected
    pub default_zoom: f64,

    /// Zoom when flying to a selected organization
    pub focus_zoom: f64,

    /// Duration of the pan/zoom animation
    pub fly_duration_ms: u64,

    /// Raster tile template, kept for attribution and external viewers
    pub tile_url: String,

    pub attribution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub model: String,

    /// Base URL of the Generative Language API
    pub endpoint: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    pub temperature: f32,

    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Delay before the filter is recomputed while typing; 0 recomputes on
    /// every keystroke
    pub filter_debounce_ms: u64,

    /// CSV/JSON export of the registry to load instead of the built-in list
    pub data_file: Option<PathBuf>,

    /// Where chat transcripts are saved (current directory when unset)
    pub transcript_dir: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            default_view: ViewMode::Split,
            show_status_badges: true,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: [REGION_CENTROID.lat, REGION_CENTROID.lng],
            default_zoom: OVERVIEW_ZOOM,
            focus_zoom: FOCUS_ZOOM,
            fly_duration_ms: 1500,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "API_KEY".to_string(),
            temperature: crate::assistant::bridge::DEFAULT_TEMPERATURE,
            request_timeout_secs: 60,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            filter_debounce_ms: 0,
            data_file: None,
            transcript_dir: None,
        }
    }
}

impl MapConfig {
    pub fn defaults(&self) -> MapDefaults {
        MapDefaults {
            center: GeoPoint::new(self.default_center[0], self.default_center[1]),
            zoom: self.default_zoom,
            focus_zoom: self.focus_zoom,
        }
    }
}

impl AssistantConfig {
    /// Configured variable first, then the conventional Gemini name
    pub fn api_key_vars(&self) -> Vec<String> {
        let mut vars = vec![self.api_key_env.clone()];
        if self.api_key_env != "GEMINI_API_KEY" {
            vars.push("GEMINI_API_KEY".to_string());
        }
        vars
    }
}

impl Config {
    /// Load config from the default location, creating it when missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)
            .with_context(|| format!("Cannot read {}", config_path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("Invalid config {}", config_path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("socialmap").join("config.toml"))
    }

    /// Default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# SocialMap configuration
# Location: ~/.config/socialmap/config.toml (Linux)
#           ~/Library/Application Support/socialmap/config.toml (macOS)
#           %APPDATA%\socialmap\config.toml (Windows)

[display]
# Use Unicode glyphs for map markers; false for plain ASCII
use_glyphs = true

# Startup layout: "table", "split" or "map" (F2 cycles at runtime)
default_view = "split"

# Colored status badge next to the category
show_status_badges = true

[map]
# [lat, lng] shown when no organization is selected (Mykolaiv)
default_center = [46.975, 31.9946]

# Overview zoom showing Odesa, Mykolaiv and Kherson
default_zoom = 8.0

# Street-level zoom used when an organization is selected
focus_zoom = 13.0

# Length of the fly-to animation
fly_duration_ms = 1500

tile_url = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
attribution = "© OpenStreetMap contributors"

[assistant]
model = "gemini-2.5-flash"
endpoint = "https://generativelanguage.googleapis.com/v1beta"

# Environment variable holding the API key (GEMINI_API_KEY is also checked)
api_key_env = "API_KEY"

temperature = 0.4
request_timeout_secs = 60

[behavior]
# Wait this long after the last keystroke before filtering (0 = immediately)
filter_debounce_ms = 0

# Registry export to load instead of the built-in list
# data_file = "/path/to/registry.csv"

# Directory for saved chat transcripts (defaults to the current directory)
# transcript_dir = "/path/to/transcripts"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.display.use_glyphs);
        assert_eq!(config.display.default_view, ViewMode::Split);
        assert_eq!(config.map.defaults(), MapDefaults::default());
        assert_eq!(config.behavior.filter_debounce_ms, 0);
    }

    #[test]
    fn test_commented_default_parses() {
        let config = Config::from_toml(&Config::create_default_with_comments()).unwrap();
        assert_eq!(config.assistant.model, "gemini-2.5-flash");
        assert_eq!(config.map.focus_zoom, 13.0);
        assert_eq!(config.behavior.data_file, None);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config = Config::from_toml("[map]\ndefault_zoom = 6.5\n").unwrap();
        assert_eq!(config.map.default_zoom, 6.5);
        assert_eq!(config.map.focus_zoom, FOCUS_ZOOM);
        assert_eq!(config.assistant.api_key_env, "API_KEY");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.map.default_center, parsed.map.default_center);
        assert_eq!(config.display.default_view, parsed.display.default_view);
    }

    #[test]
    fn test_view_mode_cycle() {
        assert_eq!(ViewMode::Split.next(), ViewMode::Map);
        assert!(ViewMode::Split.shows_table() && ViewMode::Split.shows_map());
        assert!(!ViewMode::Map.shows_table());
    }

    #[test]
    fn test_api_key_vars() {
        let config = AssistantConfig::default();
        assert_eq!(config.api_key_vars(), vec!["API_KEY", "GEMINI_API_KEY"]);
    }
}
