//! # Client Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SAVDO_API_URL=https://api.savdo.uz                                 │
//! │     SAVDO_VOICE_ENABLED=false                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/savdo-pos/savdo.toml (Linux)                             │
//! │     ~/Library/Application Support/uz.savdo.pos/savdo.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost:8000, 100 ms scanner gap, voice on (uz-UZ)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://api.savdo.uz"
//! timeout_secs = 15
//!
//! [scanner]
//! profile = "barcode"   # barcode | qr
//! timeout_ms = 100
//! min_length = 3
//! max_length = 50
//!
//! [voice]
//! enabled = true
//! language = "uz-UZ"
//!
//! [session]
//! pack_mode = "absolute"   # absolute | compounding
//! store_name = "Savdo Market"
//!
//! [display]
//! currency_symbol = "so'm"
//! currency_decimals = 0
//! ```

use std::path::PathBuf;
use std::time::Duration;

use savdo_core::scanner::ScannerSettings;
use savdo_core::{Money, PackQuantityMode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// API Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Backend root. Endpoint paths (`/api/v1/...`) are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    15
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

// =============================================================================
// Scanner Settings
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScannerProfile {
    /// Linear barcodes.
    #[default]
    Barcode,
    /// QR labels with JSON payloads.
    Qr,
}

/// Scanner profile with optional per-field overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScannerConfig {
    #[serde(default)]
    pub profile: ScannerProfile,
    pub timeout_ms: Option<u64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
}

impl ScannerConfig {
    /// Resolves the profile preset and applies overrides.
    pub fn settings(&self) -> ScannerSettings {
        let mut settings = match self.profile {
            ScannerProfile::Barcode => ScannerSettings::default(),
            ScannerProfile::Qr => ScannerSettings::qr(),
        };
        if let Some(ms) = self.timeout_ms {
            settings.timeout = Duration::from_millis(ms);
        }
        if let Some(min) = self.min_length {
            settings.min_length = min;
        }
        if let Some(max) = self.max_length {
            settings.max_length = max;
        }
        settings
    }
}

// =============================================================================
// Voice Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// BCP 47 tag handed to the speech recognizer.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_true() -> bool {
    true
}

fn default_language() -> String {
    "uz-UZ".to_string()
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            enabled: true,
            language: default_language(),
        }
    }
}

// =============================================================================
// Session Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Where the bearer token is kept. Defaults to the platform data dir.
    #[serde(default)]
    pub token_path: Option<PathBuf>,

    #[serde(default)]
    pub pack_mode: PackQuantityMode,

    /// Printed at the top of receipts.
    #[serde(default = "default_store_name")]
    pub store_name: String,
}

fn default_store_name() -> String {
    "Savdo".to_string()
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            token_path: None,
            pack_mode: PackQuantityMode::default(),
            store_name: default_store_name(),
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Decimals shown on screen. Som prices are whole numbers in practice.
    #[serde(default)]
    pub currency_decimals: u8,

    /// Symbol after the amount ("12 000 so'm") rather than before ("$12").
    #[serde(default = "default_true")]
    pub symbol_after: bool,
}

fn default_currency_symbol() -> String {
    "so'm".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            currency_decimals: 0,
            symbol_after: true,
        }
    }
}

impl DisplaySettings {
    /// Formats an amount with thousands grouped by spaces.
    ///
    /// ```rust
    /// use savdo_client::config::DisplaySettings;
    /// use savdo_core::Money;
    ///
    /// let display = DisplaySettings::default();
    /// assert_eq!(display.format_money(Money::from_major(1_250_000)), "1 250 000 so'm");
    /// ```
    pub fn format_money(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let major = group_thousands(amount.major().unsigned_abs());

        let number = match self.currency_decimals {
            0 => format!("{sign}{major}"),
            1 => format!("{sign}{major}.{}", amount.minor() / 10),
            _ => format!("{sign}{major}.{:02}", amount.minor()),
        };

        if self.symbol_after {
            format!("{number} {}", self.currency_symbol)
        } else {
            format!("{}{number}", self.currency_symbol)
        }
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Main Client Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub scanner: ScannerConfig,

    #[serde(default)]
    pub voice: VoiceSettings,

    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub display: DisplaySettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (savdo.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        let scanner = self.scanner.settings();
        if scanner.min_length == 0 || scanner.min_length > scanner.max_length {
            return Err(ClientError::InvalidConfig(format!(
                "scanner lengths must satisfy 1 <= min ({}) <= max ({})",
                scanner.min_length, scanner.max_length
            )));
        }
        if scanner.timeout.is_zero() {
            return Err(ClientError::InvalidConfig(
                "scanner timeout_ms must be greater than 0".into(),
            ));
        }

        if self.display.currency_decimals > 2 {
            return Err(ClientError::InvalidConfig(
                "currency_decimals must be 0, 1 or 2".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `SAVDO_*` overrides from any key lookup.
    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("SAVDO_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = var("SAVDO_API_TIMEOUT").and_then(|s| s.parse().ok()) {
            self.api.timeout_secs = secs;
        }

        if let Some(profile) = var("SAVDO_SCANNER_PROFILE") {
            match profile.to_lowercase().as_str() {
                "barcode" => self.scanner.profile = ScannerProfile::Barcode,
                "qr" => self.scanner.profile = ScannerProfile::Qr,
                _ => warn!(profile = %profile, "Unknown scanner profile in environment"),
            }
        }

        if let Some(ms) = var("SAVDO_SCANNER_TIMEOUT_MS").and_then(|s| s.parse().ok()) {
            self.scanner.timeout_ms = Some(ms);
        }

        if let Some(enabled) = var("SAVDO_VOICE_ENABLED") {
            self.voice.enabled = enabled != "false" && enabled != "0";
        }

        if let Some(language) = var("SAVDO_VOICE_LANGUAGE") {
            self.voice.language = language;
        }

        if let Some(path) = var("SAVDO_TOKEN_PATH") {
            self.session.token_path = Some(PathBuf::from(path));
        }

        if let Some(mode) = var("SAVDO_PACK_MODE") {
            match mode.to_lowercase().as_str() {
                "absolute" => self.session.pack_mode = PackQuantityMode::Absolute,
                "compounding" => self.session.pack_mode = PackQuantityMode::Compounding,
                _ => warn!(mode = %mode, "Unknown pack mode in environment"),
            }
        }

        if let Some(symbol) = var("SAVDO_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("uz", "savdo", "pos")
    }

    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("savdo.toml"))
    }

    /// Configured token path, else `token.json` in the platform data dir.
    pub fn token_path(&self) -> Option<PathBuf> {
        self.session.token_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("token.json"))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.voice.enabled);
        assert_eq!(config.voice.language, "uz-UZ");
        assert_eq!(config.scanner.settings(), ScannerSettings::default());
        assert_eq!(config.session.pack_mode, PackQuantityMode::Absolute);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [api]
            base_url = "https://api.savdo.uz"

            [scanner]
            profile = "qr"
            timeout_ms = 200

            [session]
            pack_mode = "compounding"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout_secs, 15);
        let scanner = config.scanner.settings();
        assert_eq!(scanner.max_length, 100);
        assert_eq!(scanner.timeout, Duration::from_millis(200));
        assert_eq!(config.session.pack_mode, PackQuantityMode::Compounding);
        assert_eq!(config.display.currency_symbol, "so'm");
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("SAVDO_API_URL", "https://pos.example.uz"),
            ("SAVDO_VOICE_ENABLED", "false"),
            ("SAVDO_PACK_MODE", "Compounding"),
            ("SAVDO_SCANNER_PROFILE", "hologram"),
        ]
        .into_iter()
        .collect();

        let mut config = ClientConfig::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "https://pos.example.uz");
        assert!(!config.voice.enabled);
        assert_eq!(config.session.pack_mode, PackQuantityMode::Compounding);
        assert_eq!(config.scanner.profile, ScannerProfile::Barcode);
    }

    #[test]
    fn test_validation() {
        let mut config = ClientConfig::default();
        config.api.base_url = "ftp://files".into();
        assert!(config.validate().is_err());

        config.api.base_url = "not a url".into();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        let mut config = ClientConfig::default();
        config.scanner.min_length = Some(60);
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.display.currency_decimals = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("savdo.toml");

        let mut config = ClientConfig::default();
        config.session.store_name = "Chorsu Market".into();
        config.save(Some(path.clone())).unwrap();

        let loaded = ClientConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.session.store_name, "Chorsu Market");
    }

    #[test]
    fn test_format_money() {
        let som = DisplaySettings::default();
        assert_eq!(som.format_money(Money::from_major(12_000)), "12 000 so'm");
        assert_eq!(som.format_money(Money::from_major(-500)), "-500 so'm");
        assert_eq!(som.format_money(Money::zero()), "0 so'm");

        let usd = DisplaySettings {
            currency_symbol: "$".into(),
            currency_decimals: 2,
            symbol_after: false,
        };
        assert_eq!(usd.format_money(Money::from_cents(123_456)), "$1 234.56");
    }
}
