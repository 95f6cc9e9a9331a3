//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML config
//! files; every field has a default so a minimal (or absent) config works.

use serde::{Deserialize, Serialize};

/// Root configuration for the hub.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HubConfig {
    /// Listener and request handling settings.
    pub server: ServerConfig,

    /// Per-plugin enable switches.
    pub plugins: PluginToggles,

    /// Receiver control plugin settings.
    pub denon: DenonConfig,

    /// Radio switch plugin settings.
    pub rcswitch: RcSwitchConfig,

    /// Media download/playback plugin settings.
    pub media: MediaConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen port; `--port` on the CLI overrides this.
    pub port: u16,

    /// Maximum buffered request body size in bytes.
    pub max_body_size: usize,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            max_body_size: 1024 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Which builtin plugins to load.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PluginToggles {
    pub denon: bool,
    pub rcswitch: bool,
    pub errors: bool,
    pub media: bool,

    /// Root echo endpoint; swallows every otherwise-unmatched path, so it
    /// is off unless explicitly enabled.
    pub debug: bool,
}

impl Default for PluginToggles {
    fn default() -> Self {
        Self {
            denon: true,
            rcswitch: true,
            errors: true,
            media: true,
            debug: false,
        }
    }
}

/// Network address of the AV receiver's telnet control port.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DenonConfig {
    pub address: String,
}

impl Default for DenonConfig {
    fn default() -> Self {
        Self {
            address: "192.168.0.3:23".to_string(),
        }
    }
}

/// External command used to toggle radio-controlled outlets.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RcSwitchConfig {
    pub command: String,
}

impl Default for RcSwitchConfig {
    fn default() -> Self {
        Self {
            command: "rcswitch".to_string(),
        }
    }
}

/// Media plugin: download cache and external commands.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory holding downloaded videos, named `<id>.<ext>`.
    pub video_dir: String,

    /// Download command (`youtube-dl` compatible; `-g` resolves stream URLs).
    pub downloader_command: String,

    /// Playback command (`omxplayer` compatible).
    pub player_command: String,

    /// Volume argument passed to the player.
    pub volume: i32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            video_dir: "videos".to_string(),
            downloader_command: "youtube-dl".to_string(),
            player_command: "omxplayer".to_string(),
            volume: -3300,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_parses() {
        let config: HubConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.plugins.media);
        assert!(!config.plugins.debug);
    }

    #[test]
    fn test_partial_override() {
        let config: HubConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [plugins]
            media = false

            [denon]
            address = "10.0.0.5:23"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.plugins.media);
        assert!(config.plugins.denon);
        assert_eq!(config.denon.address, "10.0.0.5:23");
        assert_eq!(config.media.player_command, "omxplayer");
    }
}
