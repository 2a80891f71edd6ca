use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use rtp_command::rtp::{RtpSettings, SafeLocationFinder};
use rtp_world::{Block, GeneratorKind};

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub world: WorldSection,
    pub logging: LoggingSection,
    #[serde(default)]
    pub rtp: RtpSection,
    #[serde(default)]
    pub permissions: PermissionsSection,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub name: String,
    pub max_players: u32,
}

#[derive(Debug, Deserialize)]
pub struct WorldSection {
    pub name: String,
    pub generator: String,
    pub seed: i64,
    /// Bottom-up layers for the flat generator. Empty means the default stack.
    #[serde(default)]
    pub flat_layers: Vec<String>,
}

impl WorldSection {
    pub fn generator_kind(&self) -> Result<GeneratorKind, Box<dyn std::error::Error>> {
        GeneratorKind::parse(&self.generator)
            .ok_or_else(|| format!("unknown world generator \"{}\"", self.generator).into())
    }

    pub fn flat_blocks(&self) -> Result<Vec<Block>, Box<dyn std::error::Error>> {
        self.flat_layers
            .iter()
            .map(|name| {
                Block::from_name(name).ok_or_else(|| format!("unknown block \"{name}\"").into())
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct RtpSection {
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    #[serde(default = "default_max_radius")]
    pub max_radius: i32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_water_check_radius")]
    pub water_check_radius: i32,
    #[serde(default = "default_rtp_permission_level")]
    pub permission_level: u8,
    /// Upper bound on concurrent searches (blocking pool size).
    #[serde(default = "default_worker_threads")]
    pub worker_threads: usize,
}

fn default_cooldown_secs() -> u64 {
    180
}

fn default_max_radius() -> i32 {
    5000
}

fn default_max_attempts() -> u32 {
    10
}

fn default_water_check_radius() -> i32 {
    3
}

fn default_rtp_permission_level() -> u8 {
    rtp_command::RTP_PERMISSION_LEVEL
}

fn default_worker_threads() -> usize {
    4
}

impl Default for RtpSection {
    fn default() -> Self {
        Self {
            cooldown_secs: default_cooldown_secs(),
            max_radius: default_max_radius(),
            max_attempts: default_max_attempts(),
            water_check_radius: default_water_check_radius(),
            permission_level: default_rtp_permission_level(),
            worker_threads: default_worker_threads(),
        }
    }
}

impl RtpSection {
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn settings(&self) -> RtpSettings {
        RtpSettings {
            max_radius: self.max_radius,
            finder: SafeLocationFinder {
                max_attempts: self.max_attempts,
                water_check_radius: self.water_check_radius,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PermissionsSection {
    /// Operator level for players not listed in ops.json.
    #[serde(default)]
    pub default_level: u8,
}

impl ServerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.world.generator_kind()?;
        config.world.flat_blocks()?;
        if config.rtp.worker_threads == 0 {
            return Err("rtp.worker_threads must be at least 1".into());
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [server]
        name = "Test Server"
        max_players = 20

        [world]
        name = "world"
        generator = "flat"
        seed = 12345

        [logging]
        level = "debug"
    "#;

    #[test]
    fn parse_config() {
        let config: ServerConfig = toml::from_str(MINIMAL).unwrap();
        assert_eq!(config.server.name, "Test Server");
        assert_eq!(config.server.max_players, 20);
        assert_eq!(config.world.name, "world");
        assert_eq!(config.world.generator_kind().unwrap(), GeneratorKind::Flat);
        assert_eq!(config.world.seed, 12345);
        assert!(config.world.flat_layers.is_empty());
        assert_eq!(config.logging.level, "debug");
        // rtp section defaults when absent
        assert_eq!(config.rtp.cooldown(), Duration::from_secs(180));
        assert_eq!(config.rtp.max_radius, 5000);
        assert_eq!(config.rtp.max_attempts, 10);
        assert_eq!(config.rtp.water_check_radius, 3);
        assert_eq!(config.rtp.permission_level, 2);
        assert_eq!(config.rtp.worker_threads, 4);
        // permissions section defaults when absent
        assert_eq!(config.permissions.default_level, 0);
    }

    #[test]
    fn parse_config_with_rtp() {
        let toml_str = format!(
            "{MINIMAL}\n{}",
            r#"
            [rtp]
            cooldown_secs = 30
            max_radius = 100
            max_attempts = 4

            [permissions]
            default_level = 2
        "#
        );
        let config: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.rtp.cooldown(), Duration::from_secs(30));
        // unspecified keys keep their defaults
        assert_eq!(config.rtp.water_check_radius, 3);
        let settings = config.rtp.settings();
        assert_eq!(settings.max_radius, 100);
        assert_eq!(settings.finder.max_attempts, 4);
        assert_eq!(config.permissions.default_level, 2);
    }

    #[test]
    fn flat_layers_resolve_to_blocks() {
        let toml_str = MINIMAL.replace(
            "seed = 12345",
            "seed = 1\nflat_layers = [\"minecraft:bedrock\", \"stone\", \"minecraft:grass_block\"]",
        );
        let config: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(
            config.world.flat_blocks().unwrap(),
            vec![Block::Bedrock, Block::Stone, Block::GrassBlock]
        );
    }

    #[test]
    fn bad_world_values_are_reported() {
        let toml_str = MINIMAL
            .replace("\"flat\"", "\"nether\"")
            .replace("seed = 12345", "seed = 1\nflat_layers = [\"minecraft:cheese\"]");
        let config: ServerConfig = toml::from_str(&toml_str).unwrap();
        assert!(config.world.generator_kind().is_err());
        let err = config.world.flat_blocks().unwrap_err();
        assert!(err.to_string().contains("minecraft:cheese"));
    }

    #[test]
    fn missing_required_section_fails() {
        let toml_str = MINIMAL.replace("[logging]\n        level = \"debug\"", "");
        assert!(toml::from_str::<ServerConfig>(&toml_str).is_err());
    }
}
