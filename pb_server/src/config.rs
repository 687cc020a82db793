//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use private_blackjack::{
    RoomConfig,
    net::discovery::{DEFAULT_DISCOVERY_PORT, DEFAULT_GAME_PORT},
};
use std::{net::SocketAddr, str::FromStr, time::Duration};

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Game server bind address
    pub bind: SocketAddr,
    /// UDP discovery port, `None` when discovery is disabled
    pub discovery_port: Option<u16>,
    /// Template every new room is created from
    pub room: RoomConfig,
    /// Prometheus listener address, `None` when metrics are disabled
    pub metrics_bind: Option<SocketAddr>,
}

/// Values given on the command line. They win over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<SocketAddr>,
    pub discovery_port: Option<u16>,
    pub seats: Option<usize>,
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but can't be parsed
    pub fn from_env(overrides: Overrides) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), overrides)
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F, overrides: Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RoomConfig::default();

        let bind = match overrides.bind {
            Some(bind) => bind,
            None => parse_var(&lookup, "SERVER_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_GAME_PORT))),
        };

        // Port 0 turns discovery off.
        let discovery_port = match overrides.discovery_port {
            Some(port) => port,
            None => parse_var(&lookup, "DISCOVERY_PORT")?.unwrap_or(DEFAULT_DISCOVERY_PORT),
        };
        let discovery_port = (discovery_port != 0).then_some(discovery_port);

        let seats = match overrides.seats {
            Some(seats) => seats,
            None => parse_var(&lookup, "ROOM_SEATS")?.unwrap_or(defaults.seats),
        };

        let action_timeout = parse_var::<u64, _>(&lookup, "ACTION_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let room = RoomConfig {
            seats,
            decks: parse_var(&lookup, "ROOM_DECKS")?.unwrap_or(defaults.decks),
            starting_money: parse_var(&lookup, "STARTING_MONEY")?
                .unwrap_or(defaults.starting_money),
            pity_money: parse_var(&lookup, "PITY_MONEY")?.unwrap_or(defaults.pity_money),
            action_timeout,
            shuffle_seed: parse_var(&lookup, "SHUFFLE_SEED")?,
        };

        let metrics_bind = match overrides.metrics_bind {
            Some(addr) => Some(addr),
            None => parse_var(&lookup, "METRICS_BIND")?,
        };

        Ok(ServerConfig {
            bind,
            discovery_port,
            room,
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.room.validate().map_err(|reason| ConfigError::Invalid {
            var: "ROOM_*".to_string(),
            reason,
        })?;

        if self.metrics_bind.is_some_and(|addr| addr == self.bind) {
            return Err(ConfigError::Invalid {
                var: "METRICS_BIND".to_string(),
                reason: format!("Must differ from the game address ({})", self.bind),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional variable. Unset and empty are both `None`; anything
/// else has to parse.
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| ConfigError::Invalid {
                    var: key.to_string(),
                    reason: format!("{value:?}: {e}"),
                })
        }
        _ => Ok(None),
    }
}
