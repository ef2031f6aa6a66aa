use std::{env, time::Duration};

use bazaar_common::{parse_boolean_flag, parse_number_or_default, Secret};
use bazaar_engine::{
    chat::hub::{DEFAULT_COMMAND_BUFFER, DEFAULT_CONNECTION_QUEUE_SIZE},
    HubConfig,
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};

use crate::errors::ServerError;

const DEFAULT_BZR_HOST: &str = "127.0.0.1";
const DEFAULT_BZR_PORT: u16 = 8460;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/bazaar.db";
const DEFAULT_ROOM_IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const DEFAULT_ROOM_REAPER_INTERVAL: Duration = Duration::from_secs(60);
/// HS256 keys shorter than the hash output are legal, but weak.
const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub hub: HubConfig,
    /// How long a chat room may sit empty before the reaper removes it.
    pub room_idle_timeout: Duration,
    /// How often the reaper looks for idle rooms.
    pub room_reaper_interval: Duration,
    /// If true, the embedded database migrations are run at startup.
    pub auto_migrate: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_BZR_HOST.to_string(),
            port: DEFAULT_BZR_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            hub: HubConfig::default(),
            room_idle_timeout: DEFAULT_ROOM_IDLE_TIMEOUT,
            room_reaper_interval: DEFAULT_ROOM_REAPER_INTERVAL,
            auto_migrate: true,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("BZR_HOST").ok().unwrap_or_else(|| DEFAULT_BZR_HOST.into());
        let port = env::var("BZR_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for BZR_PORT. {e} Using the default, {DEFAULT_BZR_PORT}, instead."
                    );
                    DEFAULT_BZR_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_BZR_PORT);
        let database_url = env::var("BZR_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ BZR_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let hub = HubConfig {
            command_buffer: parse_number_or_default(env::var("BZR_HUB_COMMAND_BUFFER").ok(), DEFAULT_COMMAND_BUFFER),
            connection_queue_size: parse_number_or_default(
                env::var("BZR_CONNECTION_QUEUE_SIZE").ok(),
                DEFAULT_CONNECTION_QUEUE_SIZE,
            ),
        };
        info!("🪛️ Hub command buffer: {}. Connection queue size: {}", hub.command_buffer, hub.connection_queue_size);
        let room_idle_timeout = seconds_from_env("BZR_ROOM_IDLE_TIMEOUT", DEFAULT_ROOM_IDLE_TIMEOUT);
        let room_reaper_interval = seconds_from_env("BZR_ROOM_REAPER_INTERVAL", DEFAULT_ROOM_REAPER_INTERVAL);
        let auto_migrate = parse_boolean_flag(env::var("BZR_AUTO_MIGRATE").ok(), true);
        Self { host, port, database_url, auth, hub, room_idle_timeout, room_reaper_interval, auto_migrate }
    }
}

fn seconds_from_env(var: &str, default: Duration) -> Duration {
    let value = env::var(var).ok();
    if value.is_none() {
        info!("🪛️ {var} is not set. Using the default value of {}s.", default.as_secs());
    }
    let secs = parse_number_or_default(value, default.as_secs());
    Duration::from_secs(secs)
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared HS256 secret used to verify access tokens.
    pub jwt_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. No token issued by \
             another service will be accepted. DO NOT operate on production like this. Set BZR_JWT_SECRET instead. \
             🚨️🚨️🚨️"
        );
        let secret = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect::<String>();
        Self { jwt_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { jwt_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("BZR_JWT_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [BZR_JWT_SECRET]")))?;
        if secret.trim().is_empty() {
            return Err(ServerError::ConfigurationError("BZR_JWT_SECRET is empty".to_string()));
        }
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            warn!("🪛️ BZR_JWT_SECRET is shorter than {MIN_JWT_SECRET_LENGTH} bytes. Consider using a longer secret.");
        }
        Ok(Self::new(secret))
    }
}
