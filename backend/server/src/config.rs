use std::{env, fmt::Display, fs::read_to_string, str::FromStr};

use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub mongodb_uri: String,
    pub database: String,
    pub static_dir: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "3456"),
            mongodb_uri: load_required("MONGODB_URI"),
            database: try_load("MONGODB_DATABASE", "voting"),
            static_dir: try_load("STATIC_DIR", "./client/build"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key)
        .map_err(|_| {
            warn!("Environment variable {key} not found");
        })
        .and_then(|value| if value.is_empty() { Err(()) } else { Ok(value) })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    parse_or_default(key, var(key).ok(), default)
}

fn parse_or_default<T: FromStr>(key: &str, value: Option<String>, default: &str) -> T
where
    T::Err: Display,
{
    value
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

fn load_required(key: &str) -> String {
    var(key)
        .or_else(|_| read_secret(key))
        .map_err(|_| {
            warn!("You must set {key}, either as an environment variable or as a secret");
        })
        .expect("Environment misconfigured!")
}

fn read_secret(secret_name: &str) -> Result<String, ()> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            warn!("Failed to read {secret_name} from file: {e}");
        })
        .and_then(|value| if value.is_empty() { Err(()) } else { Ok(value) })
}
