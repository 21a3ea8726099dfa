//! Server settings from the environment.

use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/shark";
pub const DEFAULT_CONFIG_PATH: &str = "config";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub config_path: String,
    pub bind_addr: String,
}

impl Settings {
    /// `DATABASE_URL`, `CONFIG_PATH` and `BIND_ADDR`, with defaults. Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Settings {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            config_path: lookup("CONFIG_PATH").unwrap_or_else(|| DEFAULT_CONFIG_PATH.into()),
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let settings = Settings::from_lookup(|key| (key == "BIND_ADDR").then(|| "127.0.0.1:8080".to_string()));
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.config_path, DEFAULT_CONFIG_PATH);
        assert_eq!(settings.socket_addr().unwrap().port(), 8080);
    }
}
