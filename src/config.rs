use std::net::SocketAddr;

use anyhow::Context;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| DEFAULT_HOST.into());
        // APP_PORT wins over the plain PORT used by older .env files
        let port = match std::env::var("APP_PORT").or_else(|_| std::env::var("PORT")) {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid port {raw:?}"))?,
            Err(_) => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_a_socket_addr() {
        let cfg = AppConfig::default();
        let addr = cfg.socket_addr().expect("default addr parses");
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn socket_addr_rejects_garbage_host() {
        let cfg = AppConfig {
            host: "not a host".into(),
            port: 8080,
        };
        assert!(cfg.socket_addr().is_err());
    }
}
