use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    pub relational_url: String,
    pub document_url: String,
    #[serde(default = "default_brokers")]
    pub event_bus_brokers: String,
    pub jwt_secret: String,
    #[serde(default = "default_jwt_ttl")]
    pub jwt_ttl_seconds: u64,
    #[serde(default = "default_lock_timeout")]
    pub inventory_lock_timeout_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}

fn default_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_jwt_ttl() -> u64 {
    3600
}

fn default_lock_timeout() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Loads `config/default` (optional) and then plain environment
    /// variables: PORT, RELATIONAL_URL, DOCUMENT_URL, EVENT_BUS_BROKERS,
    /// JWT_SECRET, JWT_TTL_SECONDS, INVENTORY_LOCK_TIMEOUT_MS, LOG_LEVEL.
    pub fn load() -> Result<Self, config::ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::Environment::default())
            .build()?;

        let cfg: Config = s.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        // Short HMAC secrets make tokens forgeable offline.
        if self.jwt_secret.len() < 32 {
            return Err(config::ConfigError::Message(
                "JWT_SECRET must be at least 32 bytes".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> Config {
        Config {
            port: default_port(),
            relational_url: "postgres://localhost/wayfare".into(),
            document_url: "mongodb://localhost/wayfare".into(),
            event_bus_brokers: default_brokers(),
            jwt_secret: secret.into(),
            jwt_ttl_seconds: default_jwt_ttl(),
            inventory_lock_timeout_ms: default_lock_timeout(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn short_secret_is_rejected() {
        assert!(config("tiny").validate().is_err());
        assert!(config("0123456789abcdef0123456789abcdef").validate().is_ok());
    }
}
