use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    /// Built dashboard assets; not served when unset
    pub frontend_dir: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub seed_demo_data: bool,
    pub cors_allow_origin: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/venue.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            frontend_dir: Some(get_env("FRONTEND_DIR", "")).filter(|d| !d.is_empty()),
            jwt_secret: get_env("JWT_SECRET", ""),
            jwt_ttl_hours: get_env("JWT_TTL_HOURS", "24").parse().unwrap_or(24),
            seed_demo_data: parse_bool(&get_env("SEED_DEMO_DATA", "false")),
            cors_allow_origin: get_env("CORS_ALLOW_ORIGIN", "*"),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" TRUE "));
        assert!(parse_bool("1"));
        assert!(parse_bool("yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("nope"));
    }
}
