pub mod domain;
pub mod enrich;
pub mod form;
pub mod optimize;
pub mod orchestrator;
pub mod suggest;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_OPTIMIZER_BASE_URL: &str = "http://localhost:5000";
    pub const DEFAULT_POLYGON_BASE_URL: &str = "https://api.polygon.io";
    pub const DEFAULT_SUGGEST_BASE_URL: &str = "https://ticker-2e1ica8b9.now.sh";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub optimizer_base_url: Option<String>,
        pub polygon_api_key: Option<String>,
        pub polygon_base_url: Option<String>,
        pub suggest_base_url: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                optimizer_base_url: std::env::var("OPTIMIZER_BASE_URL").ok(),
                polygon_api_key: std::env::var("POLYGON_KEY").ok(),
                polygon_base_url: std::env::var("POLYGON_BASE_URL").ok(),
                suggest_base_url: std::env::var("SUGGEST_BASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn optimizer_base_url(&self) -> &str {
            self.optimizer_base_url
                .as_deref()
                .unwrap_or(DEFAULT_OPTIMIZER_BASE_URL)
        }

        pub fn polygon_base_url(&self) -> &str {
            self.polygon_base_url
                .as_deref()
                .unwrap_or(DEFAULT_POLYGON_BASE_URL)
        }

        pub fn suggest_base_url(&self) -> &str {
            self.suggest_base_url
                .as_deref()
                .unwrap_or(DEFAULT_SUGGEST_BASE_URL)
        }

        pub fn require_polygon_api_key(&self) -> anyhow::Result<&str> {
            self.polygon_api_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
                .context("POLYGON_KEY is required")
        }
    }

    /// Reads a numeric env var, falling back to `default` when unset or unparsable.
    pub fn env_u64(key: &str, default: u64) -> u64 {
        std::env::var(key)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(default)
    }

}
