/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Push gateway settings.
    pub push: PushConfig,
}

/// Settings for the real-time push gateway.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// Base URL of the gateway (default: `http://127.0.0.1:8081`).
    pub gateway_url: String,
    /// Shared secret sent in the `X-Push-Secret` header.
    pub secret: String,
    /// Cap on concurrently in-flight bump requests (default: `16`).
    pub concurrency: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `3000`                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `PUSH_GATEWAY_URL`     | `http://127.0.0.1:8081`  |
    /// | `PUSH_SECRET`          | (empty)                  |
    /// | `PUSH_CONCURRENCY`     | `16`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let push = PushConfig {
            gateway_url: std::env::var("PUSH_GATEWAY_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8081".into()),
            secret: std::env::var("PUSH_SECRET").unwrap_or_default(),
            concurrency: std::env::var("PUSH_CONCURRENCY")
                .unwrap_or_else(|_| "16".into())
                .parse()
                .expect("PUSH_CONCURRENCY must be a valid usize"),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            push,
        }
    }
}
