// Application configuration, loaded from environment variables and CLI flags.

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Database URL (SQLite connection string).
    pub database_url: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Upper bound on pooled database connections.
    pub db_max_connections: u32,
    /// Lifetime of issued sessions, in hours.
    pub session_ttl_hours: i64,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `DATABASE_URL` - SQLite connection string (default: `sqlite:quiz.db?mode=rwc`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `DB_MAX_CONNECTIONS` - pool size (default: 5)
    /// - `SESSION_TTL_HOURS` - session lifetime (default: 24)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--database-url <URL>` - Override the database URL
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = Self::parse_cli_value(args, "--database-url")
            .or_else(|| env("DATABASE_URL"))
            .unwrap_or_else(|| "sqlite:quiz.db?mode=rwc".to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(3000);

        let db_max_connections = env("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(5);

        let session_ttl_hours = env("SESSION_TTL_HOURS")
            .and_then(|v| v.parse().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);

        Config {
            database_url,
            port,
            db_max_connections,
            session_ttl_hours,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}
