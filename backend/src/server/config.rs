//! Server settings and the builder-style configuration handed to
//! [`super::create_server`].

use std::net::{AddrParseError, IpAddr, Ipv4Addr, SocketAddr};

use actix_web::cookie::{Key, SameSite};
use backend::outbound::persistence::{DEFAULT_MAX_CONNECTIONS, DbPool, PoolConfig};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_PORT: u16 = 8080;

/// Process settings loaded from CLI flags, `EVENTORA_*` variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "EVENTORA")]
pub struct ServerSettings {
    /// Interface to bind; all interfaces when absent.
    pub host: Option<String>,
    /// Listening port; 8080 when absent.
    pub port: Option<u16>,
    /// PostgreSQL URL. Without it the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Leave the schema untouched at start-up instead of applying pending
    /// migrations.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
}

impl ServerSettings {
    /// Socket address built from `host` and `port`.
    pub fn bind_addr(&self) -> Result<SocketAddr, AddrParseError> {
        let ip = match self.host.as_deref() {
            Some(host) => host.trim().parse()?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    /// Whether pending migrations should be applied before serving.
    #[must_use]
    pub const fn run_migrations(&self) -> bool {
        !self.skip_migrations
    }

    /// Pool configuration, or `None` when no database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| {
                PoolConfig::new(url)
                    .with_max_size(self.db_max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS))
            })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration from validated session settings.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            db_pool: None,
        }
    }

    /// Attach a database pool; repositories switch from memory to Diesel.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "EVENTORA_HOST",
        "EVENTORA_PORT",
        "EVENTORA_DATABASE_URL",
        "EVENTORA_DB_MAX_CONNECTIONS",
        "EVENTORA_SKIP_MIGRATIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("eventora")]).expect("config should load")
    }

    #[rstest]
    fn defaults_bind_all_interfaces_without_database() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
        );
        assert!(settings.pool_config().is_none());
        assert!(!settings.skip_migrations);
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("EVENTORA_HOST", Some("127.0.0.1".to_owned())),
            ("EVENTORA_PORT", Some("9090".to_owned())),
            (
                "EVENTORA_DATABASE_URL",
                Some("postgres://localhost/eventora".to_owned()),
            ),
            ("EVENTORA_DB_MAX_CONNECTIONS", Some("4".to_owned())),
            ("EVENTORA_SKIP_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("valid address"),
            SocketAddr::from(([127, 0, 0, 1], 9090))
        );
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://localhost/eventora");
        assert_eq!(pool.max_size(), 4);
        assert!(!settings.run_migrations());
    }

    #[rstest]
    fn blank_database_url_means_memory_store() {
        let settings = ServerSettings {
            host: None,
            port: None,
            database_url: Some("  ".to_owned()),
            db_max_connections: None,
            skip_migrations: false,
        };
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn malformed_host_is_rejected() {
        let settings = ServerSettings {
            host: Some("not-an-ip".to_owned()),
            port: None,
            database_url: None,
            db_max_connections: None,
            skip_migrations: false,
        };
        assert!(settings.bind_addr().is_err());
    }
}
