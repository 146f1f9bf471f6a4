use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::shared::ValidationError;

/// Application name reported to Postgres by connections opened by pipeline runs.
const APP_NAME: &str = "tp_run_semaphore";

/// Session settings applied to every reference database connection.
///
/// Short statement and lock timeouts keep a stuck registry from hanging a run on a single
/// query; the poll loop is the only place allowed to wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgSessionOptions {
    pub datestyle: &'static str,
    pub client_encoding: &'static str,
    pub timezone: &'static str,
    pub statement_timeout_ms: u32,
    pub lock_timeout_ms: u32,
    pub application_name: &'static str,
}

impl Default for PgSessionOptions {
    fn default() -> Self {
        Self {
            datestyle: "ISO",
            client_encoding: "UTF8",
            timezone: "UTC",
            statement_timeout_ms: 30_000,
            lock_timeout_ms: 10_000,
            application_name: APP_NAME,
        }
    }
}

impl PgSessionOptions {
    /// Returns the options as key-value pairs suitable for sqlx.
    pub fn to_key_value_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("datestyle", self.datestyle.to_string()),
            ("client_encoding", self.client_encoding.to_string()),
            ("timezone", self.timezone.to_string()),
            ("statement_timeout", self.statement_timeout_ms.to_string()),
            ("lock_timeout", self.lock_timeout_ms.to_string()),
        ]
    }
}

/// Configuration for connecting to the Postgres reference database.
///
/// This intentionally does not implement `Serialize` so the password cannot leak into
/// serialized forms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PgConnectionConfig {
    /// Hostname or IP address of the Postgres server.
    pub host: String,
    /// Port on which the Postgres server is listening.
    pub port: u16,
    /// Name of the database.
    pub name: String,
    /// Username for authentication.
    pub username: String,
    /// Password for the user, redacted in debug output.
    pub password: Option<SecretString>,
    /// TLS settings.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl PgConnectionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tls.validate()
    }
}

/// TLS settings for Postgres connections.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TlsConfig {
    /// PEM-encoded trusted root certificates.
    #[serde(default)]
    pub trusted_root_certs: String,
    /// Whether TLS is enabled.
    #[serde(default)]
    pub enabled: bool,
}

impl TlsConfig {
    /// Returns [`ValidationError::MissingTrustedRootCerts`] if TLS is enabled without
    /// certificates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.trusted_root_certs.is_empty() {
            return Err(ValidationError::MissingTrustedRootCerts);
        }

        Ok(())
    }
}

/// Converts a connection config into driver-specific connect options.
pub trait IntoConnectOptions<Output> {
    /// Options without a database, for administrative statements.
    fn without_db(&self) -> Output;

    /// Options for the configured database.
    fn with_db(&self) -> Output;
}

impl IntoConnectOptions<PgConnectOptions> for PgConnectionConfig {
    fn without_db(&self) -> PgConnectOptions {
        let session = PgSessionOptions::default();
        let ssl_mode = if self.tls.enabled {
            PgSslMode::VerifyFull
        } else {
            PgSslMode::Prefer
        };

        let mut options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .ssl_mode(ssl_mode)
            .application_name(session.application_name)
            .options(session.to_key_value_pairs());

        if self.tls.enabled {
            options =
                options.ssl_root_cert_from_pem(self.tls.trusted_root_certs.clone().into_bytes());
        }

        if let Some(password) = &self.password {
            options = options.password(password.expose_secret());
        }

        options
    }

    fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.name)
    }
}
