//! Error types and result definitions for semaphore operations.
//!
//! [`LockError`] carries a classification, a static description, optional dynamic detail and
//! the callsite that raised it.

use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Result type of every fallible semaphore operation.
pub type LockResult<T> = Result<T, LockError>;

/// Error raised by the lock registry and the protocol running on top of it.
#[derive(Debug, Clone)]
pub struct LockError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
}

/// Categories of failures surfaced by the semaphore.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Registry Errors
    RegistryConnectionFailed,
    RegistryQueryFailed,
    RegistryIoError,

    // Protocol Errors
    LockPollExhausted,

    // Input Errors
    InvalidCheckPath,
    InvalidRunId,
    ConversionError,

    // Configuration Errors
    ConfigError,
}

impl LockError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the static description of this error.
    pub fn description(&self) -> &str {
        self.description.as_ref()
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the callsite that created this error.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches an originating error exposed through [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        LockError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
        }
    }
}

impl PartialEq for LockError {
    fn eq(&self, other: &LockError) -> bool {
        self.kind == other.kind
    }
}

impl fmt::Display for LockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            write!(f, "\n  Detail:")?;
            for line in detail.lines() {
                write!(f, "\n    {line}")?;
            }
        }

        Ok(())
    }
}

impl error::Error for LockError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source as &(dyn error::Error + 'static))
    }
}

impl From<(ErrorKind, &'static str)> for LockError {
    #[track_caller]
    fn from((kind, desc): (ErrorKind, &'static str)) -> LockError {
        LockError::from_components(kind, Cow::Borrowed(desc), None, None)
    }
}

impl<D> From<(ErrorKind, &'static str, D)> for LockError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, desc, detail): (ErrorKind, &'static str, D)) -> LockError {
        LockError::from_components(kind, Cow::Borrowed(desc), Some(detail.into()), None)
    }
}

impl From<config::shared::ValidationError> for LockError {
    #[track_caller]
    fn from(err: config::shared::ValidationError) -> LockError {
        let detail = err.to_string();
        LockError::from_components(
            ErrorKind::ConfigError,
            Cow::Borrowed("Invalid semaphore configuration"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Maps Postgres failures onto registry error kinds.
///
/// SQLSTATE class `08` and admin shutdowns (`57P01`..`57P03`) are reported as connection
/// failures since the statement never had a chance to run.
impl From<sqlx::Error> for LockError {
    #[track_caller]
    fn from(err: sqlx::Error) -> LockError {
        let kind = match &err {
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some(code) if code.starts_with("08") => ErrorKind::RegistryConnectionFailed,
                Some("57P01" | "57P02" | "57P03") => ErrorKind::RegistryConnectionFailed,
                _ => ErrorKind::RegistryQueryFailed,
            },
            sqlx::Error::Io(_) => ErrorKind::RegistryIoError,
            sqlx::Error::Tls(_) | sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
                ErrorKind::RegistryConnectionFailed
            }
            _ => ErrorKind::RegistryQueryFailed,
        };

        let detail = err.to_string();
        LockError::from_components(
            kind,
            Cow::Borrowed("Lock registry operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}
