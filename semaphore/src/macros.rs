//! Shorthands for building and returning [`crate::error::LockError`] values.

/// Creates a [`crate::error::LockError`] from a kind, a static description and optional
/// detail and source.
#[macro_export]
macro_rules! lock_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::LockError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::LockError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::LockError::from(($kind, $desc, $detail.to_string())).with_source($source)
    };
}

/// Returns a [`crate::error::LockError`] from the current function.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::lock_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::lock_error!($kind, $desc, $detail))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        return ::core::result::Result::Err($crate::lock_error!(
            $kind,
            $desc,
            $detail,
            source: $source
        ))
    };
}
