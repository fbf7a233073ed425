//! Macros for agent error handling.
//!
//! Provides convenience macros for creating and returning
//! [`crate::error::PostbackError`] instances with reduced boilerplate.

/// Creates a [`crate::error::PostbackError`] from error kind and description.
///
/// Accepts an optional dynamic detail and an optional source error.
#[macro_export]
macro_rules! postback_error {
    ($kind:expr, $desc:expr) => {
        $crate::error::PostbackError::from(($kind, $desc))
    };
    ($kind:expr, $desc:expr, source: $source:expr) => {
        $crate::error::PostbackError::from(($kind, $desc)).with_source($source)
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        $crate::error::PostbackError::from(($kind, $desc, $detail.to_string()))
    };
    ($kind:expr, $desc:expr, $detail:expr, source: $source:expr) => {
        $crate::error::PostbackError::from(($kind, $desc, $detail.to_string()))
            .with_source($source)
    };
}

/// Creates and returns a [`crate::error::PostbackError`] from the current
/// function.
///
/// Combines error creation with early return for error conditions that
/// should immediately terminate execution.
#[macro_export]
macro_rules! bail {
    ($kind:expr, $desc:expr) => {
        return ::core::result::Result::Err($crate::postback_error!($kind, $desc))
    };
    ($kind:expr, $desc:expr, $detail:expr) => {
        return ::core::result::Result::Err($crate::postback_error!($kind, $desc, $detail))
    };
}
