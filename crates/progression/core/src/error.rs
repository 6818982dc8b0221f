//! Common error infrastructure for progression-core.
//!
//! Domain-specific errors (`StatError`, `TalentError`, ...) live next to the
//! operations they reject. Every rejected operation leaves the character
//! untouched, so callers may retry freely.
//!
//! # Design Principles
//!
//! - **Type Safety**: Each subsystem has its own error type with specific variants
//! - **Severity Classification**: Errors are categorized for recovery strategies
//! - **Expected failures are values**: Illegal invest/undo attempts are frequent,
//!   user-driven outcomes and never panic

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: The operation may succeed later (more points, other talents changed)
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Unrecoverable errors indicating corrupted character state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Can succeed once the character's state changes.
    ///
    /// Examples: not enough free points, prerequisite not yet met
    Recoverable,

    /// Invalid input, should not retry without changes.
    ///
    /// Examples: unknown talent, stat already at cap
    Validation,

    /// Unexpected state inconsistency.
    ///
    /// These indicate bugs and should be investigated.
    Internal,

    /// Corrupted character state, cannot continue.
    ///
    /// Examples: save record from an unknown future version
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all progression-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait ProgressionError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
