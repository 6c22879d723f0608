//! Error types for the application layer.
//!
//! The simulation core has no failure modes; everything here belongs to the
//! surrounding window, configuration, and detector plumbing.

use thiserror::Error;

/// Top-level failure returned by [`crate::app::run`].
#[derive(Debug, Error)]
pub enum AppError {
    /// Creating or updating the preview window failed.
    #[error("window error: {0}")]
    Window(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rejected startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid colour {0:?}: expected #rrggbb or #rgb")]
    InvalidColor(String),

    #[error("invalid point count {0:?}: expected 1–200000")]
    InvalidCount(String),

    #[error("unknown shape {0:?}")]
    UnknownShape(String),

    #[error("invalid seed {0:?}")]
    InvalidSeed(String),

    #[error("missing value after {0}")]
    MissingValue(String),

    #[error("unknown flag {0:?}")]
    UnknownFlag(String),
}

/// A hand detector could not be brought up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    #[error("detector init failed: {0}")]
    Init(String),
}
