//! Configuration errors
//!
//! The simulation itself cannot fail; only loading and validating tuning data can.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum TuningError {
    /// Tuning file could not be read
    Io { path: PathBuf, source: std::io::Error },
    /// Tuning JSON is malformed or has the wrong shape
    Parse(serde_json::Error),
    /// A value parsed fine but makes no sense for the simulation
    Invalid { field: &'static str, reason: String },
}

impl TuningError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read tuning file {}: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid tuning json: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning value `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}
