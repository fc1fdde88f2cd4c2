//! Failures the `sandfx` binary reports, and the status it exits with.
//!
//! | code | meaning |
//! |------|---------|
//! | 2    | rejected by clap before `run` starts |
//! | 10   | the effect could not be built or run |
//! | 11   | a scene could not be read or a PNG written |
//! | 12   | a flag value did not parse (color, params, pointer) |
//! | 13   | JSON output could not be produced |

use sandfx_core::FxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Effect(FxError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("{0}")]
    Serialization(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Effect(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

/// File failures and unparsable colors are the user's to fix, so they keep
/// their own codes; everything else is an effect failure.
impl From<FxError> for CliError {
    fn from(e: FxError) -> Self {
        match e {
            FxError::Io(msg) => CliError::Io(msg),
            FxError::InvalidColor(msg) => CliError::Input(msg),
            other => CliError::Effect(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}
