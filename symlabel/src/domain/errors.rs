//! Structured error types for symlabel
//!
//! Using thiserror for automatic Display implementation and error chaining.

use std::path::PathBuf;
use thiserror::Error;

/// Broad failure class, used to pick the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments, missing debugger, missing plugin, missing target
    Configuration,
    /// Manifest or image header could not be read or understood
    Decode,
    /// The debugger session failed
    Session,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error(
        "x(64|32)dbg executable could not be found, add it to PATH or explicitly provide the path"
    )]
    DebuggerNotFound,

    #[error("Debugger executable {0} does not exist")]
    DebuggerMissing(PathBuf),

    #[error("x64dbg-automate plugin {plugin} not found in {dir}, please install it first")]
    PluginMissing { plugin: String, dir: PathBuf },

    #[error("Target executable {0} does not exist")]
    TargetMissing(PathBuf),

    #[error("Target {0} is not a file")]
    TargetNotFile(PathBuf),

    #[error("Failed to read symbols file {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Symbols file has invalid text encoding: {0}")]
    Encoding(String),

    #[error("Symbols file does not contain a JSON object")]
    NoJsonObject,

    #[error("Symbols file is not a valid manifest: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse PE header of {path}: {reason}")]
    ImageParse { path: PathBuf, reason: String },

    #[error("Debugger session error: {0}")]
    Session(String),

    #[error("Timed out waiting for {0}")]
    SessionTimeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ImportError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::DebuggerNotFound
            | ImportError::DebuggerMissing(_)
            | ImportError::PluginMissing { .. }
            | ImportError::TargetMissing(_)
            | ImportError::TargetNotFile(_) => ErrorKind::Configuration,
            ImportError::ManifestRead { .. }
            | ImportError::Encoding(_)
            | ImportError::NoJsonObject
            | ImportError::Json(_)
            | ImportError::ImageParse { .. } => ErrorKind::Decode,
            ImportError::Session(_) | ImportError::SessionTimeout(_) | ImportError::Io(_) => {
                ErrorKind::Session
            }
        }
    }
}
