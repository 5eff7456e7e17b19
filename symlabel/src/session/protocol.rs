//! x64dbg-automate wire format
//!
//! The plugin serves a ZeroMQ REQ/REP socket on localhost. Each request is a
//! MessagePack array whose first element names the command:
//!
//! ```text
//! ["XAUTO_REQ_DBG_EVAL", "mod.main()"]          -> [value, ok]
//! ["XAUTO_REQ_SET_LABEL", 0x7ff600001000, "x"]  -> true
//! ["XAUTO_REQ_DBG_CMD_EXEC_DIRECT", "log \"hi\""] -> true
//! ```
//!
//! A request the plugin cannot handle is answered with a bare string
//! starting with `XERROR_`.
//!
//! The plugin advertises a running session by writing its port number to
//! `xauto_session.<debugger pid>.lock` in the temp directory.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::domain::ImportError;

pub const REQ_DBG_EVAL: &str = "XAUTO_REQ_DBG_EVAL";
pub const REQ_DBG_CMD_EXEC_DIRECT: &str = "XAUTO_REQ_DBG_CMD_EXEC_DIRECT";
pub const REQ_DBG_IS_DEBUGGING: &str = "XAUTO_REQ_DBG_IS_DEBUGGING";
pub const REQ_SET_LABEL: &str = "XAUTO_REQ_SET_LABEL";

const ERROR_PREFIX: &str = "XERROR_";

/// Serialize a request tuple
///
/// # Errors
/// Returns a session error if the request cannot be encoded.
pub fn encode<A: Serialize + ?Sized>(request: &A) -> Result<Vec<u8>, ImportError> {
    rmp_serde::to_vec(request).map_err(|e| ImportError::Session(format!("encode request: {e}")))
}

/// Deserialize a reply, surfacing plugin error strings
///
/// # Errors
/// Returns a session error carrying the plugin's `XERROR_*` text, or a
/// decode failure description for any other unexpected reply.
pub fn decode<R: DeserializeOwned>(reply: &[u8]) -> Result<R, ImportError> {
    match rmp_serde::from_slice::<R>(reply) {
        Ok(value) => Ok(value),
        Err(e) => match rmp_serde::from_slice::<String>(reply) {
            Ok(text) if text.starts_with(ERROR_PREFIX) => Err(ImportError::Session(text)),
            _ => Err(ImportError::Session(format!("unexpected reply: {e}"))),
        },
    }
}

/// Quote a string as an x64dbg command argument
#[must_use]
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// `log` command for a literal message
///
/// x64dbg expands `{expr}` inside log text, so braces are doubled.
#[must_use]
pub fn log_command(message: &str) -> String {
    format!("log {}", quote(&message.replace('{', "{{").replace('}', "}}")))
}

/// `init` command that loads `target` into the debugger
#[must_use]
pub fn init_command(target: &Path) -> String {
    format!("init {}", quote(&target.to_string_lossy()))
}

#[must_use]
pub fn lock_file_name(debugger_pid: u32) -> String {
    format!("xauto_session.{debugger_pid}.lock")
}

/// Port number stored in a session lock file
#[must_use]
pub fn parse_lock_file(contents: &str) -> Option<u16> {
    contents.trim().parse().ok()
}
