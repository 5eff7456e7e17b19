//! Debugger session abstraction
//!
//! The importer only needs five things from a debugger: start a session on
//! a target, ask for the main module's base, set a label, write to the log,
//! and let go. [`DebuggerSession`] and [`SessionLauncher`] describe exactly
//! that, so the orchestration can run against the real x64dbg-automate
//! client ([`automate`]) or an in-memory fake in tests.

pub mod automate;
pub mod config;
pub mod protocol;

use log::{debug, warn};
use std::path::Path;

use crate::domain::{ImportError, VirtualAddress};

pub use automate::{AutomateLauncher, AutomateSession};
pub use config::SessionConfig;

/// A live, exclusively owned debugger session
pub trait DebuggerSession {
    /// Actual base address of the main module in the debuggee
    ///
    /// # Errors
    /// Returns a session error if the query fails.
    fn module_base(&mut self) -> Result<u64, ImportError>;

    /// Set a label at an absolute address
    ///
    /// `Ok(false)` means the debugger refused this particular label; the
    /// session is still usable.
    ///
    /// # Errors
    /// Returns a session error if the debugger could not be reached.
    fn set_label(&mut self, address: VirtualAddress, name: &str) -> Result<bool, ImportError>;

    /// Append a line to the debugger's log window
    ///
    /// # Errors
    /// Returns a session error if the debugger could not be reached.
    fn log(&mut self, message: &str) -> Result<(), ImportError>;

    /// Release the session, leaving the debugger running
    ///
    /// # Errors
    /// Returns a session error if the connection could not be closed cleanly.
    fn detach(&mut self) -> Result<(), ImportError>;
}

/// Something that can open a [`DebuggerSession`] on a target image
pub trait SessionLauncher {
    type Session: DebuggerSession;

    /// Start a debugging session on `target`
    ///
    /// # Errors
    /// Returns a session error if the debugger cannot be started or reached.
    fn start_session(&self, target: &Path) -> Result<Self::Session, ImportError>;
}

/// Owns a session and releases it on every exit path
///
/// Call [`SessionGuard::finish`] on the success path to observe the detach
/// result. If the guard is dropped without `finish` (an early `?` return),
/// it detaches best-effort and logs any failure.
pub struct SessionGuard<S: DebuggerSession> {
    session: S,
    released: bool,
}

impl<S: DebuggerSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session, released: false }
    }

    /// Borrow the live session
    pub fn session(&mut self) -> &mut S {
        &mut self.session
    }

    /// Detach explicitly and report the result
    ///
    /// # Errors
    /// Returns whatever the session's `detach` returns.
    pub fn finish(mut self) -> Result<(), ImportError> {
        self.released = true;
        self.session.detach()
    }
}

impl<S: DebuggerSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        debug!("Releasing debugger session on early exit");
        if let Err(e) = self.session.detach() {
            warn!("Failed to detach debugger session: {e}");
        }
    }
}
