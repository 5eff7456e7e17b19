//! # symlabel - GoReSym symbols for x64dbg
//!
//! Go binaries are usually stripped, so a debugger shows nothing but raw
//! addresses. GoReSym recovers function names from the Go runtime's own
//! metadata (pclntab) and writes them to a JSON manifest. symlabel takes that
//! manifest and labels every function inside a live x64dbg/x32dbg session.
//!
//! ## Pipeline
//!
//! ```text
//!   preflight          image            manifest
//!  (debugger,      (PE ImageBase)   (decode + parse)
//!   plugin)              │                 │
//!      │                 └────────┬────────┘
//!      ▼                          ▼
//!   session  ── mod.main() ──▶ labeling ── set_label ──▶ x64dbg
//!  (x64dbg-automate)          (rebase)
//! ```
//!
//! ## Module Structure
//!
//! - [`preflight`]: Locate the debugger (explicit path or PATH) and check that
//!   the x64dbg-automate plugin for its bitness is installed
//! - [`image`]: Read the preferred image base from the target's PE header
//! - [`manifest`]: Decode the manifest (UTF-8, UTF-16LE/BE, BOMs) and parse it
//! - [`labeling`]: Rebase recorded addresses and push labels into a session
//! - [`session`]: Debugger session traits, scoped release, and the
//!   x64dbg-automate client
//! - [`import`]: The single orchestration routine tying it together
//! - [`cli`]: Command-line argument parsing
//! - [`domain`]: Core domain types and errors
//!
//! ## Typical Usage
//!
//! ```bash
//! GoReSym -p app.exe > syms.json
//! symlabel app.exe syms.json
//! ```

// Expose modules for testing
pub mod cli;
pub mod domain;
pub mod image;
pub mod import;
pub mod labeling;
pub mod manifest;
pub mod preflight;
pub mod session;
