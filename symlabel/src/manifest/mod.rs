//! # Symbol Manifest Loading
//!
//! GoReSym writes its results as a JSON document. Two arrays matter here:
//!
//! ```text
//! {
//!   "UserFunctions": [ { "Start": 4198400, "FullName": "main.foo", ... }, ... ],
//!   "StdFunctions":  [ { "Start": 4194304, "FullName": "runtime.main", ... }, ... ]
//! }
//! ```
//!
//! Either array may be `null` or missing entirely; both mean "no entries".
//!
//! ## Encodings
//!
//! The manifest is usually captured by redirecting GoReSym's stdout, and
//! what lands on disk depends on the shell. PowerShell's `>` writes UTF-16LE
//! with a `FF FE` marker, `cmd.exe` writes plain bytes, and some editors add
//! a UTF-8 BOM. [`decode_text`] sniffs the bytes:
//!
//! 1. `FF FE` prefix: UTF-16LE
//! 2. any NUL byte: UTF-16 (big-endian only if prefixed with `FE FF`)
//! 3. otherwise: UTF-8
//!
//! Anything before the first `{` (marker remnants, a stray BOM) is dropped
//! before the JSON parser sees the text.

pub mod decode;
pub mod model;

pub use decode::{decode_text, load_manifest, parse_manifest, strip_to_object};
pub use model::{SymbolEntry, SymbolManifest};
