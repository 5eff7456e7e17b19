//! Domain types providing compile-time safety and self-documentation
//!
//! These newtype wrappers keep raw file offsets, image bases and runtime
//! addresses from being mixed up in function signatures.

use std::fmt;
use std::path::Path;

/// Absolute address inside the debugged process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualAddress(pub u64);

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

impl From<u64> for VirtualAddress {
    fn from(addr: u64) -> Self {
        VirtualAddress(addr)
    }
}

/// Debugger build variant
///
/// x64dbg ships as two executables, `x64dbg.exe` and `x32dbg.exe`, and each
/// loads plugins built for its own bitness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebuggerArch {
    X64,
    X32,
}

impl DebuggerArch {
    /// Derive the variant from the debugger executable name
    ///
    /// Anything whose stem does not end in `x64dbg` is treated as the
    /// 32-bit build.
    #[must_use]
    pub fn from_executable(path: &Path) -> Self {
        let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
        let stem = name.strip_suffix(".exe").unwrap_or(&name);
        if stem.ends_with("x64dbg") {
            DebuggerArch::X64
        } else {
            DebuggerArch::X32
        }
    }

    /// Plugin file extension used by this variant
    #[must_use]
    pub fn plugin_extension(self) -> &'static str {
        match self {
            DebuggerArch::X64 => "dp64",
            DebuggerArch::X32 => "dp32",
        }
    }

    #[must_use]
    pub fn is_64(self) -> bool {
        self == DebuggerArch::X64
    }
}

impl fmt::Display for DebuggerArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebuggerArch::X64 => write!(f, "x64dbg"),
            DebuggerArch::X32 => write!(f, "x32dbg"),
        }
    }
}

/// Which manifest collection a symbol came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolGroup {
    User,
    Std,
}

impl fmt::Display for SymbolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolGroup::User => f.pad("user"),
            SymbolGroup::Std => f.pad("std"),
        }
    }
}
