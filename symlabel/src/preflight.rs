//! Pre-flight checks for symlabel
//!
//! Validates the target and the debugger installation before any file is
//! parsed or a session is opened. Provides clear, actionable error messages
//! when requirements aren't met.

use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::domain::{DebuggerArch, ImportError};

/// Executable names searched on PATH, in order of preference
pub const DEBUGGER_NAMES: [&str; 2] = ["x64dbg", "x32dbg"];

/// Plugin file stem shared by both debugger variants
const PLUGIN_STEM: &str = "x64dbg-automate";

/// A debugger that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub debugger: PathBuf,
    pub arch: DebuggerArch,
    pub plugin: PathBuf,
}

/// Run all pre-flight checks
///
/// The debugger is resolved first so a missing installation is reported
/// before anything on disk is touched. The returned [`Toolchain::debugger`]
/// is the exact path the session launcher must use.
///
/// # Errors
/// Returns a configuration-class [`ImportError`] for a missing target,
/// debugger, or plugin.
pub fn run_preflight_checks(
    target: &Path,
    explicit_debugger: Option<&Path>,
) -> Result<Toolchain, ImportError> {
    let debugger = resolve_debugger(explicit_debugger, |name| which::which(name).ok())?;
    let arch = DebuggerArch::from_executable(&debugger);
    let plugin = check_plugin(&debugger, arch)?;
    check_target_exists(target)?;
    info!("Using {} ({arch}), plugin {}", debugger.display(), plugin.display());
    Ok(Toolchain { debugger, arch, plugin })
}

/// Check that the target executable exists and is a file
///
/// # Errors
/// Returns [`ImportError::TargetMissing`] or [`ImportError::TargetNotFile`].
pub fn check_target_exists(target: &Path) -> Result<(), ImportError> {
    if !target.exists() {
        return Err(ImportError::TargetMissing(target.to_path_buf()));
    }
    if !target.is_file() {
        return Err(ImportError::TargetNotFile(target.to_path_buf()));
    }
    Ok(())
}

/// Pick the debugger executable
///
/// An explicit path wins; otherwise each of [`DEBUGGER_NAMES`] is looked up
/// with `lookup`. The chosen path must exist as a file.
///
/// # Errors
/// Returns [`ImportError::DebuggerNotFound`] if nothing was given or found,
/// and [`ImportError::DebuggerMissing`] if the chosen path is not a file.
pub fn resolve_debugger<F>(explicit: Option<&Path>, lookup: F) -> Result<PathBuf, ImportError>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    let debugger = match explicit {
        Some(path) => path.to_path_buf(),
        None => DEBUGGER_NAMES
            .iter()
            .find_map(|name| {
                let found = lookup(name);
                debug!("PATH lookup {name}: {found:?}");
                found
            })
            .ok_or(ImportError::DebuggerNotFound)?,
    };

    if !debugger.is_file() {
        return Err(ImportError::DebuggerMissing(debugger));
    }
    Ok(debugger)
}

/// Where the automation plugin must live for `debugger`
#[must_use]
pub fn plugin_path(debugger: &Path, arch: DebuggerArch) -> PathBuf {
    debugger
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join("plugins")
        .join(format!("{PLUGIN_STEM}.{}", arch.plugin_extension()))
}

/// Check that the automation plugin matching `arch` is installed
///
/// # Errors
/// Returns [`ImportError::PluginMissing`] naming the plugin directory.
pub fn check_plugin(debugger: &Path, arch: DebuggerArch) -> Result<PathBuf, ImportError> {
    let plugin = plugin_path(debugger, arch);
    if plugin.is_file() {
        return Ok(plugin);
    }
    let dir = plugin.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = plugin.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    Err(ImportError::PluginMissing { plugin: name, dir })
}
