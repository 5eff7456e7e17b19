//! CLI argument definitions

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::SessionConfig;

#[derive(Parser, Debug)]
#[command(
    name = "symlabel",
    version,
    about = "Add GoReSym symbols to an x(64|32)dbg debug session",
    after_help = "\
EXAMPLES:
    symlabel app.exe syms.json                           Use x64dbg/x32dbg from PATH
    symlabel app.exe syms.json --debugger C:\\x64dbg\\release\\x64\\x64dbg.exe
    symlabel app.exe syms.json --dry-run --module-base 0x7ff600000000"
)]
pub struct Args {
    /// Path to the target executable
    #[arg(value_name = "TARGET_EXE")]
    pub target: PathBuf,

    /// Path to the symbols JSON file
    #[arg(value_name = "SYMBOLS_JSON")]
    pub symbols: PathBuf,

    /// Path to the x(64|32)dbg executable (defaults to the first found in PATH)
    #[arg(long, visible_alias = "x64dbg-path", value_name = "PATH")]
    pub debugger: Option<PathBuf>,

    /// Only label user functions
    #[arg(long)]
    pub skip_std: bool,

    /// Print the labels that would be set without starting a debugger
    #[arg(long)]
    pub dry_run: bool,

    /// Module base to assume for --dry-run (hex, defaults to the image base)
    #[arg(long, value_name = "HEX", value_parser = parse_hex, requires = "dry_run")]
    pub module_base: Option<u64>,

    /// Seconds to wait for the debugger to load the target
    #[arg(long, default_value = "30", value_name = "SECS")]
    pub startup_timeout: u64,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default().with_startup_timeout(Duration::from_secs(self.startup_timeout))
    }
}

fn parse_hex(value: &str) -> Result<u64, String> {
    let digits = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")).unwrap_or(value);
    u64::from_str_radix(&digits.replace('_', ""), 16)
        .map_err(|e| format!("invalid hex address: {e}"))
}
