//! # symlabel - Main Entry Point
//!
//! Supports two operational modes:
//! - **Import** (default): start x64dbg/x32dbg on the target and label it
//! - **Dry run** (`--dry-run`): print the rebased labels without a debugger

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use symlabel::cli::Args;
use symlabel::domain::{ErrorKind, ImportError};
use symlabel::image::TargetImage;
use symlabel::import::{dry_run_rebaser, import_symbols, ImportOptions};
use symlabel::labeling::plan_labels;
use symlabel::manifest::{load_manifest, SymbolManifest};
use symlabel::preflight::{check_target_exists, run_preflight_checks};
use symlabel::session::AutomateLauncher;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_DATAERR: i32 = 65;

fn main() {
    env_logger::init();
    std::process::exit(match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            let code = exit_code_for(&e);
            eprintln!("error: {e:#}");
            code
        }
    });
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<ImportError>().map(ImportError::kind) {
        Some(ErrorKind::Configuration) => EXIT_USAGE,
        Some(ErrorKind::Decode) => EXIT_DATAERR,
        Some(ErrorKind::Session) | None => EXIT_ERROR,
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    if args.dry_run {
        return dry_run(&args);
    }

    // Configuration problems surface before any parsing or session work
    let toolchain = run_preflight_checks(&args.target, args.debugger.as_deref())?;

    let image = TargetImage::open(&args.target)?;
    if image.is_64 != toolchain.arch.is_64() {
        warn!(
            "{} is a {}-bit image but {} is the {}-bit debugger",
            args.target.display(),
            if image.is_64 { 64 } else { 32 },
            toolchain.arch,
            if toolchain.arch.is_64() { 64 } else { 32 }
        );
    }

    let manifest = load_manifest(&args.symbols)?;
    print_banner(&args, &manifest);

    let launcher = AutomateLauncher::new(toolchain.debugger, args.session_config());
    let options = ImportOptions { include_std: !args.skip_std, quiet: args.quiet };
    let summary = import_symbols(&image, &manifest, &launcher, options)
        .with_context(|| format!("Failed to import symbols into {}", args.target.display()))?;

    if summary.report.skipped() > 0 {
        eprintln!(
            "warning: {} of {} labels were refused by the debugger",
            summary.report.skipped(),
            summary.report.applied() + summary.report.skipped()
        );
    }

    Ok(())
}

fn dry_run(args: &Args) -> Result<()> {
    check_target_exists(&args.target)?;
    let image = TargetImage::open(&args.target)?;
    let manifest = load_manifest(&args.symbols)?;
    print_banner(args, &manifest);

    let rebaser = dry_run_rebaser(&image, args.module_base);
    for label in plan_labels(&manifest, rebaser, !args.skip_std) {
        println!("{label}");
    }
    Ok(())
}

fn print_banner(args: &Args, manifest: &SymbolManifest) {
    if args.quiet {
        return;
    }
    println!("symlabel v{}", env!("CARGO_PKG_VERSION"));
    println!("target: {}", args.target.display());
    if let Some(ref version) = manifest.version {
        println!("go: {version}");
    }
    if let Some(ref build_id) = manifest.build_id {
        println!("build id: {build_id}");
    }
}
