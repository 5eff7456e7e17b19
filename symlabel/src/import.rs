//! Import orchestration: one session, one pass over the manifest

use log::info;

use crate::domain::{ImportError, SymbolGroup};
use crate::image::TargetImage;
use crate::labeling::{apply_labels, plan_labels, LabelReport, Rebaser};
use crate::manifest::SymbolManifest;
use crate::session::{DebuggerSession, SessionGuard, SessionLauncher};

/// Notice written to the debugger log once labeling is done
pub const COMPLETION_MESSAGE: &str = "symlabel: GoReSym symbols added!";

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Also label the std/runtime collection
    pub include_std: bool,
    /// Suppress progress output on stdout
    pub quiet: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self { include_std: true, quiet: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub rebaser: Rebaser,
    pub report: LabelReport,
}

/// Label every manifest entry in a fresh debugger session
///
/// The session is released on every path once acquired: explicitly on
/// success, by [`SessionGuard`]'s drop on any error.
///
/// # Errors
/// Returns a session error if the session cannot be started, the module
/// base cannot be queried, a label request fails at the transport level, or
/// the final detach fails.
pub fn import_symbols<L: SessionLauncher>(
    image: &TargetImage,
    manifest: &SymbolManifest,
    launcher: &L,
    options: ImportOptions,
) -> Result<ImportSummary, ImportError> {
    if !options.quiet {
        println!("Loading {}...", image.path.display());
    }
    let mut guard = SessionGuard::new(launcher.start_session(&image.path)?);
    let session = guard.session();

    let module_base = session.module_base()?;
    let rebaser = Rebaser::new(image.image_base, module_base);
    info!(
        "Rebasing from image base 0x{:x} to module base 0x{:x}{}",
        rebaser.image_base,
        rebaser.module_base,
        if rebaser.is_identity() { " (not relocated)" } else { "" }
    );

    let plan = plan_labels(manifest, rebaser, options.include_std);
    let split = plan.iter().position(|label| label.group == SymbolGroup::Std).unwrap_or(plan.len());
    let (user, std) = plan.split_at(split);

    if !options.quiet {
        println!("Adding {} user functions...", user.len());
    }
    let mut report = apply_labels(session, user)?;

    if options.include_std {
        if !options.quiet {
            println!("Adding {} std functions...", std.len());
        }
        report.std = apply_labels(session, std)?.std;
    }

    if !options.quiet {
        println!("Done!");
    }
    session.log(COMPLETION_MESSAGE)?;
    guard.finish()?;

    Ok(ImportSummary { rebaser, report })
}

/// Rebaser for a dry run, where no session exists to report the module base
///
/// Without an explicit base the image is assumed to load at its preferred base.
#[must_use]
pub fn dry_run_rebaser(image: &TargetImage, module_base: Option<u64>) -> Rebaser {
    Rebaser::new(image.image_base, module_base.unwrap_or(image.image_base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VirtualAddress;
    use crate::manifest::{parse_manifest, SymbolEntry};
    use crate::session::tests::{Call, FakeSession};
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    /// Hands out one prepared [`FakeSession`] and remembers the target
    struct FakeLauncher {
        session: RefCell<Option<FakeSession>>,
        started_with: RefCell<Option<PathBuf>>,
    }

    impl FakeLauncher {
        fn new(session: FakeSession) -> Self {
            Self { session: RefCell::new(Some(session)), started_with: RefCell::new(None) }
        }
    }

    impl SessionLauncher for FakeLauncher {
        type Session = FakeSession;

        fn start_session(&self, target: &Path) -> Result<FakeSession, ImportError> {
            *self.started_with.borrow_mut() = Some(target.to_path_buf());
            self.session
                .borrow_mut()
                .take()
                .ok_or_else(|| ImportError::Session("already started".to_string()))
        }
    }

    fn image(image_base: u64) -> TargetImage {
        TargetImage { path: PathBuf::from("go-sample.exe"), image_base, is_64: true }
    }

    const QUIET: ImportOptions = ImportOptions { include_std: true, quiet: true };

    #[test]
    fn test_end_to_end_single_user_function() {
        let manifest = parse_manifest(
            br#"{"UserFunctions":[{"Start":4198400,"FullName":"main.foo"}],"StdFunctions":null}"#,
        )
        .unwrap();
        let session = FakeSession::new(0x7FF6_0000_0000);
        let calls = Rc::clone(&session.calls);
        let launcher = FakeLauncher::new(session);

        let summary = import_symbols(&image(0x0040_0000), &manifest, &launcher, QUIET).unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::ModuleBase,
                Call::SetLabel(VirtualAddress(0x7FF6_0000_1000), "main.foo".into()),
                Call::Log(COMPLETION_MESSAGE.into()),
                Call::Detach,
            ]
        );
        assert_eq!(summary.report.applied(), 1);
        assert_eq!(launcher.started_with.borrow().as_deref(), Some(Path::new("go-sample.exe")));
    }

    #[test]
    fn test_user_labels_precede_std_labels() {
        let manifest = SymbolManifest {
            user_functions: vec![
                SymbolEntry::new("main.b", 0x2000),
                SymbolEntry::new("main.a", 0x1000),
            ],
            std_functions: vec![SymbolEntry::new("runtime.a", 0x3000)],
            ..SymbolManifest::default()
        };
        let session = FakeSession::new(0x1_0000);
        let calls = Rc::clone(&session.calls);
        let launcher = FakeLauncher::new(session);

        let summary = import_symbols(&image(0), &manifest, &launcher, QUIET).unwrap();

        let labels: Vec<String> = calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::SetLabel(_, name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["main.b", "main.a", "runtime.a"]);
        assert_eq!(summary.report.user.applied, 2);
        assert_eq!(summary.report.std.applied, 1);
    }

    #[test]
    fn test_skip_std() {
        let manifest = SymbolManifest {
            user_functions: vec![SymbolEntry::new("main.main", 0x1000)],
            std_functions: vec![SymbolEntry::new("runtime.main", 0x2000)],
            ..SymbolManifest::default()
        };
        let session = FakeSession::new(0);
        let calls = Rc::clone(&session.calls);
        let launcher = FakeLauncher::new(session);
        let options = ImportOptions { include_std: false, quiet: true };

        let summary = import_symbols(&image(0), &manifest, &launcher, options).unwrap();

        assert_eq!(summary.report.applied(), 1);
        let std_label = Call::SetLabel(VirtualAddress(0x2000), "runtime.main".into());
        assert!(!calls.borrow().contains(&std_label));
    }

    #[test]
    fn test_session_released_after_failure() {
        let manifest = SymbolManifest {
            user_functions: vec![
                SymbolEntry::new("main.a", 0x1000),
                SymbolEntry::new("main.b", 0x2000),
            ],
            ..SymbolManifest::default()
        };
        let mut session = FakeSession::new(0);
        session.fail_on = Some("main.a".to_string());
        let calls = Rc::clone(&session.calls);
        let launcher = FakeLauncher::new(session);

        let result = import_symbols(&image(0), &manifest, &launcher, QUIET);

        assert!(matches!(result, Err(ImportError::Session(_))));
        let calls = calls.borrow();
        assert_eq!(calls.last(), Some(&Call::Detach));
        assert!(!calls.iter().any(|c| matches!(c, Call::Log(_))));
    }

    #[test]
    fn test_empty_manifest_still_logs_and_detaches() {
        let session = FakeSession::new(0x1000);
        let calls = Rc::clone(&session.calls);
        let launcher = FakeLauncher::new(session);

        let summary =
            import_symbols(&image(0x1000), &SymbolManifest::default(), &launcher, QUIET).unwrap();

        assert_eq!(summary.report, LabelReport::default());
        assert_eq!(
            *calls.borrow(),
            vec![Call::ModuleBase, Call::Log(COMPLETION_MESSAGE.into()), Call::Detach]
        );
    }

    #[test]
    fn test_dry_run_rebaser_defaults_to_image_base() {
        let rebaser = dry_run_rebaser(&image(0x0040_0000), None);
        assert!(rebaser.is_identity());
        let rebaser = dry_run_rebaser(&image(0x0040_0000), Some(0x7ff6_0000_0000));
        assert_eq!(rebaser.module_base, 0x7ff6_0000_0000);
    }
}
