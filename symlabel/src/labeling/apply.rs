//! Label planning and application against a live session

use log::{debug, warn};
use std::fmt;

use super::translate::Rebaser;
use crate::domain::{ImportError, SymbolGroup, VirtualAddress};
use crate::manifest::{SymbolEntry, SymbolManifest};
use crate::session::DebuggerSession;

/// One label to be set in the debugger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedLabel {
    pub address: VirtualAddress,
    pub name: String,
    pub group: SymbolGroup,
}

impl fmt::Display for PlannedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x} {:<4} {}", self.address.0, self.group, self.name)
    }
}

/// Build the ordered label list: user functions first, then std functions
///
/// Manifest order is kept within each collection. With `include_std` off the
/// std collection is left out entirely.
#[must_use]
pub fn plan_labels(
    manifest: &SymbolManifest,
    rebaser: Rebaser,
    include_std: bool,
) -> Vec<PlannedLabel> {
    let std_functions: &[SymbolEntry] = if include_std { &manifest.std_functions } else { &[] };
    let user = manifest.user_functions.iter().map(|entry| (entry, SymbolGroup::User));
    let std = std_functions.iter().map(|entry| (entry, SymbolGroup::Std));

    user.chain(std)
        .map(|(entry, group)| PlannedLabel {
            address: rebaser.apply(entry),
            name: entry.name.clone(),
            group,
        })
        .collect()
}

/// Applied/skipped counters for one collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupCount {
    pub applied: usize,
    pub skipped: usize,
}

/// Outcome of a labeling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelReport {
    pub user: GroupCount,
    pub std: GroupCount,
}

impl LabelReport {
    #[must_use]
    pub fn applied(&self) -> usize {
        self.user.applied + self.std.applied
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.user.skipped + self.std.skipped
    }

    fn group_mut(&mut self, group: SymbolGroup) -> &mut GroupCount {
        match group {
            SymbolGroup::User => &mut self.user,
            SymbolGroup::Std => &mut self.std,
        }
    }
}

/// Set every planned label, in order
///
/// A label the debugger refuses is skipped with a warning. A session error
/// aborts the pass: the session is no longer trustworthy.
///
/// # Errors
/// Returns the first session error reported by `session`.
pub fn apply_labels<S: DebuggerSession + ?Sized>(
    session: &mut S,
    plan: &[PlannedLabel],
) -> Result<LabelReport, ImportError> {
    let mut report = LabelReport::default();

    for label in plan {
        let accepted = session.set_label(label.address, &label.name)?;
        let count = report.group_mut(label.group);
        if accepted {
            debug!("label {} = {}", label.address, label.name);
            count.applied += 1;
        } else {
            warn!("Debugger refused label {} at {}, skipping", label.name, label.address);
            count.skipped += 1;
        }
    }

    Ok(report)
}
