//! # Address Translation and Labeling
//!
//! GoReSym records function addresses as they appear in the file, i.e.
//! relative to the image's *preferred* base. Once the debugger has loaded
//! the image, ASLR or a collision may have placed it somewhere else:
//!
//! ```text
//! Preferred base (PE header):   0x0000000000400000
//! Actual module base (mod.main): 0x00007ff600000000
//!
//! main.foo recorded at          0x0000000000401000
//!   RVA     = 0x401000 - 0x400000        = 0x1000
//!   runtime = 0x7ff600000000 + 0x1000    = 0x7ff600001000
//! ```
//!
//! [`translate`] does the arithmetic, [`plan_labels`] turns a manifest into
//! an ordered list of labels, and [`apply_labels`] pushes that list into a
//! debugger session.

pub mod apply;
pub mod translate;

pub use apply::{apply_labels, plan_labels, GroupCount, LabelReport, PlannedLabel};
pub use translate::{translate, Rebaser};
