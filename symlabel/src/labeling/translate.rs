//! Address translation between image space and module space

use crate::domain::VirtualAddress;
use crate::manifest::SymbolEntry;

/// Rebase a recorded address from the preferred image base onto the module base
///
/// Wrapping arithmetic: entries outside the image produce meaningless
/// addresses rather than a panic.
#[must_use]
pub fn translate(static_address: u64, image_base: u64, module_base: u64) -> VirtualAddress {
    VirtualAddress(static_address.wrapping_sub(image_base).wrapping_add(module_base))
}

/// Preferred/actual base pair for one loaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rebaser {
    pub image_base: u64,
    pub module_base: u64,
}

impl Rebaser {
    #[must_use]
    pub fn new(image_base: u64, module_base: u64) -> Self {
        Self { image_base, module_base }
    }

    #[must_use]
    pub fn apply(&self, entry: &SymbolEntry) -> VirtualAddress {
        translate(entry.static_address, self.image_base, self.module_base)
    }

    /// True if the image was loaded at its preferred base
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.image_base == self.module_base
    }
}
