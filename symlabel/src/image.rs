//! Target image header inspection
//!
//! The only facts needed from the target are its preferred load address
//! (`OptionalHeader.ImageBase`) and whether it is a 32- or 64-bit image.

use log::info;
use object::{BinaryFormat, Object};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::ImportError;

/// The binary being debugged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetImage {
    pub path: PathBuf,
    /// Preferred base declared in the PE optional header
    pub image_base: u64,
    pub is_64: bool,
}

impl TargetImage {
    /// Read the PE header of `path`
    ///
    /// # Errors
    /// Returns [`ImportError::ImageParse`] if the file is unreadable or not a PE image.
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let data = fs::read(path).map_err(|e| ImportError::ImageParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let image = Self::parse(path, &data)?;
        info!(
            "{}: {}-bit PE, image base 0x{:x}",
            path.display(),
            if image.is_64 { 64 } else { 32 },
            image.image_base
        );
        Ok(image)
    }

    /// Parse an in-memory PE image
    ///
    /// # Errors
    /// Returns [`ImportError::ImageParse`] if `data` is not a PE image.
    pub fn parse(path: &Path, data: &[u8]) -> Result<Self, ImportError> {
        let parse_err =
            |reason: String| ImportError::ImageParse { path: path.to_path_buf(), reason };

        let obj = object::File::parse(data).map_err(|e| parse_err(e.to_string()))?;
        if obj.format() != BinaryFormat::Pe {
            return Err(parse_err(format!("expected a PE image, found {:?}", obj.format())));
        }

        // For PE files the relative address base is OptionalHeader.ImageBase
        Ok(Self {
            path: path.to_path_buf(),
            image_base: obj.relative_address_base(),
            is_64: obj.is_64(),
        })
    }
}
