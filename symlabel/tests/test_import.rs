use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use symlabel::domain::{ErrorKind, ImportError, VirtualAddress};
use symlabel::image::TargetImage;
use symlabel::import::{import_symbols, ImportOptions, COMPLETION_MESSAGE};
use symlabel::manifest::load_manifest;
use symlabel::session::{DebuggerSession, SessionLauncher};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Start(String),
    Label(u64, String),
    Log(String),
    Detach,
}

type Journal = Rc<RefCell<Vec<Event>>>;

struct RecordingSession {
    module_base: u64,
    journal: Journal,
}

impl DebuggerSession for RecordingSession {
    fn module_base(&mut self) -> Result<u64, ImportError> {
        Ok(self.module_base)
    }

    fn set_label(&mut self, address: VirtualAddress, name: &str) -> Result<bool, ImportError> {
        self.journal.borrow_mut().push(Event::Label(address.0, name.to_string()));
        Ok(true)
    }

    fn log(&mut self, message: &str) -> Result<(), ImportError> {
        self.journal.borrow_mut().push(Event::Log(message.to_string()));
        Ok(())
    }

    fn detach(&mut self) -> Result<(), ImportError> {
        self.journal.borrow_mut().push(Event::Detach);
        Ok(())
    }
}

struct RecordingLauncher {
    module_base: u64,
    journal: Journal,
}

impl SessionLauncher for RecordingLauncher {
    type Session = RecordingSession;

    fn start_session(&self, target: &Path) -> Result<RecordingSession, ImportError> {
        let name = target.file_name().unwrap().to_string_lossy().into_owned();
        self.journal.borrow_mut().push(Event::Start(name));
        Ok(RecordingSession { module_base: self.module_base, journal: Rc::clone(&self.journal) })
    }
}

/// Minimal PE32+ image with the given preferred base
fn pe64(image_base: u64) -> Vec<u8> {
    let mut pe = vec![0u8; 0x40];
    pe[0..2].copy_from_slice(b"MZ");
    pe[0x3c..0x40].copy_from_slice(&0x40u32.to_le_bytes());
    pe.extend_from_slice(b"PE\0\0");
    pe.extend_from_slice(&0x8664u16.to_le_bytes());
    pe.extend_from_slice(&[0u8; 14]);
    pe.extend_from_slice(&240u16.to_le_bytes());
    pe.extend_from_slice(&0x0022u16.to_le_bytes());

    let mut opt = vec![0u8; 240];
    opt[0..2].copy_from_slice(&0x20bu16.to_le_bytes());
    opt[24..32].copy_from_slice(&image_base.to_le_bytes());
    opt[32..36].copy_from_slice(&0x1000u32.to_le_bytes());
    opt[36..40].copy_from_slice(&0x200u32.to_le_bytes());
    opt[56..60].copy_from_slice(&0x1000u32.to_le_bytes());
    opt[60..64].copy_from_slice(&0x200u32.to_le_bytes());
    opt[68..70].copy_from_slice(&3u16.to_le_bytes());
    opt[108..112].copy_from_slice(&16u32.to_le_bytes());
    pe.extend_from_slice(&opt);
    pe.resize(0x200, 0);
    pe
}

fn utf16le_with_marker(text: &str) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    bytes
}

#[test]
fn test_import_from_powershell_redirected_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("server.exe");
    let symbols = dir.path().join("syms.json");
    fs::write(&target, pe64(0x0040_0000)).unwrap();
    fs::write(
        &symbols,
        utf16le_with_marker(
            &serde_json::json!({
                "Version": "1.22.1",
                "UserFunctions": [
                    {"Start": 4198400, "End": 4198500,
                     "PackageName": "main", "FullName": "main.foo"},
                    {"Start": 4202496, "End": 4202600,
                     "PackageName": "main", "FullName": "main.bar"}
                ],
                "StdFunctions": [
                    {"Start": 4194560, "End": 4194600,
                     "PackageName": "runtime", "FullName": "runtime.main"}
                ]
            })
            .to_string(),
        ),
    )
    .unwrap();

    let image = TargetImage::open(&target).unwrap();
    let manifest = load_manifest(&symbols).unwrap();
    let journal = Journal::default();
    let launcher =
        RecordingLauncher { module_base: 0x7FF6_0000_0000, journal: Rc::clone(&journal) };
    let options = ImportOptions { include_std: true, quiet: true };

    let summary = import_symbols(&image, &manifest, &launcher, options).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec![
            Event::Start("server.exe".into()),
            Event::Label(0x7FF6_0000_1000, "main.foo".into()),
            Event::Label(0x7FF6_0000_2000, "main.bar".into()),
            Event::Label(0x7FF6_0000_0100, "runtime.main".into()),
            Event::Log(COMPLETION_MESSAGE.into()),
            Event::Detach,
        ]
    );
    assert_eq!(summary.report.user.applied, 2);
    assert_eq!(summary.report.std.applied, 1);
}

#[test]
fn test_invalid_manifest_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let symbols = dir.path().join("syms.json");
    fs::write(&symbols, b"GoReSym failed: not a Go binary").unwrap();

    let err = load_manifest(&symbols).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[test]
fn test_non_pe_target_is_a_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("script.sh");
    fs::write(&target, b"#!/bin/sh\necho hi\n").unwrap();

    let err = TargetImage::open(&target).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}
