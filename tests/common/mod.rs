#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nitp_portal::storage::JsonApplicationStore;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const APPLICATION_ID_PATTERN: &str = r"^APP-\d{8}-[0-9A-F]{6}$";
pub const MEMBERSHIP_ID_PATTERN: &str = r"^TPA362\d{7}$";

/// Creates an isolated data directory and a JSON store inside it.
pub fn setup_test_env() -> (JsonApplicationStore, PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let store = JsonApplicationStore::new(base.join("applications.json"));
    (store, base)
}

/// Writes a small placeholder upload and returns its path.
pub fn fixture_document(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"%PDF-1.4 placeholder").expect("write fixture document");
    path
}

/// Scripted answers for a student registration, one line per prompt.
pub fn student_registration_lines(dir: &Path) -> Vec<String> {
    let mut lines: Vec<String> = vec![
        "student".into(),
        "Ngozi Eze".into(),
        "ngozi@example.com".into(),
        String::new(),
        "planning2026".into(),
        "planning2026".into(),
        String::new(),
        String::new(),
        String::new(),
    ];
    for name in ["passport.jpg", "birth.pdf", "degree.pdf"] {
        lines.push(fixture_document(dir, name).display().to_string());
    }
    // Grade-specific documents and the optional CV.
    lines.extend(std::iter::repeat(String::new()).take(6));
    lines.extend(std::iter::repeat("yes".to_string()).take(4));
    lines.push("yes".into());
    lines
}
