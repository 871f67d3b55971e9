use std::fs;

use launcher_engine::{ensure_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_settings_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("nested").join("settings");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn rewrite_replaces_previous_content() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("launcher.ron", "(a: 1)").unwrap();
    let second = writer.write("launcher.ron", "(a: 2)").unwrap();

    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(a: 2)");
}

#[test]
fn writer_for_file_targets_its_parent() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("conf").join("launcher.ron");

    let written = AtomicFileWriter::for_file(&path)
        .write("launcher.ron", "()")
        .unwrap();

    assert_eq!(written, path);
}

#[test]
fn no_partial_file_when_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("launcher.ron", "data").is_err());
    assert!(!file_path.with_file_name("launcher.ron").exists());
}
