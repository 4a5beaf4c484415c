//! Test harness for the RSON parser against fixture files.
//!
//! Every `.rson` file under test/rson/ must parse, and its JSON encoding must
//! match the corresponding file in test/json/ (compared as JSON values, so
//! formatting and key order don't matter). Every `.rson` file under
//! test/bad/ must fail with the message in the matching `.error` file.

use std::fs;
use std::path::{Path, PathBuf};

use glob::glob;
use librson::{encode, parse, parse_with_filename, Format};

/// Root test directory.
fn test_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("test")
}

/// Sorted paths matching a pattern under test/.
fn fixture_files(pattern: &str) -> Vec<PathBuf> {
    let pattern = test_root().join(pattern);
    let mut files: Vec<PathBuf> = glob(&pattern.to_string_lossy())
        .expect("valid glob pattern")
        .filter_map(|entry| entry.ok())
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().to_string()
}

/// A sibling fixture with the same stem.
fn companion(path: &Path, dir: &str, ext: &str) -> PathBuf {
    let stem = path.file_stem().unwrap().to_string_lossy();
    test_root().join(dir).join(format!("{}.{}", stem, ext))
}

/// Run a single good fixture.
fn run_rson_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    let value =
        parse(&content).map_err(|e| format!("{}: Unexpected parse error: {}", filename, e))?;

    let expected_path = companion(path, "json", "json");
    let expected = fs::read_to_string(&expected_path)
        .map_err(|e| format!("{}: Missing expected output: {}", filename, e))?;
    let expected: serde_json::Value = serde_json::from_str(&expected)
        .map_err(|e| format!("{}: Bad expected JSON: {}", filename, e))?;

    let actual_raw = encode(&value, Format::Json);
    let actual: serde_json::Value = serde_json::from_str(&actual_raw)
        .map_err(|e| format!("{}: Encoder produced invalid JSON: {}", filename, e))?;

    if actual != expected {
        return Err(format!(
            "{}: Output mismatch\n    expected: {}\n    actual:   {}",
            filename, expected, actual
        ));
    }
    println!("  {} => {}", filename, encode(&value, Format::Rson));
    Ok(())
}

/// Run a single bad fixture.
fn run_bad_test(path: &Path) -> Result<(), String> {
    let filename = file_name(path);
    let content =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", filename, e))?;

    match parse_with_filename(&content, Some(&filename)) {
        Ok(value) => Err(format!(
            "{}: Expected parse error, but got success: {:?}",
            filename, value
        )),
        Err(e) => {
            let actual_error = e.to_string();
            match fs::read_to_string(companion(path, "bad", "error")) {
                Ok(expected) if expected.trim() == actual_error => {
                    println!("  {} => error (as expected)", filename);
                    Ok(())
                }
                Ok(expected) => Err(format!(
                    "{}: Error mismatch\n    expected: {}\n    actual:   {}",
                    filename,
                    expected.trim(),
                    actual_error
                )),
                Err(_) => {
                    println!(
                        "  {} => error: {} (no .error file to compare)",
                        filename, actual_error
                    );
                    Ok(())
                }
            }
        }
    }
}

fn run_all(pattern: &str, run: fn(&Path) -> Result<(), String>) {
    let files = fixture_files(pattern);
    assert!(!files.is_empty(), "no fixtures match {}", pattern);

    println!("\nRunning {} fixtures for {}:", files.len(), pattern);

    let errors: Vec<String> = files.iter().filter_map(|f| run(f).err()).collect();

    println!(
        "\nResults: {} passed, {} failed",
        files.len() - errors.len(),
        errors.len()
    );
    if !errors.is_empty() {
        println!("\nErrors:");
        for error in &errors {
            println!("  - {}", error);
        }
    }

    assert!(errors.is_empty(), "{} fixtures failed", errors.len());
}

#[test]
fn test_all_rson_fixtures() {
    run_all("rson/*.rson", run_rson_test);
}

#[test]
fn test_all_bad_fixtures() {
    run_all("bad/*.rson", run_bad_test);
}

#[test]
fn test_rson_encoding_reparses() {
    for file in fixture_files("rson/*.rson") {
        let content = fs::read_to_string(&file).unwrap();
        let value = parse(&content).unwrap();
        let canonical = encode(&value, Format::Rson);
        let reparsed = parse(&canonical)
            .unwrap_or_else(|e| panic!("{}: {} in {}", file_name(&file), e, canonical));
        assert_eq!(reparsed, value, "{}", file_name(&file));
    }
}
