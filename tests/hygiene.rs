//! Source hygiene budgets.
//!
//! Scans `src/` (test files excluded) for patterns that crash the editor or
//! swallow errors. Every budget is zero; a new hit means fixing the code, not
//! raising the number.

use std::fs;
use std::path::{Path, PathBuf};

struct Budget {
    pattern: &'static str,
    max: usize,
    reason: &'static str,
}

const fn zero(pattern: &'static str, reason: &'static str) -> Budget {
    Budget {
        pattern,
        max: 0,
        reason,
    }
}

/// Panics abort the whole editing session.
const PANICS: &[Budget] = &[
    zero(".unwrap()", "propagate with ? or handle the None/Err"),
    zero(".expect(", "propagate with ? or handle the None/Err"),
    zero("panic!(", "return an error instead"),
    zero("unreachable!(", "make the match exhaustive"),
    zero("todo!(", "finish the stub"),
    zero("unimplemented!(", "finish the stub"),
];

/// Discards that hide a failed operation.
const DISCARDS: &[Budget] = &[
    zero("let _ =", "inspect or log the result"),
    zero(".ok()", "match the error and log it"),
    zero("#[allow(dead_code)]", "delete unused code"),
];

/// The library reports through `tracing`; only the binary prints.
const LIBRARY_OUTPUT: &[Budget] = &[
    zero("println!(", "use tracing"),
    zero("eprintln!(", "use tracing"),
    zero("dbg!(", "use tracing"),
];

struct SourceFile {
    path: PathBuf,
    content: String,
}

fn collect(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if !is_rs || is_test {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path, content });
        }
    }
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect(Path::new("src"), &mut files);
    assert!(
        !files.is_empty(),
        "no sources found under src/; run from the crate root"
    );
    files
}

fn library_files() -> Vec<SourceFile> {
    source_files()
        .into_iter()
        .filter(|f| f.path.file_name().is_none_or(|name| name != "main.rs"))
        .collect()
}

/// Per-file count of lines containing `pattern`.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|f| {
            let count = f.content.lines().filter(|l| l.contains(pattern)).count();
            (f.path.display().to_string(), count)
        })
        .filter(|(_, n)| *n > 0)
        .collect()
}

fn check(files: &[SourceFile], budgets: &[Budget]) {
    let mut failures = Vec::new();
    for budget in budgets {
        let found = hits(files, budget.pattern);
        let count: usize = found.iter().map(|(_, n)| n).sum();
        if count > budget.max {
            let listing: Vec<String> =
                found.iter().map(|(path, n)| format!("    {path}: {n}")).collect();
            failures.push(format!(
                "`{}` found {count} (max {}): {}\n{}",
                budget.pattern,
                budget.max,
                budget.reason,
                listing.join("\n")
            ));
        }
    }
    assert!(
        failures.is_empty(),
        "hygiene budget exceeded:\n{}",
        failures.join("\n")
    );
}

// =============================================================
// Budgets
// =============================================================

#[test]
fn no_panics_in_source() {
    check(&source_files(), PANICS);
}

#[test]
fn no_silent_discards_in_source() {
    check(&source_files(), DISCARDS);
}

#[test]
fn library_never_prints() {
    check(&library_files(), LIBRARY_OUTPUT);
}
