//! Directory-based environment store.
//!
//! The s6 overlay publishes container environment variables as one file
//! per variable under `/var/run/s6/container_environment`: the filename is
//! the key, the file contents the value. [`load`] reads such a directory
//! so the handoff can inject the variables into the replaced process
//! image.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads every variable from `dir`.
///
/// Per-entry problems are skipped silently: dotfiles, names containing
/// `=`, non-UTF-8 names or contents, subdirectories, and empty files (an
/// empty file means "unset" in the envdir convention). Trailing newlines
/// are stripped from values. Only the directory itself being unreadable
/// is an error — the store's presence is a container invariant.
pub fn load(dir: &Path) -> Result<Vec<(String, String)>> {
    let entries = fs::read_dir(dir).map_err(|source| Error::EnvDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut vars = Vec::new();
    for entry in entries.flatten() {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') || name.contains('=') {
            continue;
        }
        // Fails for subdirectories and non-UTF-8 contents alike.
        let Ok(contents) = fs::read_to_string(entry.path()) else {
            continue;
        };
        let value = contents.trim_end_matches(['\n', '\r']);
        if value.is_empty() {
            continue;
        }
        vars.push((name, value.to_owned()));
    }
    Ok(vars)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn one_file_per_variable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "PUID", "911");
        write(dir.path(), "TZ", "Europe/Stockholm");

        let mut vars = load(dir.path()).unwrap();
        vars.sort();
        assert_eq!(
            vars,
            vec![
                ("PUID".to_owned(), "911".to_owned()),
                ("TZ".to_owned(), "Europe/Stockholm".to_owned()),
            ]
        );
    }

    #[test]
    fn trailing_newlines_are_stripped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "PGID", "911\n");
        write(dir.path(), "HOME", "/home/abc\r\n");

        let mut vars = load(dir.path()).unwrap();
        vars.sort();
        assert_eq!(
            vars,
            vec![
                ("HOME".to_owned(), "/home/abc".to_owned()),
                ("PGID".to_owned(), "911".to_owned()),
            ]
        );
    }

    #[test]
    fn unset_markers_and_junk_names_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "EMPTY", "");
        write(dir.path(), ".hidden", "x");
        write(dir.path(), "BAD=NAME", "x");
        write(dir.path(), "KEPT", "yes");
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let vars = load(dir.path()).unwrap();
        assert_eq!(vars, vec![("KEPT".to_owned(), "yes".to_owned())]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("nope");
        let err = load(&gone).unwrap_err();
        match err {
            Error::EnvDir { path, .. } => assert_eq!(path, gone),
            other => panic!("expected EnvDir, got {other}"),
        }
    }
}
