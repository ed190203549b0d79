//! Filesystem search collaborator.
//!
//! Walks the configured roots looking for an exact (case-insensitive) name
//! match. A dotted extension in the queried name selects file search;
//! otherwise folders are searched. Unreadable directories are skipped.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Whether a query names a file or a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    File,
    Folder,
}

/// A dotted extension in the basename means file search.
pub fn mode_for(name: &str) -> SearchMode {
    let basename = Path::new(name)
        .file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default();
    if basename.contains('.') {
        SearchMode::File
    } else {
        SearchMode::Folder
    }
}

/// Search every root for entries whose name equals `name`, ignoring case.
///
/// Returns absolute paths. An empty vec means zero matches — there is no
/// sentinel value to compare against.
pub fn search_file_or_folder(roots: &[PathBuf], name: &str) -> Vec<String> {
    let mode = mode_for(name);
    let mut results = Vec::new();

    for root in roots {
        tracing::debug!(root = %root.display(), query = %name, ?mode, "searching");
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(Result::ok)
        {
            let type_matches = match mode {
                SearchMode::File => entry.file_type().is_file(),
                SearchMode::Folder => entry.file_type().is_dir(),
            };
            if type_matches && entry.file_name().eq_ignore_ascii_case(name) {
                results.push(entry.path().display().to_string());
            }
        }
    }

    tracing::info!(query = %name, matches = results.len(), "search complete");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_mode_selection() {
        assert_eq!(mode_for("report.pdf"), SearchMode::File);
        assert_eq!(mode_for("notes.txt"), SearchMode::File);
        assert_eq!(mode_for("Projects"), SearchMode::Folder);
        assert_eq!(mode_for("my documents"), SearchMode::Folder);
    }

    #[test]
    fn test_finds_file_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("inner");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("Report.PDF"), b"x").unwrap();

        let results = search_file_or_folder(&[dir.path().to_path_buf()], "report.pdf");
        assert_eq!(results.len(), 1);
        assert!(results[0].ends_with("Report.PDF"));
    }

    #[test]
    fn test_file_mode_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        // A directory with a dotted name must not match in file mode
        fs::create_dir(dir.path().join("archive.old")).unwrap();

        let results = search_file_or_folder(&[dir.path().to_path_buf()], "archive.old");
        assert!(results.is_empty());
    }

    #[test]
    fn test_finds_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a").join("Projects")).unwrap();
        fs::write(dir.path().join("projects"), b"a file, not a folder").unwrap();

        let results = search_file_or_folder(&[dir.path().to_path_buf()], "projects");
        assert_eq!(results.len(), 1, "folder mode must skip same-name files");
        assert!(results[0].ends_with("Projects"));
    }

    #[test]
    fn test_no_matches_yields_empty_vec() {
        let dir = tempfile::tempdir().unwrap();
        let results = search_file_or_folder(&[dir.path().to_path_buf()], "nothing.xyz");
        assert!(results.is_empty());
    }

    #[test]
    fn test_multiple_roots_are_all_searched() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        fs::write(dir_a.path().join("todo.txt"), b"a").unwrap();
        fs::write(dir_b.path().join("todo.txt"), b"b").unwrap();

        let roots = vec![dir_a.path().to_path_buf(), dir_b.path().to_path_buf()];
        let results = search_file_or_folder(&roots, "todo.txt");
        assert_eq!(results.len(), 2);
    }
}
