use super::error::{Error, Result};
use super::DATA_EXTENSION;
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// true when the file name ends with `.tsv`, case-sensitive.
/// The suffix is ASCII, so a lossy conversion keeps it intact in non UTF-8 names.
pub fn has_data_extension(path: &Path) -> bool {
    let suffix = format!(".{}", DATA_EXTENSION);
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(&suffix))
        .unwrap_or(false)
}

/// Walks one input path, recursing into directories in file name order,
/// and appends the included files to `found` in the order visited.
/// A missing path is an error only when it would have been included.
pub fn discover_path(root: &Path, all: bool, found: &mut Vec<PathBuf>) -> Result<()> {
    if !root.exists() {
        if all || has_data_extension(root) {
            return Err(Error::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            ));
        }
        warn!("skipping {}, no such file or directory", root.display());
        return Ok(());
    }
    let walker = WalkDir::new(root).follow_links(true).sort_by_file_name();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }
        if all || has_data_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }
    Ok(())
}

/// Discovers the candidate files of all the inputs, without deduplication.
pub fn discover(inputs: &[PathBuf], all: bool) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for input in inputs {
        discover_path(input, all, &mut found)?;
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let p = dir.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(&p, "0\t1\t2\t3\t4\n").unwrap();
        p
    }

    #[test]
    fn suffix_match_is_case_sensitive() {
        assert!(has_data_extension(Path::new("a/b/run1.tsv")));
        assert!(!has_data_extension(Path::new("run1.TSV")));
        assert!(!has_data_extension(Path::new("run1.tsv.bak")));
        assert!(!has_data_extension(Path::new("run1.csv")));
    }

    #[test]
    fn finds_matching_files_at_any_depth_in_order() {
        let tmp = TempDir::new().unwrap();
        let b = touch(tmp.path(), "b.tsv");
        let a = touch(tmp.path(), "a.tsv");
        let deep = touch(tmp.path(), "sub/deeper/c.tsv");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "sub/d.pdf");
        let found = discover(&[tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(found, vec![a, b, deep]);
    }

    #[test]
    fn all_flag_includes_every_file() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "a.tsv");
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "sub/raw.dat");
        let found = discover(&[tmp.path().to_path_buf()], true).unwrap();
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn file_inputs_are_not_deduplicated() {
        let tmp = TempDir::new().unwrap();
        let a = touch(tmp.path(), "a.tsv");
        let found = discover(&[a.clone(), tmp.path().to_path_buf()], false).unwrap();
        assert_eq!(found, vec![a.clone(), a]);
    }

    #[test]
    fn file_input_without_extension_needs_all() {
        let tmp = TempDir::new().unwrap();
        let raw = touch(tmp.path(), "raw.dat");
        assert!(discover(&[raw.clone()], false).unwrap().is_empty());
        assert_eq!(discover(&[raw.clone()], true).unwrap(), vec![raw]);
    }

    #[test]
    fn missing_data_input_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover(&[tmp.path().join("nope.tsv")], false).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
        let err = discover(&[tmp.path().join("nope.txt")], true).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn missing_other_input_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let a = touch(tmp.path(), "a.tsv");
        let found = discover(&[tmp.path().join("nope.txt"), a.clone()], false).unwrap();
        assert_eq!(found, vec![a]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_still_match() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let name = Path::new(OsStr::from_bytes(b"run\xff.tsv"));
        assert!(has_data_extension(name));
        let other = Path::new(OsStr::from_bytes(b"run\xff.dat"));
        assert!(!has_data_extension(other));
    }
}
