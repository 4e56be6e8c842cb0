use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;

/// Port over directory scans so reconciliation and completeness logic can be
/// driven by an in-memory file set in tests.
pub trait DirectoryScanner: Send + Sync {
    /// File names (not full paths) of the direct children of `dir`.
    fn list_file_names(&self, dir: &Path) -> Result<Vec<String>>;
}

/// Real filesystem scanner.
pub struct FsScanner;

impl DirectoryScanner for FsScanner {
    fn list_file_names(&self, dir: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// In-memory scanner for tests.
#[derive(Default)]
pub struct MemoryScanner {
    names: Vec<String>,
}

impl MemoryScanner {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(|s| s.into()).collect();
        names.sort();
        Self { names }
    }
}

impl DirectoryScanner for MemoryScanner {
    fn list_file_names(&self, _dir: &Path) -> Result<Vec<String>> {
        Ok(self.names.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fs_scanner_lists_only_direct_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"x").unwrap();
        std::fs::write(dir.path().join("b.srt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.mp4"), b"x").unwrap();

        let names = FsScanner.list_file_names(dir.path()).unwrap();
        assert_eq!(names, vec!["a.mp4".to_string(), "b.srt".to_string()]);
    }

    #[test]
    fn test_memory_scanner_is_deterministic() {
        let scanner = MemoryScanner::new(["b.mp4", "a.mp4"]);
        let names = scanner.list_file_names(Path::new("/anywhere")).unwrap();
        assert_eq!(names, vec!["a.mp4".to_string(), "b.mp4".to_string()]);
    }
}
