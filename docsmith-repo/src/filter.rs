//! File filtering utilities for repository processing

use docsmith_core::AnalysisConfig;
use std::collections::HashSet;
use std::path::Path;

/// Directory-name exclusions and file-name suffix inclusions
#[derive(Debug, Clone)]
pub struct FileFilter {
    excluded_dirs: HashSet<String>,
    included_extensions: Vec<String>,
}

impl FileFilter {
    pub fn new<D, E>(excluded_dirs: D, included_extensions: E) -> Self
    where
        D: IntoIterator,
        D::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
            included_extensions: included_extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.excluded_dirs.iter().cloned(),
            config.included_extensions.iter().cloned(),
        )
    }

    /// Check if a directory should be traversed. Only the exact name counts.
    pub fn should_traverse_directory<P: AsRef<Path>>(&self, dir_path: P) -> bool {
        // A non-UTF-8 name can never equal one of the (UTF-8) excluded names
        match dir_path.as_ref().file_name().and_then(|name| name.to_str()) {
            Some(name) => !self.excluded_dirs.contains(name),
            None => true,
        }
    }

    /// Check if a file should be included in processing.
    /// Names are compared as raw bytes, so non-UTF-8 names still match.
    pub fn should_include_file<P: AsRef<Path>>(&self, file_path: P) -> bool {
        file_path
            .as_ref()
            .file_name()
            .map(|name| {
                let name = name.as_encoded_bytes();
                self.included_extensions
                    .iter()
                    .any(|ext| name.ends_with(ext.as_bytes()))
            })
            .unwrap_or(false)
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// Whether `name` ends with any of `extensions`
pub fn matches_extension(name: &str, extensions: &[String]) -> bool {
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_directories_match_exact_names() {
        let filter = FileFilter::default();

        assert!(!filter.should_traverse_directory("repo/node_modules"));
        assert!(!filter.should_traverse_directory("repo/deep/nested/.git"));
        assert!(!filter.should_traverse_directory("__pycache__"));
        assert!(filter.should_traverse_directory("repo/environment"));
        assert!(filter.should_traverse_directory("repo/src"));
    }

    #[test]
    fn test_included_extensions() {
        let filter = FileFilter::default();

        assert!(filter.should_include_file("src/app.py"));
        assert!(filter.should_include_file("docs/config.yaml"));
        assert!(filter.should_include_file("README.md"));
        assert!(!filter.should_include_file("bin/tool.exe"));
        assert!(!filter.should_include_file("image.png"));
        assert!(!filter.should_include_file("Makefile"));
    }

    #[test]
    fn test_custom_filter() {
        let filter = FileFilter::new(["target"], [".rs", ".toml"]);

        assert!(filter.should_include_file("src/lib.rs"));
        assert!(filter.should_include_file("Cargo.toml"));
        assert!(!filter.should_include_file("main.py"));
        assert!(!filter.should_traverse_directory("target"));
        assert!(filter.should_traverse_directory("node_modules"));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_names_are_matched_on_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let filter = FileFilter::default();
        let file = Path::new(OsStr::from_bytes(b"caf\xe9.py"));
        let binary = Path::new(OsStr::from_bytes(b"caf\xe9.exe"));

        assert!(filter.should_include_file(file));
        assert!(!filter.should_include_file(binary));
        assert!(filter.should_traverse_directory(Path::new(OsStr::from_bytes(b"d\xe9p"))));
    }

    #[test]
    fn test_matches_extension() {
        let exts = vec![".py".to_string(), ".js".to_string()];
        assert!(matches_extension("pkg/mod.py", &exts));
        assert!(matches_extension("web/app.js", &exts));
        assert!(!matches_extension("web/app.json", &exts));
        assert!(!matches_extension("style.css", &exts));
    }
}
