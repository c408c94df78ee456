use crate::error::{QueryDiffError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Marker inserted between the index and the postfix of processed files
pub const PROCESSED_MARKER: &str = "f";

/// File naming template shared by raw captures and processed files.
///
/// Raw capture of server `i`: `{prefix}{i}{postfix}`.
/// Processed file of server `i`: `{prefix}{i}f{postfix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNaming {
    prefix: String,
    postfix: String,
}

impl FileNaming {
    pub fn new<P: Into<String>, S: Into<String>>(prefix: P, postfix: S) -> Self {
        Self {
            prefix: prefix.into(),
            postfix: postfix.into(),
        }
    }

    pub fn raw_file_name(&self, index: usize) -> String {
        format!("{}{}{}", self.prefix, index, self.postfix)
    }

    pub fn processed_file_name(&self, index: usize) -> String {
        format!("{}{}{}{}", self.prefix, index, PROCESSED_MARKER, self.postfix)
    }
}

/// Writes captured and processed content into the output directory
#[derive(Debug, Clone)]
pub struct FilePersister {
    out_dir: PathBuf,
}

impl FilePersister {
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    /// Create the output directory if it is missing
    pub fn ensure_structure(&self) -> Result<()> {
        fs::create_dir_all(&self.out_dir).map_err(|e| QueryDiffError::persist(&self.out_dir, e))
    }

    /// Resolve a file name inside the output directory
    pub fn resolve<S: AsRef<Path>>(&self, file_name: S) -> PathBuf {
        self.out_dir.join(file_name)
    }

    /// Write raw bytes under `file_name`, returning the full path
    pub fn save_bytes<C: AsRef<[u8]>>(&self, file_name: &str, content: C) -> Result<PathBuf> {
        let path = self.resolve(file_name);
        self.write_file_atomic(&path, content)?;
        Ok(path)
    }

    /// Write text under `file_name`, returning the full path
    pub fn save_text(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        self.save_bytes(file_name, content.as_bytes())
    }

    /// Write through a temp file and rename so readers never see partial content
    pub fn write_file_atomic<P: AsRef<Path>, C: AsRef<[u8]>>(&self, path: P, content: C) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| QueryDiffError::persist(parent, e))?;
        }

        let temp_path = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|s| s.to_str()).unwrap_or("temp")
        ));

        fs::write(&temp_path, content).map_err(|e| QueryDiffError::persist(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| QueryDiffError::persist(path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_naming() {
        let naming = FileNaming::new("resp_", ".out");
        assert_eq!(naming.raw_file_name(1), "resp_1.out");
        assert_eq!(naming.processed_file_name(1), "resp_1f.out");
        assert_eq!(naming.processed_file_name(12), "resp_12f.out");
    }

    #[test]
    fn test_file_naming_without_postfix() {
        let naming = FileNaming::new("", "");
        assert_eq!(naming.raw_file_name(3), "3");
        assert_eq!(naming.processed_file_name(3), "3f");
    }

    #[test]
    fn test_ensure_structure_creates_nested_directory() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out").join("case");
        let persister = FilePersister::new(&out);

        persister.ensure_structure().unwrap();
        assert!(out.is_dir());
    }

    #[test]
    fn test_save_bytes_and_text() {
        let temp_dir = TempDir::new().unwrap();
        let persister = FilePersister::new(temp_dir.path().join("out"));

        let raw = persister.save_bytes("resp_1.xml", b"<a/>").unwrap();
        assert_eq!(raw, temp_dir.path().join("out").join("resp_1.xml"));
        assert_eq!(fs::read(&raw).unwrap(), b"<a/>");

        let text = persister.save_text("resp_1f.xml", "<a/>\n").unwrap();
        assert_eq!(fs::read_to_string(&text).unwrap(), "<a/>\n");
    }

    #[test]
    fn test_write_file_atomic_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let persister = FilePersister::new(temp_dir.path());
        let path = temp_dir.path().join("resp_1.txt");

        persister.write_file_atomic(&path, "first").unwrap();
        persister.write_file_atomic(&path, "second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("resp_1.txt.tmp").exists());
    }
}
