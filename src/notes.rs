use anyhow::{bail, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File access for widgets that read and write notes (daily event records,
/// quick-nav targets). All paths are relative to a single root directory so
/// a widget's code snippet can never name a file outside it.
#[derive(Clone, Debug)]
pub struct NotesStore {
    root: PathBuf,
}

impl NotesStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `relative` under the root, rejecting absolute paths and
    /// parent-directory traversal.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let rel = Path::new(relative);
        if rel.is_absolute() {
            bail!("note path must be relative: {relative}");
        }
        if rel
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            bail!("note path must not contain '..': {relative}");
        }
        Ok(self.root.join(rel))
    }

    /// Relative paths of every `.md` file under the root, sorted. Unreadable
    /// directories are skipped rather than failing the whole walk.
    pub fn list_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        let mut stack = vec![self.root.clone()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().is_some_and(|ext| ext == "md") {
                    if let Ok(rel) = path.strip_prefix(&self.root) {
                        notes.push(rel.to_string_lossy().replace('\\', "/"));
                    }
                }
            }
        }
        notes.sort();
        notes
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        Ok(fs::read_to_string(path)?)
    }

    /// Reads the note, creating it empty first if it does not exist.
    pub fn read_or_create(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        if !path.exists() {
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }
            fs::write(&path, "")?;
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, NotesStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NotesStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn test_read_or_create_creates_empty() {
        let (_dir, store) = store();
        assert!(store.read("daily/today.md").is_err());
        let contents = store.read_or_create("daily/today.md").unwrap();
        assert_eq!(contents, "");
        assert_eq!(store.read("daily/today.md").unwrap(), "");
    }

    #[test]
    fn test_list_notes_recurses_and_filters() {
        let (_dir, store) = store();
        store.write("inbox.md", "").unwrap();
        store.write("daily/today.md", "").unwrap();
        store.write("daily/archive/old.md", "").unwrap();
        store.write("assets/photo.png", "").unwrap();

        assert_eq!(
            store.list_notes(),
            vec!["daily/archive/old.md", "daily/today.md", "inbox.md"]
        );
    }

    #[test]
    fn test_write_then_read() {
        let (_dir, store) = store();
        store.write("log.md", "- 03-15 / 09:00 | 09:30\n").unwrap();
        assert_eq!(store.read("log.md").unwrap(), "- 03-15 / 09:00 | 09:30\n");
    }

    #[test]
    fn test_read_missing_is_error() {
        let (_dir, store) = store();
        assert!(store.read("missing.md").is_err());
    }

    #[test]
    fn test_rejects_absolute_and_traversal() {
        let (_dir, store) = store();
        assert!(store.resolve("/etc/passwd").is_err());
        assert!(store.resolve("../outside.md").is_err());
        assert!(store.resolve("a/../../outside.md").is_err());
    }
}
