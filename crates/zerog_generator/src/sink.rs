//! Writes generated files to disk.

use crate::error::{Error, Result};
use crate::store::{ContentStore, FileId, FileKind};
use std::collections::HashSet;
use std::fs;

/// Files to write, in first-added order, each at most once.
#[derive(Debug, Default, Clone)]
pub struct OutputSet {
    order: Vec<FileId>,
    seen: HashSet<FileId>,
}

impl OutputSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, id: impl Into<FileId>) -> bool {
        let id = id.into();
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: impl Into<FileId>) -> bool {
        self.seen.contains(&id.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = FileId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl<I: Into<FileId>> Extend<I> for OutputSet {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// Writes every file in `outputs`, creating parent directories as needed.
///
/// Documents are written pretty-printed with a trailing newline. A binary file that
/// still has no payload is skipped. Returns the number of files written.
pub fn write_outputs(store: &ContentStore, outputs: &OutputSet) -> Result<usize> {
    let mut written = 0;

    for id in outputs.iter() {
        let file = store.file(id);
        let path = file.path();

        let bytes = match file.kind() {
            FileKind::Binary => match file.bytes() {
                Some(bytes) => bytes.to_vec(),
                None => {
                    tracing::warn!("Skipping {}: no content was generated", path);
                    continue;
                }
            },
            FileKind::Structured => file
                .document()
                .map(|doc| doc.to_pretty_bytes())
                .transpose()
                .map_err(|e| Error::json(path, e))?
                .unwrap_or_default(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, &bytes).map_err(|e| Error::io(path, e))?;

        tracing::trace!("Wrote {}", path);
        written += 1;
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_output_set_ignores_duplicates() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let mut store = ContentStore::new();
        let a = store.binary(root.join("a.png"), &root).unwrap();
        let b = store.structured(root.join("b.frames"), &root).unwrap();

        let mut outputs = OutputSet::new();
        assert!(outputs.insert(b));
        assert!(outputs.insert(a));
        assert!(!outputs.insert(b));
        outputs.extend([a, a]);

        assert_eq!(outputs.len(), 2);
        assert_eq!(
            outputs.iter().collect::<Vec<_>>(),
            [FileId::from(b), FileId::from(a)]
        );
        assert!(outputs.contains(a));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();

        let mut store = ContentStore::new();
        let image = store.binary(root.join("deep/dir/a.png"), &root).unwrap();
        store.set_bytes(image, vec![1, 2, 3]);
        let empty = store.binary(root.join("empty.png"), &root).unwrap();
        let doc = store.structured(root.join("deep/b.frames"), &root).unwrap();
        store.document_mut(doc).set("frameGrid", serde_json::json!({ "size": [8, 8] }));

        let mut outputs = OutputSet::new();
        outputs.insert(image);
        outputs.insert(empty);
        outputs.insert(doc);

        let written = write_outputs(&store, &outputs).unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read(root.join("deep/dir/a.png")).unwrap(), [1, 2, 3]);
        assert!(!root.join("empty.png").exists());
        assert_eq!(
            fs::read_to_string(root.join("deep/b.frames")).unwrap(),
            "{\n  \"frameGrid\": {\n    \"size\": [\n      8,\n      8\n    ]\n  }\n}\n"
        );
    }
}
