//! Memoized content store.
//!
//! Every file the generator touches, whether read from an input mod or created in an
//! override container, is registered in a [`ContentStore`] under its normalized
//! absolute path. The first lookup of a path reads it from disk; every later lookup
//! of the same path, whatever root it is requested with, returns the same id. Many
//! plants share one sprite sheet, so this is what makes derived artifacts generated
//! once and written once.
//!
//! Files that do not exist yet are registered with empty contents. This is how new
//! override files are represented until the persistence step writes them.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::paths;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;
use std::fmt;

/// Identity of a file registered in a [`ContentStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

/// A file registered as raw bytes (sprite sheets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryId(FileId);

/// A file registered as a JSON document (objects, frames, manifests, overrides).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructuredId(FileId);

impl From<BinaryId> for FileId {
    fn from(id: BinaryId) -> Self {
        id.0
    }
}

impl From<StructuredId> for FileId {
    fn from(id: StructuredId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Binary,
    Structured,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Binary => f.write_str("binary"),
            FileKind::Structured => f.write_str("structured"),
        }
    }
}

#[derive(Debug, Clone)]
enum Contents {
    Binary(Option<Vec<u8>>),
    Structured(Document),
}

/// A file registered in the store, plus what the generator knows about its location.
#[derive(Debug, Clone)]
pub struct StoredFile {
    path: Utf8PathBuf,
    root: Utf8PathBuf,
    relative_path: Utf8PathBuf,
    file_type: String,
    name: String,
    exists: bool,
    contents: Contents,
}

impl StoredFile {
    fn new(path: Utf8PathBuf, root: &Utf8Path, exists: bool, contents: Contents) -> Self {
        let root = paths::normalize(root);
        let relative_path = paths::relative_path(&root, &path);
        let file_type = path.extension().unwrap_or_default().to_string();
        let name = paths::stem(&path).to_string();

        Self {
            path,
            root,
            relative_path,
            file_type,
            name,
            exists,
            contents,
        }
    }

    /// Normalized absolute path; the file's identity.
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Base directory of the mod the file was first requested for.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn relative_path(&self) -> &Utf8Path {
        &self.relative_path
    }

    /// Extension without the dot, e.g. `object` or `frames`.
    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    /// File name without extension.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the file was present on disk when first loaded.
    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn kind(&self) -> FileKind {
        match self.contents {
            Contents::Binary(_) => FileKind::Binary,
            Contents::Structured(_) => FileKind::Structured,
        }
    }

    /// The document, for structured files.
    pub fn document(&self) -> Option<&Document> {
        match &self.contents {
            Contents::Structured(doc) => Some(doc),
            Contents::Binary(_) => None,
        }
    }

    /// The payload, for binary files that have one.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.contents {
            Contents::Binary(bytes) => bytes.as_deref(),
            Contents::Structured(_) => None,
        }
    }
}

/// Path-keyed registry of every file touched during a run.
///
/// There is no eviction: a store lives for one generation run. It is not
/// synchronized; the generator runs on a single thread and passes the store by
/// `&mut` to whichever step needs it.
#[derive(Debug, Default)]
pub struct ContentStore {
    files: Vec<StoredFile>,
    by_path: HashMap<Utf8PathBuf, FileId>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a binary file, reading it on first access.
    ///
    /// A missing file is registered with no payload.
    pub fn binary(
        &mut self,
        path: impl AsRef<Utf8Path>,
        root: impl AsRef<Utf8Path>,
    ) -> Result<BinaryId> {
        let path = Self::key(path.as_ref())?;
        if let Some(id) = self.cached(&path, FileKind::Binary)? {
            return Ok(BinaryId(id));
        }

        let (exists, bytes) = match std::fs::read(path.as_std_path()) {
            Ok(bytes) => (true, Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (false, None),
            Err(e) => return Err(Error::io(path, e)),
        };

        let file = StoredFile::new(path, root.as_ref(), exists, Contents::Binary(bytes));
        Ok(BinaryId(self.insert(file)))
    }

    /// Look up a structured file, reading and parsing it on first access.
    ///
    /// A missing file is registered with an empty document. A file that exists but
    /// is not a JSON document is an error.
    pub fn structured(
        &mut self,
        path: impl AsRef<Utf8Path>,
        root: impl AsRef<Utf8Path>,
    ) -> Result<StructuredId> {
        let path = Self::key(path.as_ref())?;
        if let Some(id) = self.cached(&path, FileKind::Structured)? {
            return Ok(StructuredId(id));
        }

        let (exists, document) = match std::fs::read(path.as_std_path()) {
            Ok(bytes) => {
                let document = Document::parse(&bytes).map_err(|source| Error::Parse {
                    path: path.clone(),
                    source,
                })?;
                (true, document)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => (false, Document::new()),
            Err(e) => return Err(Error::io(path, e)),
        };

        let file = StoredFile::new(path, root.as_ref(), exists, Contents::Structured(document));
        Ok(StructuredId(self.insert(file)))
    }

    /// Like [`structured`](Self::structured), but a file that is not a JSON document
    /// yields `None` instead of an error and is not cached. Used when scanning mods,
    /// where images and other assets sit next to the definitions.
    pub fn try_structured(
        &mut self,
        path: impl AsRef<Utf8Path>,
        root: impl AsRef<Utf8Path>,
    ) -> Result<Option<StructuredId>> {
        let path = Self::key(path.as_ref())?;
        if let Some(&id) = self.by_path.get(&path) {
            return Ok(match self.files[id.0].kind() {
                FileKind::Structured => Some(StructuredId(id)),
                FileKind::Binary => None,
            });
        }

        let bytes = std::fs::read(path.as_std_path()).map_err(|e| Error::io(&path, e))?;
        let Ok(document) = Document::parse(&bytes) else {
            tracing::trace!("Skipping non-document file {}", path);
            return Ok(None);
        };

        let file = StoredFile::new(path, root.as_ref(), true, Contents::Structured(document));
        Ok(Some(StructuredId(self.insert(file))))
    }

    pub fn file(&self, id: impl Into<FileId>) -> &StoredFile {
        &self.files[id.into().0]
    }

    pub fn document(&self, id: StructuredId) -> &Document {
        match &self.files[id.0 .0].contents {
            Contents::Structured(doc) => doc,
            Contents::Binary(_) => unreachable!("structured id refers to a binary file"),
        }
    }

    pub fn document_mut(&mut self, id: StructuredId) -> &mut Document {
        match &mut self.files[id.0 .0].contents {
            Contents::Structured(doc) => doc,
            Contents::Binary(_) => unreachable!("structured id refers to a binary file"),
        }
    }

    pub fn bytes(&self, id: BinaryId) -> Option<&[u8]> {
        self.files[id.0 .0].bytes()
    }

    pub fn set_bytes(&mut self, id: BinaryId, bytes: Vec<u8>) {
        if let Contents::Binary(slot) = &mut self.files[id.0 .0].contents {
            *slot = Some(bytes);
        }
    }

    /// Number of distinct files registered.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn key(path: &Utf8Path) -> Result<Utf8PathBuf> {
        if !path.is_absolute() {
            return Err(Error::RelativePath(path.to_path_buf()));
        }
        Ok(paths::normalize(path))
    }

    fn cached(&self, path: &Utf8Path, kind: FileKind) -> Result<Option<FileId>> {
        let Some(&id) = self.by_path.get(path) else {
            return Ok(None);
        };

        let existing = self.files[id.0].kind();
        if existing != kind {
            return Err(Error::KindMismatch {
                path: path.to_path_buf(),
                existing,
            });
        }
        Ok(Some(id))
    }

    fn insert(&mut self, file: StoredFile) -> FileId {
        let id = FileId(self.files.len());
        self.by_path.insert(file.path.clone(), id);
        self.files.push(file);
        id
    }
}
