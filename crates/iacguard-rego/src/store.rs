//! Read-only document trees the loader walks.

use camino::Utf8PathBuf;
use iacguard_types::DocPath;
use std::collections::BTreeMap;
use thiserror::Error;
use walkdir::WalkDir;

/// One child of a directory in a [`DocumentStore`].
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(DocPath),

    #[error("read {path}: {source}")]
    Io {
        path: DocPath,
        #[source]
        source: std::io::Error,
    },

    #[error("non UTF-8 entry name under {0}")]
    NonUtf8Name(DocPath),
}

/// A hierarchical, read-only tree of documents addressed by [`DocPath`].
///
/// Entries returned by `read_dir` are sorted by name so traversal order is stable.
pub trait DocumentStore {
    fn read_dir(&self, dir: &DocPath) -> Result<Vec<DirEntry>, StoreError>;
    fn read_file(&self, path: &DocPath) -> Result<Vec<u8>, StoreError>;
}

/// Documents compiled into the binary.
#[derive(Clone, Debug, Default)]
pub struct EmbeddedStore {
    files: BTreeMap<DocPath, &'static str>,
}

impl EmbeddedStore {
    pub fn new(files: &[(&'static str, &'static str)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(path, body)| (DocPath::new(path), *body))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl DocumentStore for EmbeddedStore {
    fn read_dir(&self, dir: &DocPath) -> Result<Vec<DirEntry>, StoreError> {
        let prefix = if dir.is_root() {
            String::new()
        } else {
            format!("{}/", dir.as_str())
        };

        let mut children: BTreeMap<&str, bool> = BTreeMap::new();
        for path in self.files.keys() {
            let Some(rest) = path.as_str().strip_prefix(prefix.as_str()) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    children.insert(child, true);
                }
                None => {
                    children.entry(rest).or_insert(false);
                }
            }
        }

        if children.is_empty() && !dir.is_root() {
            return Err(StoreError::NotFound(dir.clone()));
        }

        Ok(children
            .into_iter()
            .map(|(name, is_dir)| DirEntry {
                name: name.to_string(),
                is_dir,
            })
            .collect())
    }

    fn read_file(&self, path: &DocPath) -> Result<Vec<u8>, StoreError> {
        self.files
            .get(path)
            .map(|body| body.as_bytes().to_vec())
            .ok_or_else(|| StoreError::NotFound(path.clone()))
    }
}

/// Documents on disk under `root`.
#[derive(Clone, Debug)]
pub struct FsStore {
    root: Utf8PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &camino::Utf8Path {
        &self.root
    }

    fn resolve(&self, path: &DocPath) -> Utf8PathBuf {
        if path.is_root() {
            self.root.clone()
        } else {
            self.root.join(path.as_str())
        }
    }
}

fn io_error(path: &DocPath, source: std::io::Error) -> StoreError {
    if source.kind() == std::io::ErrorKind::NotFound {
        StoreError::NotFound(path.clone())
    } else {
        StoreError::Io {
            path: path.clone(),
            source,
        }
    }
}

impl DocumentStore for FsStore {
    fn read_dir(&self, dir: &DocPath) -> Result<Vec<DirEntry>, StoreError> {
        let walker = WalkDir::new(self.resolve(dir))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| io_error(dir, e.into()))?;
            let name = entry
                .file_name()
                .to_str()
                .ok_or_else(|| StoreError::NonUtf8Name(dir.clone()))?;
            entries.push(DirEntry {
                name: name.to_string(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &DocPath) -> Result<Vec<u8>, StoreError> {
        std::fs::read(self.resolve(path)).map_err(|e| io_error(path, e))
    }
}
