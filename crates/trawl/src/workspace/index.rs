//! Enumeration of files to search.

use std::path::{Path, PathBuf};

use trawl_syntax::SupportedLanguage;
use walkdir::{DirEntry, WalkDir};

use crate::cancellation::CancellationToken;
use crate::error::TaskError;

/// A file or directory reported by a [`FileIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    path: PathBuf,
    is_directory: bool,
    language: Option<SupportedLanguage>,
}

impl IndexedFile {
    /// Describes a regular file, detecting its language from the extension.
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        let owned = path.into();
        let language = SupportedLanguage::from_path(&owned);
        Self {
            path: owned,
            is_directory: false,
            language,
        }
    }

    /// Describes a directory.
    #[must_use]
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_directory: true,
            language: None,
        }
    }

    /// Describes a source that exists only in memory.
    #[must_use]
    pub fn in_memory(label: impl Into<PathBuf>, language: SupportedLanguage) -> Self {
        Self {
            path: label.into(),
            is_directory: false,
            language: Some(language),
        }
    }

    /// Returns the path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns whether this entry is a directory.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Returns the detected language, if the file type is recognised.
    #[must_use]
    pub const fn language(&self) -> Option<SupportedLanguage> {
        self.language
    }
}

/// Source of the files a workspace-wide search visits.
pub trait FileIndex {
    /// Calls `visitor` for every indexable entry until it returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Cancelled`] if cancellation is observed during
    /// the walk.
    fn iterate_indexable_files(
        &self,
        visitor: &mut dyn FnMut(&IndexedFile) -> bool,
        cancellation: &CancellationToken,
    ) -> Result<(), TaskError>;
}

/// [`FileIndex`] backed by a recursive directory walk.
///
/// Entries are visited in file-name order. Hidden entries below the root are
/// skipped together with their contents.
#[derive(Debug, Clone)]
pub struct WalkdirIndex {
    root: PathBuf,
}

impl WalkdirIndex {
    /// Creates an index rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileIndex for WalkdirIndex {
    fn iterate_indexable_files(
        &self,
        visitor: &mut dyn FnMut(&IndexedFile) -> bool,
        cancellation: &CancellationToken,
    ) -> Result<(), TaskError> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for walked in walker {
            if cancellation.is_cancelled() {
                return Err(TaskError::Cancelled);
            }
            let entry = match walked {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(
                        target: "trawl::workspace",
                        event = "walk_failed",
                        error = %error,
                    );
                    continue;
                }
            };
            let file = if entry.file_type().is_dir() {
                IndexedFile::directory(entry.into_path())
            } else {
                IndexedFile::file(entry.into_path())
            };
            if !visitor(&file) {
                break;
            }
        }
        Ok(())
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
