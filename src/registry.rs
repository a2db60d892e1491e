use std::fmt;

use crate::uploader::{EntryStatus, UploaderEntry};

/// Identifier the uploader assigned to a file (its uuid).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A successfully uploaded file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDescriptor {
    pub id: FileId,
    /// Original filename as reported by the CDN.
    pub name: String,
    pub size: u64,
    /// Base delivery URL; resized variants are derived from it.
    pub cdn_url: String,
}

impl FileDescriptor {
    /// Builds a descriptor from a widget entry.
    ///
    /// Returns `None` unless the entry finished uploading and carries both a
    /// uuid and a delivery URL.
    pub fn from_entry(entry: &UploaderEntry) -> Option<Self> {
        if entry.status != EntryStatus::Success {
            return None;
        }
        let id = entry.uuid.as_deref().filter(|id| !id.is_empty())?;
        let cdn_url = entry.cdn_url.as_deref().filter(|url| !url.is_empty())?;

        let info = entry.file_info.as_ref();
        let name = info
            .and_then(|info| info.original_filename.clone())
            .or_else(|| entry.name.clone())
            .unwrap_or_else(|| id.to_owned());
        let size = info.and_then(|info| info.size).or(entry.size).unwrap_or(0);

        Some(Self {
            id: FileId::new(id),
            name,
            size,
            cdn_url: cdn_url.to_owned(),
        })
    }
}

/// How incoming uploads are combined with what is already listed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum MergePolicy {
    /// Append files not yet listed, keyed by id.
    #[default]
    Append,
    /// Show only the latest set of uploads.
    Replace,
}

impl MergePolicy {
    pub const ALL: [Self; 2] = [Self::Append, Self::Replace];

    pub fn name(self) -> &'static str {
        match self {
            Self::Append => "Add to gallery",
            Self::Replace => "Replace gallery",
        }
    }
}

/// Ordered list of uploaded files for the current session.
#[derive(Debug, Default)]
pub struct FileRegistry {
    files: Vec<FileDescriptor>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &FileId) -> bool {
        self.files.iter().any(|file| &file.id == id)
    }

    pub fn get(&self, id: &FileId) -> Option<&FileDescriptor> {
        self.files.iter().find(|file| &file.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileDescriptor> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Appends every file whose id is not listed yet. Returns how many were added.
    pub fn merge(&mut self, incoming: impl IntoIterator<Item = FileDescriptor>) -> usize {
        let before = self.files.len();
        for file in incoming {
            if !self.contains(&file.id) {
                self.files.push(file);
            }
        }
        self.files.len() - before
    }

    /// Replaces the listing with `incoming`, dropping repeated ids.
    ///
    /// Returns the files that were listed before and are not part of `incoming`.
    pub fn replace(
        &mut self,
        incoming: impl IntoIterator<Item = FileDescriptor>,
    ) -> Vec<FileDescriptor> {
        let previous = std::mem::take(&mut self.files);
        self.merge(incoming);
        previous
            .into_iter()
            .filter(|file| !self.contains(&file.id))
            .collect()
    }

    pub fn apply(&mut self, policy: MergePolicy, incoming: Vec<FileDescriptor>) -> Applied {
        match policy {
            MergePolicy::Append => Applied {
                added: self.merge(incoming),
                dropped: Vec::new(),
            },
            MergePolicy::Replace => {
                let before = self.files.len();
                let dropped = self.replace(incoming);
                Applied {
                    added: self.files.len() + dropped.len() - before,
                    dropped,
                }
            }
        }
    }

    pub fn remove(&mut self, id: &FileId) -> Option<FileDescriptor> {
        let index = self.files.iter().position(|file| &file.id == id)?;
        Some(self.files.remove(index))
    }
}

/// What a [`FileRegistry::apply`] changed.
#[derive(Debug, Default)]
pub struct Applied {
    pub added: usize,
    /// Files a replace pushed out; their selections and export state are stale.
    pub dropped: Vec<FileDescriptor>,
}

impl<'a> IntoIterator for &'a FileRegistry {
    type Item = &'a FileDescriptor;
    type IntoIter = std::slice::Iter<'a, FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
