//! The aggregate collection of file descriptors produced from one or more
//! input files, including transitively imported files.
//!
//! The main entry points for JSON are [`DescriptorSet::to_json_value`] and
//! [`DescriptorSet::from_json_str`].

use crate::types::{FileDescriptor, MessageDescriptor};
use serde::{Deserialize, Serialize};

/// Errors while decoding a serialized descriptor set.
#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("invalid descriptor set JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries in the decoded set share a file name.
    #[error("duplicate file descriptor '{name}'")]
    DuplicateFile { name: String },

    /// A field whose `type_name` does not agree with its `kind`: named kinds
    /// need one, scalar kinds must not carry one.
    #[error("field '{field}' of message '{message}' in '{file}': {reason}")]
    InvalidField {
        file: String,
        message: String,
        field: String,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DescriptorSet {
    files: Vec<FileDescriptor>,
}

impl DescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a descriptor without checking for an existing file of the
    /// same name.
    pub fn push(&mut self, file: FileDescriptor) {
        self.files.push(file);
    }

    /// Append a descriptor unless one with the same name is already present.
    /// Returns `true` if the descriptor was added.
    pub fn insert_unique(&mut self, file: FileDescriptor) -> bool {
        if self.contains(&file.name) {
            return false;
        }
        self.files.push(file);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.files.iter().any(|f| f.name == name)
    }

    pub fn file(&self, name: &str) -> Option<&FileDescriptor> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    pub fn into_files(self) -> Vec<FileDescriptor> {
        self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Union `other` into `self`, keeping the first descriptor seen for any
    /// file name.
    pub fn merge(&mut self, other: DescriptorSet) {
        for f in other.files {
            self.insert_unique(f);
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        // Derived Serialize on plain data cannot fail.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_default()
    }

    pub fn from_json_str(s: &str) -> Result<DescriptorSet, DescriptorError> {
        let set: DescriptorSet = serde_json::from_str(s)?;
        let mut seen = std::collections::HashSet::new();
        for f in &set.files {
            if !seen.insert(f.name.as_str()) {
                return Err(DescriptorError::DuplicateFile {
                    name: f.name.clone(),
                });
            }
            for m in &f.messages {
                check_fields(&f.name, m, &m.name)?;
            }
        }
        Ok(set)
    }
}

/// `path` is the dotted name of `msg` within its file.
fn check_fields(file: &str, msg: &MessageDescriptor, path: &str) -> Result<(), DescriptorError> {
    for field in &msg.fields {
        let has_type_name = field.type_name.as_deref().is_some_and(|t| !t.is_empty());
        let reason = match (field.kind.is_named(), has_type_name) {
            (true, false) => "MESSAGE and ENUM fields need a type_name",
            (false, true) => "scalar fields cannot carry a type_name",
            _ => continue,
        };
        return Err(DescriptorError::InvalidField {
            file: file.to_owned(),
            message: path.to_owned(),
            field: field.name.clone(),
            reason,
        });
    }
    for nested in &msg.nested_messages {
        check_fields(file, nested, &format!("{}.{}", path, nested.name))?;
    }
    Ok(())
}

impl FromIterator<FileDescriptor> for DescriptorSet {
    fn from_iter<I: IntoIterator<Item = FileDescriptor>>(iter: I) -> Self {
        let mut set = DescriptorSet::new();
        for f in iter {
            set.insert_unique(f);
        }
        set
    }
}

impl IntoIterator for DescriptorSet {
    type Item = FileDescriptor;
    type IntoIter = std::vec::IntoIter<FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.into_iter()
    }
}

impl<'a> IntoIterator for &'a DescriptorSet {
    type Item = &'a FileDescriptor;
    type IntoIter = std::slice::Iter<'a, FileDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}
