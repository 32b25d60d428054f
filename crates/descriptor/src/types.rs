//! Typed structs for the descriptor representation of a parsed schema.
//!
//! These types are independent of any wire format. Declaration order of
//! messages, enums, fields and enum values is preserved exactly as written
//! in the source; nothing here sorts or deduplicates.

use serde::{Deserialize, Serialize};

// ── Field kinds ─────────────────────────────────────────────────────

/// One of the fifteen primitive field types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScalarKind {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl ScalarKind {
    /// Every scalar kind, in no particular order.
    pub const ALL: [ScalarKind; 15] = [
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int64,
        ScalarKind::Uint64,
        ScalarKind::Int32,
        ScalarKind::Fixed64,
        ScalarKind::Fixed32,
        ScalarKind::Bool,
        ScalarKind::String,
        ScalarKind::Bytes,
        ScalarKind::Uint32,
        ScalarKind::Sfixed32,
        ScalarKind::Sfixed64,
        ScalarKind::Sint32,
        ScalarKind::Sint64,
    ];

    /// The source keyword for this scalar (e.g. `"int32"`).
    pub fn keyword(self) -> &'static str {
        match self {
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Int32 => "int32",
            ScalarKind::Fixed64 => "fixed64",
            ScalarKind::Fixed32 => "fixed32",
            ScalarKind::Bool => "bool",
            ScalarKind::String => "string",
            ScalarKind::Bytes => "bytes",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Sfixed32 => "sfixed32",
            ScalarKind::Sfixed64 => "sfixed64",
            ScalarKind::Sint32 => "sint32",
            ScalarKind::Sint64 => "sint64",
        }
    }

    /// Look up a scalar by its source keyword.
    pub fn from_keyword(word: &str) -> Option<ScalarKind> {
        ScalarKind::ALL.into_iter().find(|k| k.keyword() == word)
    }
}

/// The resolved kind of a field: a scalar, or a reference to a named
/// message or enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Named(NamedKind),
}

/// Kinds that carry a `type_name`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum NamedKind {
    Message,
    Enum,
}

impl FieldKind {
    pub const MESSAGE: FieldKind = FieldKind::Named(NamedKind::Message);
    pub const ENUM: FieldKind = FieldKind::Named(NamedKind::Enum);

    pub fn is_named(self) -> bool {
        matches!(self, FieldKind::Named(_))
    }
}

impl From<ScalarKind> for FieldKind {
    fn from(k: ScalarKind) -> Self {
        FieldKind::Scalar(k)
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    /// Also used for fields declared without a label keyword.
    #[default]
    Optional,
    Required,
    Repeated,
}

// ── Descriptors ─────────────────────────────────────────────────────

/// A single field of a message.
///
/// `type_name` is present if and only if `kind` is MESSAGE or ENUM; use
/// [`FieldDescriptor::scalar`] and [`FieldDescriptor::named`] to keep that
/// invariant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub number: i32,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub label: Label,
}

impl FieldDescriptor {
    pub fn scalar(name: impl Into<String>, number: i32, kind: ScalarKind, label: Label) -> Self {
        FieldDescriptor {
            name: name.into(),
            number,
            kind: FieldKind::Scalar(kind),
            type_name: None,
            label,
        }
    }

    pub fn named(
        name: impl Into<String>,
        number: i32,
        kind: NamedKind,
        type_name: impl Into<String>,
        label: Label,
    ) -> Self {
        FieldDescriptor {
            name: name.into(),
            number,
            kind: FieldKind::Named(kind),
            type_name: Some(type_name.into()),
            label,
        }
    }
}

/// A single `name = number` entry of an enum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    pub name: String,
    pub number: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnumDescriptor {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValueDescriptor>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        EnumDescriptor {
            name: name.into(),
            values: Vec::new(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&EnumValueDescriptor> {
        self.values.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub nested_messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub nested_enums: Vec<EnumDescriptor>,
}

impl MessageDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        MessageDescriptor {
            name: name.into(),
            ..Default::default()
        }
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn nested_message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.nested_messages.iter().find(|m| m.name == name)
    }

    pub fn nested_enum(&self, name: &str) -> Option<&EnumDescriptor> {
        self.nested_enums.iter().find(|e| e.name == name)
    }
}

/// The descriptor for one source file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileDescriptor {
    pub name: String,
    pub syntax: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    /// Import paths in declaration order.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Indices into `dependencies` of `import public` statements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_dependencies: Vec<usize>,
    /// Indices into `dependencies` of `import weak` statements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weak_dependencies: Vec<usize>,
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, syntax: impl Into<String>) -> Self {
        FileDescriptor {
            name: name.into(),
            syntax: syntax.into(),
            ..Default::default()
        }
    }

    /// Top-level message by name.
    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Top-level enum by name.
    pub fn enum_type(&self, name: &str) -> Option<&EnumDescriptor> {
        self.enums.iter().find(|e| e.name == name)
    }
}
