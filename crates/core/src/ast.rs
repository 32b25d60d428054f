//! Raw AST produced by the parser.
//!
//! Every node carries the line of its opening token. Type references are
//! left unresolved here: a bare identifier may name a message or an enum,
//! and only the enum-name prepass over the finished tree can tell which.

use protodesc_descriptor::ScalarKind;

#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    pub syntax: String,
    pub decls: Vec<RawDecl>,
}

/// A top-level declaration. Options are parsed and then dropped, so they
/// have no node.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDecl {
    Import(RawImport),
    Package { name: String, line: u32 },
    Message(RawMessage),
    Enum(RawEnum),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Public,
    Weak,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawImport {
    pub path: String,
    pub kind: ImportKind,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub name: String,
    pub body: Vec<RawMessageItem>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawMessageItem {
    Field(RawField),
    Message(RawMessage),
    Enum(RawEnum),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawEnum {
    pub name: String,
    pub values: Vec<RawEnumValue>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawEnumValue {
    pub name: String,
    pub number: i32,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawLabel {
    Optional,
    Required,
    Repeated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawTypeRef {
    Scalar(ScalarKind),
    /// `Foo` or `Outer.Inner`, one entry per dotted segment
    Named(Vec<String>),
}

impl RawTypeRef {
    /// The reference as written in source.
    pub fn text(&self) -> String {
        match self {
            RawTypeRef::Scalar(k) => k.keyword().to_owned(),
            RawTypeRef::Named(parts) => parts.join("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    /// `None` when the field was declared without a label keyword.
    pub label: Option<RawLabel>,
    pub ty: RawTypeRef,
    pub name: String,
    pub number: i32,
    pub line: u32,
}

impl RawFile {
    pub fn imports(&self) -> impl Iterator<Item = &RawImport> {
        self.decls.iter().filter_map(|d| match d {
            RawDecl::Import(i) => Some(i),
            _ => None,
        })
    }
}
