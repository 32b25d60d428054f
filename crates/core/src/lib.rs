#![allow(clippy::result_large_err)]
//! protodesc-core: schema IDL to descriptor pipeline.
//!
//! Turns `.proto`-style schema source into the language-neutral descriptors
//! of [`protodesc_descriptor`]. Each file goes through:
//!
//! 1. [`lexer::lex`] -- source text to tokens
//! 2. [`parser::parse`] -- tokens to the raw AST
//! 3. [`collect_enum_names`] -- flat set of every enum declared in the file
//! 4. [`lower`] -- AST to a nested [`FileDescriptor`], using the enum set to
//!    classify named field types
//! 5. [`load_root`] -- the same pipeline for every import, transitively
//!
//! [`compile()`] runs this for one source; [`parse_all`] drives it over
//! files and directories.
//!
//! Everything is synchronous and holds no global state. Independent calls
//! may run on separate threads as long as the resolver they share is safe
//! to call reentrantly.

pub mod ast;
pub mod batch;
pub mod compile;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pass1_enums;
pub mod pass2_lower;
pub mod pass3_imports;
pub mod source;

// ── Convenience re-exports: key types ────────────────────────────────

pub use batch::BatchReport;
pub use config::{BatchMode, Config, NestingMode};
pub use error::DescError;
pub use pass1_enums::EnumNames;
pub use protodesc_descriptor::{
    DescriptorSet, EnumDescriptor, FieldDescriptor, FieldKind, FileDescriptor, Label,
    MessageDescriptor, NamedKind, ScalarKind,
};
pub use source::{
    FileSystemProvider, ImportResolver, InMemoryProvider, IncludePathResolver, NoImports,
    SourceProvider,
};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use batch::{parse_all, parse_all_with};
pub use compile::{compile, compile_file, compile_str};
pub use pass1_enums::collect_enum_names;
pub use pass2_lower::lower;
pub use pass3_imports::{load_root, load_root_over};
