//! protodesc-descriptor: language-neutral schema descriptor types.
//!
//! Provides the descriptor representation produced by `protodesc-core`
//! ([`FileDescriptor`], [`MessageDescriptor`], [`EnumDescriptor`],
//! [`FieldDescriptor`]) and the aggregate [`DescriptorSet`] with JSON
//! serialization. Code generators depend on this crate alone; they never
//! need the parser.

pub mod set;
pub mod types;

pub use set::{DescriptorError, DescriptorSet};
pub use types::*;
