//! Single-source pipeline: schema text -> descriptor set.
//!
//! This is a thin orchestrator over the passes:
//! lex -> parse -> enum-name prepass -> lowering -> import resolution.

use crate::config::Config;
use crate::error::DescError;
use crate::pass3_imports;
use crate::source::ImportResolver;
use protodesc_descriptor::{DescriptorSet, FileDescriptor};

/// Compile one source and everything it imports. The returned set holds
/// imported files before their importers, with `name` last.
pub fn compile(
    name: &str,
    bytes: &[u8],
    resolver: &dyn ImportResolver,
    config: &Config,
) -> Result<DescriptorSet, DescError> {
    let mut set = DescriptorSet::new();
    pass3_imports::load_root(name, bytes, resolver, config.nesting, &mut set)?;
    Ok(set)
}

/// [`compile`] for source already held as text.
pub fn compile_str(
    name: &str,
    src: &str,
    resolver: &dyn ImportResolver,
    config: &Config,
) -> Result<DescriptorSet, DescError> {
    compile(name, src.as_bytes(), resolver, config)
}

/// Compile one source without following its imports. The descriptor still
/// lists them in `dependencies`.
pub fn compile_file(name: &str, src: &str, config: &Config) -> Result<FileDescriptor, DescError> {
    let (_, file) = pass3_imports::compile_single(name, src.as_bytes(), config.nesting)?;
    Ok(file)
}
