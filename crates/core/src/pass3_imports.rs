//! Pass 3: import resolution -- run the full pipeline on every imported
//! file, transitively, and fold the results into one descriptor set.
//!
//! The importing file only records the import path as a dependency. Each
//! imported file contributes its own descriptor, placed before its
//! importer. A file that is already in the output set is not compiled
//! again, so diamond imports yield one descriptor.

use crate::ast::RawFile;
use crate::config::NestingMode;
use crate::error::DescError;
use crate::lexer;
use crate::parser;
use crate::pass1_enums;
use crate::pass2_lower;
use crate::source::ImportResolver;
use protodesc_descriptor::{DescriptorSet, FileDescriptor};
use std::collections::HashSet;

/// Compile `name` from `bytes` and everything it imports into `out`.
pub fn load_root(
    name: &str,
    bytes: &[u8],
    resolver: &dyn ImportResolver,
    nesting: NestingMode,
    out: &mut DescriptorSet,
) -> Result<(), DescError> {
    let mut ctx = ImportContext {
        resolver,
        nesting,
        known: None,
        stack: Vec::new(),
        stack_set: HashSet::new(),
    };
    ctx.load_file(name, bytes, out)
}

/// [`load_root`] into a fresh `out`, treating files already in `known` as
/// compiled. Nothing is added to `known`; `out` receives only new files.
pub fn load_root_over(
    name: &str,
    bytes: &[u8],
    resolver: &dyn ImportResolver,
    nesting: NestingMode,
    known: &DescriptorSet,
    out: &mut DescriptorSet,
) -> Result<(), DescError> {
    let mut ctx = ImportContext {
        resolver,
        nesting,
        known: Some(known),
        stack: Vec::new(),
        stack_set: HashSet::new(),
    };
    ctx.load_file(name, bytes, out)
}

/// Lex, parse, prepass and lower a single source. Imports are recorded but
/// not followed.
pub fn compile_single(
    name: &str,
    bytes: &[u8],
    nesting: NestingMode,
) -> Result<(RawFile, FileDescriptor), DescError> {
    let src = std::str::from_utf8(bytes).map_err(|_| DescError::InvalidUtf8 {
        file: name.to_owned(),
    })?;
    let tokens = lexer::lex(src, name)?;
    let ast = parser::parse(&tokens, name)?;
    // Both passes read the same tree; the source is parsed exactly once.
    let enum_names = pass1_enums::collect_enum_names(&ast);
    let file = pass2_lower::lower(&ast, name, &enum_names, nesting)?;
    Ok((ast, file))
}

/// The name an import is resolved and recorded under: leading `/` removed,
/// `.` segments and repeated separators dropped, `a/../` folded. Leading
/// `..` segments stay so the resolver can refuse them.
pub fn import_key(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ => parts.push(".."),
            },
            other => parts.push(other),
        }
    }
    parts.join("/")
}

struct ImportContext<'a> {
    resolver: &'a dyn ImportResolver,
    nesting: NestingMode,
    known: Option<&'a DescriptorSet>,
    /// Files currently being compiled, outermost first.
    stack: Vec<String>,
    // Parallel HashSet for O(1) cycle checks; `stack` keeps the order for
    // error messages.
    stack_set: HashSet<String>,
}

impl ImportContext<'_> {
    fn is_compiled(&self, out: &DescriptorSet, name: &str) -> bool {
        out.contains(name) || self.known.is_some_and(|k| k.contains(name))
    }

    fn cycle_error(&self, path: &str) -> DescError {
        DescError::ImportCycle {
            path: path.to_owned(),
            chain: self.stack.clone(),
        }
    }

    fn load_file(
        &mut self,
        name: &str,
        bytes: &[u8],
        out: &mut DescriptorSet,
    ) -> Result<(), DescError> {
        if self.stack_set.contains(name) {
            return Err(self.cycle_error(name));
        }
        if self.is_compiled(out, name) {
            tracing::trace!(file = name, "already compiled");
            return Ok(());
        }

        let (ast, file) = compile_single(name, bytes, self.nesting)?;

        self.stack_set.insert(name.to_owned());
        self.stack.push(name.to_owned());

        for import in ast.imports() {
            let key = import_key(&import.path);
            if self.stack_set.contains(&key) {
                return Err(self.cycle_error(&key));
            }
            if self.is_compiled(out, &key) {
                continue;
            }
            let imported = self
                .resolver
                .resolve(&key)
                .map_err(|e| DescError::ImportNotFound {
                    file: name.to_owned(),
                    line: import.line,
                    path: import.path.clone(),
                    reason: e.to_string(),
                })?;
            tracing::debug!(file = name, import = %key, "resolved import");
            self.load_file(&key, &imported, out)?;
        }

        self.stack.pop();
        self.stack_set.remove(name);

        tracing::debug!(
            file = name,
            messages = file.messages.len(),
            enums = file.enums.len(),
            dependencies = file.dependencies.len(),
            "compiled"
        );
        out.insert_unique(file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{InMemoryProvider, NoImports};

    fn names(set: &DescriptorSet) -> Vec<&str> {
        set.files().iter().map(|f| f.name.as_str()).collect()
    }

    fn load(name: &str, src: &str, resolver: &dyn ImportResolver) -> Result<DescriptorSet, DescError> {
        let mut set = DescriptorSet::new();
        load_root(name, src.as_bytes(), resolver, NestingMode::Nested, &mut set)?;
        Ok(set)
    }

    #[test]
    fn file_without_imports_yields_one_descriptor() {
        let set = load("solo.proto", "syntax = \"proto3\";\nmessage A {}", &NoImports).unwrap();
        assert_eq!(names(&set), vec!["solo.proto"]);
    }

    #[test]
    fn resolvable_import_adds_dependency_and_descriptor() {
        let provider = InMemoryProvider::new().with_file(
            "common/types.proto",
            "syntax = \"proto3\";\nmessage Money { int64 units = 1; }",
        );
        let set = load(
            "order.proto",
            "syntax = \"proto3\";\nimport \"common/types.proto\";\nmessage Order { Money total = 1; }",
            &provider,
        )
        .unwrap();
        assert_eq!(names(&set), vec!["common/types.proto", "order.proto"]);
        let order = set.file("order.proto").unwrap();
        assert_eq!(order.dependencies, vec!["common/types.proto"]);
        // Imported content is not inlined into the importer.
        assert_eq!(order.messages.len(), 1);
        let types = set.file("common/types.proto").unwrap();
        assert_eq!(types.messages[0].name, "Money");
    }

    #[test]
    fn unresolvable_import_fails_with_location() {
        let err = load(
            "a.proto",
            "syntax = \"proto3\";\n\nimport \"missing.proto\";",
            &InMemoryProvider::new(),
        )
        .unwrap_err();
        match err {
            DescError::ImportNotFound {
                file, line, path, ..
            } => {
                assert_eq!(file, "a.proto");
                assert_eq!(line, 3);
                assert_eq!(path, "missing.proto");
            }
            other => panic!("expected ImportNotFound, got {:?}", other),
        }
    }

    #[test]
    fn leading_slash_is_stripped_before_resolution() {
        let provider =
            InMemoryProvider::new().with_file("google/protobuf/empty.proto", "syntax = \"proto3\";\nmessage Empty {}");
        let seen = std::cell::RefCell::new(Vec::new());
        let resolver = |path: &str| {
            seen.borrow_mut().push(path.to_owned());
            provider.resolve(path)
        };
        let set = load(
            "svc.proto",
            "syntax = \"proto3\";\nimport \"/google/protobuf/empty.proto\";",
            &resolver,
        )
        .unwrap();
        assert_eq!(*seen.borrow(), vec!["google/protobuf/empty.proto"]);
        assert_eq!(
            set.file("svc.proto").unwrap().dependencies,
            vec!["/google/protobuf/empty.proto"]
        );
        assert!(set.contains("google/protobuf/empty.proto"));
    }

    #[test]
    fn transitive_imports_come_first_in_declaration_order() {
        let provider = InMemoryProvider::new()
            .with_file("b.proto", "syntax = \"proto3\";\nimport \"c.proto\";")
            .with_file("c.proto", "syntax = \"proto3\";")
            .with_file("d.proto", "syntax = \"proto3\";\nimport \"c.proto\";");
        let set = load(
            "a.proto",
            "syntax = \"proto3\";\nimport \"b.proto\";\nimport \"d.proto\";",
            &provider,
        )
        .unwrap();
        // c.proto is reached twice but produced once.
        assert_eq!(names(&set), vec!["c.proto", "b.proto", "d.proto", "a.proto"]);
    }

    #[test]
    fn mutual_imports_are_a_cycle() {
        let provider = InMemoryProvider::new()
            .with_file("a.proto", "syntax = \"proto3\";\nimport \"b.proto\";")
            .with_file("b.proto", "syntax = \"proto3\";\nimport \"a.proto\";");
        let err = load(
            "a.proto",
            "syntax = \"proto3\";\nimport \"b.proto\";",
            &provider,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DescError::ImportCycle {
                path: "a.proto".into(),
                chain: vec!["a.proto".into(), "b.proto".into()],
            }
        );
    }

    #[test]
    fn self_import_is_a_cycle() {
        let err = load(
            "self.proto",
            "syntax = \"proto3\";\nimport \"self.proto\";",
            &InMemoryProvider::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), "import_cycle");
    }

    #[test]
    fn error_in_imported_file_aborts_everything() {
        let provider = InMemoryProvider::new().with_file("bad.proto", "syntax = \"proto3\";\nmessage {");
        let err = load(
            "a.proto",
            "syntax = \"proto3\";\nimport \"bad.proto\";\nmessage A {}",
            &provider,
        )
        .unwrap_err();
        match err {
            DescError::Syntax { file, line, .. } => {
                assert_eq!(file, "bad.proto");
                assert_eq!(line, 2);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn load_over_known_set_only_adds_new_files() {
        let provider = InMemoryProvider::new()
            .with_file("shared.proto", "syntax = \"proto3\";\nmessage S {}")
            .with_file("fresh.proto", "syntax = \"proto3\";");
        let mut known = DescriptorSet::new();
        load_root(
            "shared.proto",
            b"syntax = \"proto3\";\nmessage S {}",
            &NoImports,
            NestingMode::Nested,
            &mut known,
        )
        .unwrap();

        let mut out = DescriptorSet::new();
        load_root_over(
            "main.proto",
            b"syntax = \"proto3\";\nimport \"shared.proto\";\nimport \"fresh.proto\";",
            &provider,
            NestingMode::Nested,
            &known,
            &mut out,
        )
        .unwrap();
        assert_eq!(names(&out), vec!["fresh.proto", "main.proto"]);
        assert_eq!(names(&known), vec!["shared.proto"]);
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let mut set = DescriptorSet::new();
        let err = load_root(
            "bin.proto",
            &[0x73, 0xff, 0xfe],
            &NoImports,
            NestingMode::Nested,
            &mut set,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DescError::InvalidUtf8 {
                file: "bin.proto".into()
            }
        );
        assert!(set.is_empty());
    }

    #[test]
    fn import_key_normalizes_segments() {
        assert_eq!(import_key("/a/b.proto"), "a/b.proto");
        assert_eq!(import_key("a/b.proto"), "a/b.proto");
        assert_eq!(import_key("./a//b.proto"), "a/b.proto");
        assert_eq!(import_key("a/x/../b.proto"), "a/b.proto");
        assert_eq!(import_key("../../up.proto"), "../../up.proto");
    }

    #[test]
    fn differently_spelled_diamond_imports_yield_one_descriptor() {
        let provider = InMemoryProvider::new()
            .with_file("b.proto", "syntax = \"proto3\";\nimport \"c.proto\";")
            .with_file("c.proto", "syntax = \"proto3\";")
            .with_file("d.proto", "syntax = \"proto3\";\nimport \"./c.proto\";");
        let set = load(
            "a.proto",
            "syntax = \"proto3\";\nimport \"b.proto\";\nimport \"d.proto\";",
            &provider,
        )
        .unwrap();
        assert_eq!(names(&set), vec!["c.proto", "b.proto", "d.proto", "a.proto"]);
        // The literal spelling is still what the importer records.
        assert_eq!(set.file("d.proto").unwrap().dependencies, vec!["./c.proto"]);
    }

    #[test]
    fn cycle_through_dotted_spelling_is_caught() {
        let provider = InMemoryProvider::new()
            .with_file("b.proto", "syntax = \"proto3\";\nimport \"./sub/../a.proto\";");
        let err = load(
            "a.proto",
            "syntax = \"proto3\";\nimport \"b.proto\";",
            &provider,
        )
        .unwrap_err();
        assert_eq!(
            err,
            DescError::ImportCycle {
                path: "a.proto".into(),
                chain: vec!["a.proto".into(), "b.proto".into()],
            }
        );
    }
}
