//! Pass 1: enum-name prepass -- collect every declared enum name in a file,
//! at any nesting depth, into one flat set.
//!
//! Names are not scoped: `Status` nested in message `A` and `Status` nested
//! in message `B` are the same entry. Lowering needs the complete set before
//! it classifies any field, because a field may name an enum declared later
//! in the file.

use crate::ast::*;
use std::collections::HashSet;

pub type EnumNames = HashSet<String>;

pub fn collect_enum_names(file: &RawFile) -> EnumNames {
    let mut names = EnumNames::new();
    for decl in &file.decls {
        match decl {
            RawDecl::Enum(e) => {
                names.insert(e.name.clone());
            }
            RawDecl::Message(m) => collect_from_message(m, &mut names),
            RawDecl::Import(_) | RawDecl::Package { .. } => {}
        }
    }
    names
}

fn collect_from_message(msg: &RawMessage, names: &mut EnumNames) {
    for item in &msg.body {
        match item {
            RawMessageItem::Enum(e) => {
                names.insert(e.name.clone());
            }
            RawMessageItem::Message(m) => collect_from_message(m, names),
            RawMessageItem::Field(_) => {}
        }
    }
}
