//! Pass 2: descriptor lowering -- walk the AST once more and build the
//! nested descriptor tree, classifying named field types with the enum-name
//! set from Pass 1.
//!
//! Open messages live on an explicit builder stack. When a definition
//! closes it is attached to the message below it on the stack, or to the
//! file when the stack is empty. `NestingMode::Flatten` attaches everything
//! to the file instead.

use crate::ast::*;
use crate::config::NestingMode;
use crate::error::DescError;
use crate::pass1_enums::EnumNames;
use protodesc_descriptor::{
    EnumDescriptor, EnumValueDescriptor, FieldDescriptor, FileDescriptor, Label,
    MessageDescriptor, NamedKind,
};

pub fn lower(
    file: &RawFile,
    name: &str,
    enum_names: &EnumNames,
    nesting: NestingMode,
) -> Result<FileDescriptor, DescError> {
    let mut lowering = Lowering {
        file_name: name,
        enum_names,
        nesting,
        open: Vec::new(),
        out: FileDescriptor::new(name, file.syntax.clone()),
        package_line: None,
    };
    for decl in &file.decls {
        lowering.visit_decl(decl)?;
    }
    Ok(lowering.out)
}

struct Lowering<'a> {
    file_name: &'a str,
    enum_names: &'a EnumNames,
    nesting: NestingMode,
    /// Messages whose closing brace has not been reached yet, innermost last.
    open: Vec<MessageDescriptor>,
    out: FileDescriptor,
    package_line: Option<u32>,
}

impl Lowering<'_> {
    fn visit_decl(&mut self, decl: &RawDecl) -> Result<(), DescError> {
        match decl {
            RawDecl::Import(import) => {
                let index = self.out.dependencies.len();
                self.out.dependencies.push(import.path.clone());
                match import.kind {
                    ImportKind::Public => self.out.public_dependencies.push(index),
                    ImportKind::Weak => self.out.weak_dependencies.push(index),
                    ImportKind::Default => {}
                }
            }
            RawDecl::Package { name, line } => {
                if let Some(first) = self.package_line {
                    return Err(DescError::syntax(
                        self.file_name,
                        *line,
                        format!("duplicate package declaration: first declared at line {}", first),
                    ));
                }
                self.package_line = Some(*line);
                self.out.package = Some(name.clone());
            }
            RawDecl::Message(m) => self.visit_message(m)?,
            RawDecl::Enum(e) => self.visit_enum(e),
        }
        Ok(())
    }

    fn visit_message(&mut self, msg: &RawMessage) -> Result<(), DescError> {
        self.open.push(MessageDescriptor::new(msg.name.clone()));
        for item in &msg.body {
            match item {
                RawMessageItem::Field(f) => {
                    let field = self.lower_field(f)?;
                    if let Some(current) = self.open.last_mut() {
                        current.fields.push(field);
                    }
                }
                RawMessageItem::Message(m) => self.visit_message(m)?,
                RawMessageItem::Enum(e) => self.visit_enum(e),
            }
        }
        if let Some(done) = self.open.pop() {
            self.attach_message(done);
        }
        Ok(())
    }

    fn visit_enum(&mut self, e: &RawEnum) {
        let mut desc = EnumDescriptor::new(e.name.clone());
        // Numbers are recorded as declared; duplicates are allowed.
        desc.values = e
            .values
            .iter()
            .map(|v| EnumValueDescriptor {
                name: v.name.clone(),
                number: v.number,
            })
            .collect();
        match (self.nesting, self.open.last_mut()) {
            (NestingMode::Nested, Some(parent)) => parent.nested_enums.push(desc),
            _ => self.out.enums.push(desc),
        }
    }

    fn attach_message(&mut self, msg: MessageDescriptor) {
        match (self.nesting, self.open.last_mut()) {
            (NestingMode::Nested, Some(parent)) => parent.nested_messages.push(msg),
            _ => self.out.messages.push(msg),
        }
    }

    fn lower_field(&self, f: &RawField) -> Result<FieldDescriptor, DescError> {
        let label = match f.label {
            None | Some(RawLabel::Optional) => Label::Optional,
            Some(RawLabel::Required) => Label::Required,
            Some(RawLabel::Repeated) => Label::Repeated,
        };
        match &f.ty {
            RawTypeRef::Scalar(kind) => Ok(FieldDescriptor::scalar(
                f.name.clone(),
                f.number,
                *kind,
                label,
            )),
            RawTypeRef::Named(parts) => {
                // Dotted references are classified by their last segment
                // against the unscoped enum set. Matching the full dotted
                // text instead would never hit that set, so
                // `Holder.Inner.Mode` would come out as a message even when
                // `Mode` is an enum declared in this file.
                let last = parts
                    .last()
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| DescError::UnresolvedType {
                        file: self.file_name.to_owned(),
                        line: f.line,
                        type_name: f.ty.text(),
                    })?;
                let kind = if self.enum_names.contains(last) {
                    NamedKind::Enum
                } else {
                    NamedKind::Message
                };
                Ok(FieldDescriptor::named(
                    f.name.clone(),
                    f.number,
                    kind,
                    f.ty.text(),
                    label,
                ))
            }
        }
    }
}
