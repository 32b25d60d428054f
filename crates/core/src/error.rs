use serde::Serialize;

/// A pipeline error. Every error aborts processing of the file in which it
/// was detected; nothing is converted into a partial result.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DescError {
    /// Unrecognized character or malformed literal.
    #[error("{file}:{line}:{col}: unexpected character '{ch}'")]
    Lex {
        file: String,
        line: u32,
        col: u32,
        ch: char,
    },

    /// Grammar violation. The parser does not recover.
    #[error("{file}:{line}: syntax error: {message}")]
    Syntax {
        file: String,
        line: u32,
        message: String,
    },

    /// A field type that is neither a scalar nor a named reference.
    #[error("{file}:{line}: cannot resolve type '{type_name}'")]
    UnresolvedType {
        file: String,
        line: u32,
        type_name: String,
    },

    /// The import resolver could not supply bytes for `path`.
    #[error("{file}:{line}: import not found: '{path}' ({reason})")]
    ImportNotFound {
        file: String,
        line: u32,
        path: String,
        reason: String,
    },

    /// `path` is already being compiled further up the import chain.
    #[error("import cycle detected: {} \u{2192} {path}", .chain.join(" \u{2192} "))]
    ImportCycle { path: String, chain: Vec<String> },

    #[error("{file}: source is not valid UTF-8")]
    InvalidUtf8 { file: String },

    /// Filesystem failure in the batch driver (missing root, unreadable dir).
    #[error("{path}: {message}")]
    Io { path: String, message: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl DescError {
    pub fn syntax(file: &str, line: u32, message: impl Into<String>) -> Self {
        DescError::Syntax {
            file: file.to_owned(),
            line,
            message: message.into(),
        }
    }

    pub fn lex(file: &str, line: u32, col: u32, ch: char) -> Self {
        DescError::Lex {
            file: file.to_owned(),
            line,
            col,
            ch,
        }
    }

    pub fn io(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        DescError::Io {
            path: path.to_string(),
            message: err.to_string(),
        }
    }

    /// Stable tag naming the error variant.
    pub fn kind(&self) -> &'static str {
        match self {
            DescError::Lex { .. } => "lex",
            DescError::Syntax { .. } => "syntax",
            DescError::UnresolvedType { .. } => "unresolved_type",
            DescError::ImportNotFound { .. } => "import_not_found",
            DescError::ImportCycle { .. } => "import_cycle",
            DescError::InvalidUtf8 { .. } => "invalid_utf8",
            DescError::Io { .. } => "io",
            DescError::Config { .. } => "config",
        }
    }

    /// The file the error was detected in, if it is tied to one.
    pub fn file(&self) -> Option<&str> {
        match self {
            DescError::Lex { file, .. }
            | DescError::Syntax { file, .. }
            | DescError::UnresolvedType { file, .. }
            | DescError::ImportNotFound { file, .. }
            | DescError::InvalidUtf8 { file } => Some(file.as_str()),
            DescError::ImportCycle { path, .. } => Some(path.as_str()),
            DescError::Io { path, .. } => Some(path.as_str()),
            DescError::Config { .. } => None,
        }
    }

    /// 1-based source line, or 0 when the error is not tied to a line.
    pub fn line(&self) -> u32 {
        match self {
            DescError::Lex { line, .. }
            | DescError::Syntax { line, .. }
            | DescError::UnresolvedType { line, .. }
            | DescError::ImportNotFound { line, .. } => *line,
            _ => 0,
        }
    }

    /// Flat JSON form used by tooling. Always carries every key.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "kind":    self.kind(),
            "file":    self.file(),
            "line":    self.line(),
            "message": self.to_string(),
        })
    }
}
