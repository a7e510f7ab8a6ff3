use thiserror::Error;

/// Which stage rejected the beatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    /// The CSV is malformed or a cell does not parse.
    Parse,
    /// The file could not be read.
    Io,
    /// The row parses but describes something the rig cannot play.
    Validation,
}

// E1xxx: rows and cells, E2xxx: file access, E3xxx: values.
const CODES: &[(&str, CompileErrorKind)] = &[
    ("E1001", CompileErrorKind::Parse),
    ("E1002", CompileErrorKind::Parse),
    ("E1003", CompileErrorKind::Parse),
    ("E1004", CompileErrorKind::Parse),
    ("E1005", CompileErrorKind::Validation),
    ("E1006", CompileErrorKind::Parse),
    ("E2001", CompileErrorKind::Io),
    ("E3001", CompileErrorKind::Validation),
];

impl CompileErrorKind {
    pub(crate) fn of(code: &str) -> Self {
        CODES
            .iter()
            .find(|(c, _)| *c == code)
            .map_or(Self::Parse, |(_, kind)| *kind)
    }
}

/// A coded beatmap rejection. The display form is what the CLI prints
/// under `Caused by:`.
#[derive(Debug, Error, Clone)]
#[error("{code}: {message} (line {line})")]
pub struct CompileError {
    pub code: &'static str,
    pub kind: CompileErrorKind,
    pub message: String,
    /// 1-based CSV line, 0 when unknown.
    pub line: usize,
    pub file: Option<String>,
    pub column: Option<usize>,
    /// Beat index of the offending row, once it has been parsed.
    pub beat_index: Option<i64>,
    /// Raw cell or header text.
    pub context: Option<String>,
}

impl CompileError {
    pub(crate) fn new(code: &'static str, message: impl Into<String>, line: usize) -> Self {
        Self {
            code,
            kind: CompileErrorKind::of(code),
            message: message.into(),
            line,
            file: None,
            column: None,
            beat_index: None,
            context: None,
        }
    }

    pub fn with_file(self, file: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            ..self
        }
    }

    pub fn with_column(self, column: usize) -> Self {
        Self {
            column: Some(column),
            ..self
        }
    }

    pub fn with_beat(self, beat_index: i64) -> Self {
        Self {
            beat_index: Some(beat_index),
            ..self
        }
    }

    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            ..self
        }
    }
}
