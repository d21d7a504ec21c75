//! Environment capabilities a program needs

use keel_emit::ScriptTarget;
use thiserror::Error;

use crate::source::SourceUnit;
use crate::CompilerOptions;

/// Outcome of asking the host for a source file
#[derive(Debug, Clone)]
pub enum SourceFetch {
    Found(SourceUnit),
    /// The file does not exist; not an error by itself
    Missing,
    /// The file could not be read. `unit` is parsed from empty text so
    /// compilation can go on.
    Failed { unit: SourceUnit, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WriteError {
    pub message: String,
}

impl WriteError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// File system view of a compilation. Implementations decide where text
/// comes from and where output goes.
pub trait CompilerHost {
    fn get_default_lib_file_name(&self, options: &CompilerOptions) -> String;

    fn get_current_directory(&self) -> String;

    fn use_case_sensitive_file_names(&self) -> bool;

    fn get_canonical_file_name(&self, file_name: &str) -> String;

    fn get_new_line(&self) -> String;

    /// Reads and parses `file_name`. Spans of the parsed tree must carry
    /// `file_id`.
    fn get_source_file(&mut self, file_name: &str, target: ScriptTarget, file_id: usize) -> SourceFetch;

    fn write_file(&mut self, file_name: &str, data: &str, write_bom: bool) -> Result<(), WriteError>;

    fn file_exists(&self, file_name: &str) -> bool;
}
