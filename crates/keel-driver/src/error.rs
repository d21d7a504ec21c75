//! Error types of the adapter

use thiserror::Error;

/// Why a provider could not hand out a file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// No such file. The host treats this as a missing file, not a failure.
    #[error("file not found")]
    NotFound,
    #[error("{}", message.as_deref().unwrap_or("Unknown error"))]
    Other { message: Option<String> },
}

impl SourceError {
    pub fn other(message: impl Into<String>) -> Self {
        SourceError::Other {
            message: Some(message.into()),
        }
    }
}

/// A compilation that produced diagnostics. Displays as the full
/// `<#>`-wrapped report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("<#>{report}<#>")]
pub struct CompileFailure {
    report: String,
}

impl CompileFailure {
    pub(crate) fn new(report: String) -> Self {
        Self { report }
    }

    /// Rendered diagnostic lines without the sentinels
    pub fn report(&self) -> &str {
        &self.report
    }

    /// The report wrapped in `<#>` sentinels
    pub fn payload(&self) -> String {
        self.to_string()
    }
}

/// At least one file of a batch failed to compile
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BatchError {
    pub message: String,
    pub failed_files: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_source_error_messages() {
        assert_eq!(SourceError::other("disk on fire").to_string(), "disk on fire");
        assert_eq!(SourceError::Other { message: None }.to_string(), "Unknown error");
    }

    #[test]
    fn test_failure_payload() {
        let failure = CompileFailure::new("a.ts(1,1): error TS1005: ';' expected.\n".to_string());
        assert_eq!(failure.report(), "a.ts(1,1): error TS1005: ';' expected.\n");
        assert_eq!(failure.payload(), "<#>a.ts(1,1): error TS1005: ';' expected.\n<#>");
    }
}
