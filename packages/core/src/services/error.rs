//! Gateway Error Types
//!
//! Every failure a tool call can produce. The `Display` text of each variant
//! is the exact message reported to the caller inside the error envelope.

use std::fmt;
use thiserror::Error;

/// One violated field constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// Dotted path to the offending field, empty for the argument root
    pub path: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Which sanitization function failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStage {
    Output,
    Input,
    Query,
}

impl fmt::Display for SanitizeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SanitizeStage::Output => "output",
            SanitizeStage::Input => "input",
            SanitizeStage::Query => "query",
        })
    }
}

fn failure_message(stage: &SanitizeStage, uid: &str) -> String {
    match stage {
        SanitizeStage::Output => format!(
            "Failed to sanitize output for \"{}\". Data not returned for security.",
            uid
        ),
        SanitizeStage::Input => format!(
            "Failed to sanitize input for \"{}\". Write operation aborted for security.",
            uid
        ),
        SanitizeStage::Query => format!(
            "Failed to sanitize query for \"{}\". Query not executed for security.",
            uid
        ),
    }
}

/// Sanitization could not complete; the enclosing operation must abort
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// No schema is registered for the content type
    #[error("Content type \"{uid}\" not found. Cannot sanitize {stage}.")]
    UnknownContentType { uid: String, stage: SanitizeStage },

    /// The payload could not be sanitized
    #[error("{}", failure_message(.stage, .uid))]
    Failed {
        uid: String,
        stage: SanitizeStage,
        reason: String,
    },
}

impl SanitizeError {
    pub fn unknown_content_type(uid: impl Into<String>, stage: SanitizeStage) -> Self {
        Self::UnknownContentType {
            uid: uid.into(),
            stage,
        }
    }

    pub fn failed(uid: impl Into<String>, stage: SanitizeStage, reason: impl Into<String>) -> Self {
        Self::Failed {
            uid: uid.into(),
            stage,
            reason: reason.into(),
        }
    }
}

/// Tool call errors
///
/// All variants are caught at the dispatcher boundary and rendered into the
/// error envelope; none of them terminate the process.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Malformed or missing arguments, one issue per violated constraint
    #[error("Validation failed for {tool}:\n{}", join_issues(.issues))]
    Validation {
        tool: String,
        issues: Vec<FieldIssue>,
    },

    /// Content type absent from the catalog or outside the user namespace
    #[error("Content type \"{uid}\" not found. Use list_content_types to see available content types.")]
    ContentTypeNotFound { uid: String },

    /// Component absent from the catalog
    #[error("Component \"{uid}\" not found. Use list_components to see available components.")]
    ComponentNotFound { uid: String },

    /// Document absent from the store
    #[error("Document with id \"{document_id}\" not found in \"{uid}\".")]
    DocumentNotFound { uid: String, document_id: String },

    /// Media file absent from the media library
    #[error("Media file with id {id} not found")]
    MediaNotFound { id: u64 },

    /// Sanitization failed closed
    #[error(transparent)]
    Sanitization(#[from] SanitizeError),

    /// Store or upload fetch failure, carrying the upstream message
    #[error("{0}")]
    Upstream(String),

    /// Call names an operation absent from the registry
    #[error("Unknown tool: {name}")]
    UnknownOperation { name: String },
}

impl GatewayError {
    /// Create a validation error
    pub fn validation(tool: impl Into<String>, issues: Vec<FieldIssue>) -> Self {
        Self::Validation {
            tool: tool.into(),
            issues,
        }
    }

    /// Create a content type not found error
    pub fn content_type_not_found(uid: impl Into<String>) -> Self {
        Self::ContentTypeNotFound { uid: uid.into() }
    }

    /// Create a component not found error
    pub fn component_not_found(uid: impl Into<String>) -> Self {
        Self::ComponentNotFound { uid: uid.into() }
    }

    /// Create a document not found error
    pub fn document_not_found(uid: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            uid: uid.into(),
            document_id: document_id.into(),
        }
    }

    /// Create an upstream error from any collaborator failure
    pub fn upstream(error: impl fmt::Display) -> Self {
        Self::Upstream(error.to_string())
    }

    /// Create an unknown operation error
    pub fn unknown_operation(name: impl Into<String>) -> Self {
        Self::UnknownOperation { name: name.into() }
    }

    /// Short classification used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation { .. } => "validation",
            GatewayError::ContentTypeNotFound { .. }
            | GatewayError::ComponentNotFound { .. }
            | GatewayError::DocumentNotFound { .. }
            | GatewayError::MediaNotFound { .. } => "not_found",
            GatewayError::Sanitization(_) => "sanitization",
            GatewayError::Upstream(_) => "upstream",
            GatewayError::UnknownOperation { .. } => "unknown_operation",
        }
    }
}
