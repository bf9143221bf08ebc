use thiserror::Error;

pub type Result<T> = std::result::Result<T, TranslateError>;

/// Everything that can stop a translation. There is no partial output: a
/// translation either returns a whole document or one of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// The input graph violates a structural rule (orphans, duplicate ids, ...).
    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("{kind} '{id}' referenced by '{referenced_by}' is not defined in the model")]
    DanglingReference {
        kind: &'static str,
        id: String,
        referenced_by: String,
    },

    #[error("invalid geometry for '{entity}': {reason}")]
    InvalidGeometry { entity: String, reason: String },

    /// Internal invariant violated while putting the document together.
    #[error("document assembly failed: {0}")]
    AssemblyError(String),
}

impl TranslateError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        TranslateError::MalformedModel(msg.into())
    }

    pub fn dangling(kind: &'static str, id: &str, referenced_by: &str) -> Self {
        TranslateError::DanglingReference {
            kind,
            id: id.to_string(),
            referenced_by: referenced_by.to_string(),
        }
    }

    pub fn geometry(entity: &str, reason: impl Into<String>) -> Self {
        TranslateError::InvalidGeometry {
            entity: entity.to_string(),
            reason: reason.into(),
        }
    }

    pub fn assembly(msg: impl Into<String>) -> Self {
        TranslateError::AssemblyError(msg.into())
    }
}
