use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Domain errors surfaced to request handlers.
#[derive(Debug, Error)]
pub enum PlanError {
    /// Malformed or out-of-range input.
    #[error("{message}")]
    Validation { field: String, message: String },

    /// Referenced id is absent.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A day already exists for the date.
    #[error("day already exists for {date}")]
    Duplicate { date: String },

    /// Persisted file is unreadable, corrupt, or could not be written.
    #[error("storage failure at {}: {source:#}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

pub type PlanResult<T> = Result<T, PlanError>;

impl PlanError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        PlanError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        PlanError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        PlanError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Wire error code.
    pub fn code(&self) -> &'static str {
        match self {
            PlanError::Validation { .. } => "bad_params",
            PlanError::NotFound { .. } => "not_found",
            PlanError::Duplicate { .. } => "duplicate",
            PlanError::Storage { .. } => "storage_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            PlanError::Validation { field, .. } => Some(json!({ "field": field })),
            PlanError::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            PlanError::Duplicate { date } => Some(json!({ "date": date })),
            PlanError::Storage { path, .. } => {
                Some(json!({ "path": path.to_string_lossy() }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(PlanError::validation("title", "x").code(), "bad_params");
        assert_eq!(PlanError::not_found("task", "abc").code(), "not_found");
        assert_eq!(
            PlanError::Duplicate {
                date: "2024-01-15".into()
            }
            .code(),
            "duplicate"
        );
        let e = PlanError::storage("/tmp/x.json", anyhow::anyhow!("bad json"));
        assert_eq!(e.code(), "storage_failed");
        assert!(e.to_string().contains("bad json"));
    }

    #[test]
    fn validation_details_carry_field() {
        let e = PlanError::validation("name", "name must not be empty");
        assert_eq!(e.details(), Some(json!({ "field": "name" })));
        assert_eq!(e.to_string(), "name must not be empty");
    }
}
