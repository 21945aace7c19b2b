//! Error types for part documents, replacements and campaign saves.

use thiserror::Error;

use crate::components::PartId;

/// Failure to rebuild a part from its document.
#[derive(Debug, Error)]
pub enum PartError {
    #[error("part document must be an object")]
    NotAnObject,

    #[error("part document has no type tag")]
    MissingType,

    #[error("unknown part type: {0}")]
    UnknownPartType(String),

    #[error("field `{field}` has unparseable value {value}")]
    Malformed { field: &'static str, value: String },

    #[error("unknown drive core type code: {0}")]
    UnknownCoreType(i64),
}

/// Why a placeholder could not be swapped for a spare.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplaceError {
    #[error("part {0:?} is not in the campaign inventory")]
    UnknownPart(PartId),

    #[error("part {0:?} is not a missing-part placeholder")]
    NotMissing(PartId),

    #[error("placeholder {0:?} is not installed on a unit")]
    NotInstalled(PartId),

    #[error("part {0:?} is not an acceptable replacement")]
    NotAcceptable(PartId),

    #[error("part {0:?} is already installed on a unit")]
    SpareInUse(PartId),

    #[error("part {0:?} has not arrived yet")]
    NotArrived(PartId),
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Part error: {0}")]
    Part(#[from] PartError),

    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Unit handle {0} cannot be restored")]
    BadUnitHandle(u64),

    #[error("Part id {0} is outside the assignable range")]
    BadPartId(u32),

    #[error("Part id {0} appears more than once")]
    DuplicatePartId(u32),
}
