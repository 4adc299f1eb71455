use thiserror::Error;

/// Stable status codes for every tree operation.
///
/// Variant names are the taxonomy itself — there is no wrapped payload
/// because every failure is fully determined by which component of a
/// path it was raised against, and the caller already has that path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    #[error("a component along the path does not exist")]
    NotFound,
    #[error("the path is not in canonical form")]
    Invalid,
    #[error("the target already exists")]
    Exists,
    #[error("the folder still has children")]
    NotEmpty,
    #[error("the root cannot be the subject of this operation")]
    Busy,
    #[error("the move would place a folder inside itself")]
    SourceAncestorOfTarget,
}

/// Shorthand for every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, TreeError>;
