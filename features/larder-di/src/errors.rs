use thiserror::Error;

use crate::types::DynError;

/// Errors surfaced by entry lookup and resolution
#[derive(Error, Debug)]
pub enum ContainerError {
    /// The identifier is unknown to the entry collection and to every provider
    #[error("no entry found for '{0}'")]
    NotFound(String),

    /// An alias was requested for a target that is neither an entry nor an existing alias
    #[error("cannot alias '{alias}': target '{target}' is not registered")]
    AliasTargetMissing {
        alias: String,
        target: String,
    },

    /// A definition's callable failed; the underlying error is passed
    /// through untouched and stays accessible on the variant
    #[error("{0}")]
    Definition(DynError),

    /// The entry resolved, but holds a different type than the caller requested
    #[error("entry '{id}' is not of type '{requested}'")]
    Downcast {
        id: String,
        requested: &'static str,
    },
}
