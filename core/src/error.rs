use thiserror::Error;

pub type LoadingResult<T = ()> = Result<T, LoadingError>;

#[derive(Error, Debug)]
pub enum LoadingError {
    /// The status registry is not mounted on the tree under the configured name.
    #[error("can not find store \"{0}\"; mount a LoadingStore under the root tree")]
    StoreNotFound(String),
    /// Something is mounted under the name, but it is not a status registry.
    #[error("store \"{0}\" is not a LoadingStore")]
    StoreTypeMismatch(String),
    #[error("invalid loading config: {0}")]
    Config(String),
}

impl LoadingError {
    /// Configuration errors are fatal for the dispatch that raised them.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            LoadingError::StoreNotFound(_)
                | LoadingError::StoreTypeMismatch(_)
                | LoadingError::Config(_)
        )
    }
}
