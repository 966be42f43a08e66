use canvass_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Draft store failure: {0}")]
    Store(String),

    #[error("Catalog source failure: {0}")]
    Source(String),

    #[error("Study submission failed: {0}")]
    Submission(String),
}
