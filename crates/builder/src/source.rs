//! Async collaborator traits at the builder's boundary.
//!
//! Catalog and template data arrive over the network once at step entry;
//! drafts are flushed to a store by the autosaver; finished studies are
//! handed to the study-creation API. All of it sits behind traits so
//! tests inject fixtures.

use async_trait::async_trait;

use canvass_core::{BlockCatalog, StudyDraft, StudySubmission, StudyTemplate, Timestamp};

use crate::error::SessionError;

/// Fetches the block catalog and template catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<BlockCatalog, SessionError>;

    async fn fetch_templates(&self) -> Result<Vec<StudyTemplate>, SessionError>;
}

/// Receives debounced draft snapshots from the autosaver.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, draft: &StudyDraft) -> Result<(), SessionError>;
}

/// What the study-creation API returns on a successful handoff — the
/// first moment the study has any server identity.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyReceipt {
    pub study_id: String,
    pub created_at: Timestamp,
}

/// The external study-creation API.
#[async_trait]
pub trait StudySink: Send + Sync {
    async fn create_study(&self, submission: &StudySubmission)
        -> Result<StudyReceipt, SessionError>;
}
