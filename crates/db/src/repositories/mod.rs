use async_trait::async_trait;
use thiserror::Error;

use agentdir_core::domain::agent::{AgentId, AgentListing};
use agentdir_core::domain::dimension::{Category, Tag};
use agentdir_core::errors::PersistenceError;

pub mod listing;
pub mod submission;

pub use listing::SqlListingRepository;
pub use submission::{SqlListingWriter, SqlSubmissionService};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl RepositoryError {
    pub fn into_persistence(self, operation: &'static str) -> PersistenceError {
        PersistenceError::backend(operation, self)
    }
}

/// Read side of the listing store.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// The agent row plus category and tag names reachable through its join rows.
    async fn get_agent_listing(&self, id: &AgentId)
        -> Result<Option<AgentListing>, RepositoryError>;

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError>;

    async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError>;
}
