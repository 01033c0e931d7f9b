//! Turns a validated submission into one agent row, find-or-create dimension
//! rows, and the join rows linking them.
//!
//! The algorithm is written against [`ListingWriter`] so the store decides
//! how the calls are grouped. The SQL store runs them in a single transaction.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::agent::{AgentId, NewAgent};
use crate::domain::dimension::{DimensionId, DimensionKind, NewDimension};
use crate::errors::PersistenceError;
use crate::submission::ValidatedSubmission;

#[async_trait]
pub trait ListingWriter: Send {
    /// Inserts the agent row. `Ok(None)` means the store accepted the row but
    /// produced no identifier.
    async fn insert_agent(&mut self, agent: &NewAgent) -> Result<Option<AgentId>, PersistenceError>;

    /// Exact, case-sensitive name lookup.
    async fn find_dimension(
        &mut self,
        kind: DimensionKind,
        name: &str,
    ) -> Result<Option<DimensionId>, PersistenceError>;

    async fn insert_dimension(
        &mut self,
        dimension: &NewDimension,
    ) -> Result<Option<DimensionId>, PersistenceError>;

    async fn link_dimension(
        &mut self,
        kind: DimensionKind,
        agent_id: &AgentId,
        dimension_id: &DimensionId,
    ) -> Result<(), PersistenceError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDimension {
    pub name: String,
    pub id: DimensionId,
    pub created: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub agent_id: AgentId,
    pub categories: Vec<ResolvedDimension>,
    pub tags: Vec<ResolvedDimension>,
}

impl SubmissionReceipt {
    pub fn created_dimensions(&self) -> usize {
        self.categories.iter().chain(&self.tags).filter(|resolved| resolved.created).count()
    }
}

pub async fn normalize_submission<W>(
    writer: &mut W,
    submission: &ValidatedSubmission,
) -> Result<SubmissionReceipt, PersistenceError>
where
    W: ListingWriter + ?Sized,
{
    let agent_id = writer
        .insert_agent(&submission.new_agent())
        .await?
        .ok_or(PersistenceError::MissingIdentifier { entity: "agent" })?;

    let categories =
        resolve_and_link(writer, &agent_id, DimensionKind::Category, submission.categories())
            .await?;
    let tags = resolve_and_link(writer, &agent_id, DimensionKind::Tag, submission.tags()).await?;

    let dropped = submission.submission().ignored_field_count();
    if dropped > 0 {
        debug!(
            agent_id = %agent_id.0,
            dropped,
            "industries, platforms, integrations and languages are not persisted"
        );
    }

    Ok(SubmissionReceipt { agent_id, categories, tags })
}

async fn resolve_and_link<W>(
    writer: &mut W,
    agent_id: &AgentId,
    kind: DimensionKind,
    names: &[String],
) -> Result<Vec<ResolvedDimension>, PersistenceError>
where
    W: ListingWriter + ?Sized,
{
    let mut resolved = Vec::with_capacity(names.len());

    for name in names {
        let (id, created) = match writer.find_dimension(kind, name).await? {
            Some(id) => (id, false),
            None => {
                let dimension = NewDimension::for_name(kind, name);
                let id = writer.insert_dimension(&dimension).await?.ok_or(
                    PersistenceError::MissingIdentifier { entity: kind.as_str() },
                )?;
                debug!(kind = kind.as_str(), name = %name, slug = %dimension.slug, "created dimension");
                (id, true)
            }
        };

        writer.link_dimension(kind, agent_id, &id).await?;
        resolved.push(ResolvedDimension { name: name.clone(), id, created });
    }

    Ok(resolved)
}
