use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, Sqlite, Transaction};
use tracing::{error, info, warn};
use uuid::Uuid;

use agentdir_core::domain::agent::{AgentId, NewAgent};
use agentdir_core::domain::dimension::{DimensionId, DimensionKind, NewDimension};
use agentdir_core::errors::{PersistenceError, SubmissionError};
use agentdir_core::submission::normalizer::{
    normalize_submission, ListingWriter, SubmissionReceipt,
};
use agentdir_core::submission::{AgentSubmission, ValidatedSubmission};

use crate::DbPool;

/// [`ListingWriter`] bound to one open transaction. Nothing is visible to
/// other connections until [`SqlListingWriter::commit`].
pub struct SqlListingWriter {
    tx: Transaction<'static, Sqlite>,
}

impl SqlListingWriter {
    pub async fn begin(pool: &DbPool) -> Result<Self, PersistenceError> {
        let tx = pool.begin().await.map_err(|e| PersistenceError::backend("begin transaction", e))?;
        Ok(Self { tx })
    }

    pub async fn commit(self) -> Result<(), PersistenceError> {
        self.tx.commit().await.map_err(|e| PersistenceError::backend("commit submission", e))
    }

    pub async fn rollback(self) -> Result<(), PersistenceError> {
        self.tx.rollback().await.map_err(|e| PersistenceError::backend("rollback submission", e))
    }
}

fn dimension_table(kind: DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Category => "categories",
        DimensionKind::Tag => "tags",
    }
}

#[async_trait]
impl ListingWriter for SqlListingWriter {
    async fn insert_agent(&mut self, agent: &NewAgent) -> Result<Option<AgentId>, PersistenceError> {
        let id = AgentId::generate();
        let now = Utc::now().to_rfc3339();
        let features = serde_json::to_string(&agent.features)
            .map_err(|e| PersistenceError::backend("encode agent features", e))?;

        let row = sqlx::query(
            "INSERT INTO agents (
                id, name, description, short_description, logo_url, website_url,
                pricing_type, pricing_starting_price, pricing_currency, pricing_url,
                features, created_at, updated_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&id.0)
        .bind(&agent.name)
        .bind(&agent.description)
        .bind(&agent.short_description)
        .bind(agent.logo_url.as_deref())
        .bind(&agent.website_url)
        .bind(agent.pricing.pricing_type.as_str())
        .bind(agent.pricing.starting_price.map(|price| price.to_string()))
        .bind(agent.pricing.currency.as_deref())
        .bind(agent.pricing.pricing_url.as_deref())
        .bind(features)
        .bind(&now)
        .bind(&now)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| PersistenceError::backend("insert agent", e))?;

        row.map(|row| row.try_get::<String, _>("id").map(AgentId))
            .transpose()
            .map_err(|e| PersistenceError::backend("insert agent", e))
    }

    async fn find_dimension(
        &mut self,
        kind: DimensionKind,
        name: &str,
    ) -> Result<Option<DimensionId>, PersistenceError> {
        let sql = format!("SELECT id FROM {} WHERE name = ?", dimension_table(kind));
        let id: Option<String> = sqlx::query_scalar(&sql)
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| PersistenceError::backend(lookup_operation(kind), e))?;

        Ok(id.map(DimensionId))
    }

    async fn insert_dimension(
        &mut self,
        dimension: &NewDimension,
    ) -> Result<Option<DimensionId>, PersistenceError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let operation = insert_operation(dimension.kind);

        let query = match dimension.kind {
            DimensionKind::Category => sqlx::query_scalar::<_, String>(
                "INSERT INTO categories (id, name, slug, description, created_at)
                 VALUES (?, ?, ?, ?, ?)
                 RETURNING id",
            )
            .bind(&id)
            .bind(&dimension.name)
            .bind(&dimension.slug)
            .bind(dimension.description.as_deref())
            .bind(&now),
            DimensionKind::Tag => sqlx::query_scalar::<_, String>(
                "INSERT INTO tags (id, name, slug, created_at)
                 VALUES (?, ?, ?, ?)
                 RETURNING id",
            )
            .bind(&id)
            .bind(&dimension.name)
            .bind(&dimension.slug)
            .bind(&now),
        };

        let inserted = query
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| PersistenceError::backend(operation, e))?;

        Ok(inserted.map(DimensionId))
    }

    async fn link_dimension(
        &mut self,
        kind: DimensionKind,
        agent_id: &AgentId,
        dimension_id: &DimensionId,
    ) -> Result<(), PersistenceError> {
        let sql = match kind {
            DimensionKind::Category => {
                "INSERT OR IGNORE INTO agent_categories (agent_id, category_id) VALUES (?, ?)"
            }
            DimensionKind::Tag => "INSERT OR IGNORE INTO agent_tags (agent_id, tag_id) VALUES (?, ?)",
        };

        sqlx::query(sql)
            .bind(&agent_id.0)
            .bind(&dimension_id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| PersistenceError::backend(link_operation(kind), e))?;

        Ok(())
    }
}

fn lookup_operation(kind: DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Category => "lookup category",
        DimensionKind::Tag => "lookup tag",
    }
}

fn insert_operation(kind: DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Category => "insert category",
        DimensionKind::Tag => "insert tag",
    }
}

fn link_operation(kind: DimensionKind) -> &'static str {
    match kind {
        DimensionKind::Category => "link category",
        DimensionKind::Tag => "link tag",
    }
}

/// Validates a submission and persists it atomically.
#[derive(Clone)]
pub struct SqlSubmissionService {
    pool: DbPool,
}

impl SqlSubmissionService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn submit(
        &self,
        submission: AgentSubmission,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let validated = submission.validate().map_err(|error| {
            warn!(
                event_name = "submission.agent.rejected",
                field = error.field,
                step = error.step.map(|step| step.number()),
                reason = %error.message,
                "submission failed validation"
            );
            error
        })?;

        Ok(self.persist(&validated).await?)
    }

    /// Runs the normalizer inside one transaction; any failure rolls back every row it wrote.
    pub async fn persist(
        &self,
        submission: &ValidatedSubmission,
    ) -> Result<SubmissionReceipt, PersistenceError> {
        let mut writer = SqlListingWriter::begin(&self.pool).await?;

        match normalize_submission(&mut writer, submission).await {
            Ok(receipt) => {
                writer.commit().await?;
                info!(
                    event_name = "submission.agent.created",
                    agent_id = %receipt.agent_id.0,
                    categories = receipt.categories.len(),
                    tags = receipt.tags.len(),
                    created_dimensions = receipt.created_dimensions(),
                    "agent listing persisted"
                );
                Ok(receipt)
            }
            Err(failure) => {
                if let Err(rollback_error) = writer.rollback().await {
                    warn!(
                        event_name = "submission.agent.rollback_failed",
                        error = %rollback_error,
                        "could not roll back failed submission"
                    );
                }
                error!(
                    event_name = "submission.agent.failed",
                    error = %failure,
                    agent_name = %submission.submission().name,
                    "agent submission rolled back"
                );
                Err(failure)
            }
        }
    }
}
