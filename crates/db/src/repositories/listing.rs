use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};

use agentdir_core::domain::agent::{Agent, AgentId, AgentListing, Pricing, PricingType};
use agentdir_core::domain::dimension::{Category, DimensionId, Tag};

use super::{ListingRepository, RepositoryError};
use crate::DbPool;

pub struct SqlListingRepository {
    pool: DbPool,
}

impl SqlListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for SqlListingRepository {
    async fn get_agent_listing(
        &self,
        id: &AgentId,
    ) -> Result<Option<AgentListing>, RepositoryError> {
        let row = sqlx::query(
            "SELECT
                id, name, description, short_description, logo_url, website_url,
                pricing_type, pricing_starting_price, pricing_currency, pricing_url,
                features, created_at, updated_at
             FROM agents
             WHERE id = ?",
        )
        .bind(&id.0)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let agent = agent_from_row(&row)?;

        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT c.name
             FROM agent_categories ac
             JOIN categories c ON c.id = ac.category_id
             WHERE ac.agent_id = ?
             ORDER BY c.name",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        let tags: Vec<String> = sqlx::query_scalar(
            "SELECT t.name
             FROM agent_tags agt
             JOIN tags t ON t.id = agt.tag_id
             WHERE agt.agent_id = ?
             ORDER BY t.name",
        )
        .bind(&id.0)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(AgentListing { agent, categories, tags }))
    }

    async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, name, slug, description, parent_id, icon_url, created_at
             FROM categories
             ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(category_from_row).collect()
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, RepositoryError> {
        let rows = sqlx::query("SELECT id, name, slug, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(tag_from_row).collect()
    }
}

fn agent_from_row(row: &SqliteRow) -> Result<Agent, RepositoryError> {
    let pricing_raw = row.try_get::<String, _>("pricing_type")?;
    let pricing_type = PricingType::from_str(&pricing_raw)
        .map_err(|_| RepositoryError::Decode(format!("unknown pricing type `{pricing_raw}`")))?;

    let starting_price = row
        .try_get::<Option<String>, _>("pricing_starting_price")?
        .map(|value| {
            Decimal::from_str(&value).map_err(|error| {
                RepositoryError::Decode(format!("invalid starting price `{value}` ({error})"))
            })
        })
        .transpose()?;

    let features_raw = row.try_get::<String, _>("features")?;
    let features: Vec<String> = serde_json::from_str(&features_raw).map_err(|error| {
        RepositoryError::Decode(format!("invalid features array `{features_raw}` ({error})"))
    })?;

    Ok(Agent {
        id: AgentId(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        short_description: row.try_get("short_description")?,
        logo_url: row.try_get("logo_url")?,
        website_url: row.try_get("website_url")?,
        pricing: Some(Pricing {
            pricing_type,
            starting_price,
            currency: row.try_get("pricing_currency")?,
            pricing_url: row.try_get("pricing_url")?,
        }),
        features,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
        updated_at: parse_timestamp("updated_at", row.try_get("updated_at")?)?,
    })
}

fn category_from_row(row: &SqliteRow) -> Result<Category, RepositoryError> {
    Ok(Category {
        id: DimensionId(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        parent_id: row.try_get::<Option<String>, _>("parent_id")?.map(DimensionId),
        icon_url: row.try_get("icon_url")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

fn tag_from_row(row: &SqliteRow) -> Result<Tag, RepositoryError> {
    Ok(Tag {
        id: DimensionId(row.try_get("id")?),
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

fn parse_timestamp(column: &str, value: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&value).map(|timestamp| timestamp.with_timezone(&Utc)).map_err(
        |error| {
            RepositoryError::Decode(format!("invalid timestamp in `{column}`: `{value}` ({error})"))
        },
    )
}
