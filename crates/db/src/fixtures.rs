use chrono::Utc;
use uuid::Uuid;

use agentdir_core::domain::dimension::{DimensionKind, NewDimension};

use crate::connection::DbPool;
use crate::repositories::RepositoryError;

/// Category options offered by the submission form.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Productivity",
    "Writing",
    "Research",
    "Data Analysis",
    "Design",
    "Development",
    "Marketing",
    "Customer Service",
    "Education",
    "Finance",
    "Healthcare",
    "Legal",
    "Sales",
    "HR",
    "Other",
];

#[derive(Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub already_present: usize,
}

/// Inserts every default category that does not exist yet. Safe to run repeatedly.
pub async fn seed_default_categories(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let mut tx = pool.begin().await?;
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for name in DEFAULT_CATEGORIES {
        let category = NewDimension::for_name(DimensionKind::Category, name);
        let result = sqlx::query(
            "INSERT OR IGNORE INTO categories (id, name, slug, description, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(category.description.as_deref())
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(SeedResult { inserted, already_present: DEFAULT_CATEGORIES.len() - inserted })
}
