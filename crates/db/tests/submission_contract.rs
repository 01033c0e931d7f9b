use agentdir_core::submission::AgentSubmission;
use agentdir_db::repositories::ListingRepository;
use agentdir_db::{
    connect_with_settings, migrations, seed_default_categories, DbPool, SqlListingRepository,
    SqlSubmissionService,
};

type ContractResult<T = ()> = Result<T, String>;

macro_rules! require_eq {
    ($left:expr, $right:expr) => {
        if $left != $right {
            return Err(format!(
                "assertion failed: `left == right` (`{:?}` != `{:?}`)",
                $left,
                $right
            ));
        }
    };
}

async fn empty_store() -> ContractResult<DbPool> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30)
        .await
        .map_err(|error| format!("connect: {error}"))?;
    migrations::run_pending(&pool).await.map_err(|error| format!("migrate: {error}"))?;
    Ok(pool)
}

async fn count(pool: &DbPool, table: &str) -> ContractResult<i64> {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .map_err(|error| format!("count {table}: {error}"))
}

fn payload(raw: &str) -> ContractResult<AgentSubmission> {
    serde_json::from_str(raw).map_err(|error| format!("payload: {error}"))
}

#[tokio::test]
async fn single_new_category_submission_on_empty_store() -> ContractResult {
    let pool = empty_store().await?;
    let submission = payload(
        r#"{
            "name": "Test Agent",
            "description": "An agent used by the contract test",
            "shortDescription": "Contract agent",
            "websiteUrl": "https://test-agent.example",
            "categories": ["NewCat"],
            "tags": [],
            "features": ["f1"],
            "pricing": {"type": "free"}
        }"#,
    )?;

    let receipt = SqlSubmissionService::new(pool.clone())
        .submit(submission)
        .await
        .map_err(|error| format!("submit: {error}"))?;

    require_eq!(count(&pool, "agents").await?, 1);
    require_eq!(count(&pool, "categories").await?, 1);
    require_eq!(count(&pool, "agent_categories").await?, 1);
    require_eq!(count(&pool, "tags").await?, 0);

    let (name, slug): (String, String) =
        sqlx::query_as("SELECT name, slug FROM categories")
            .fetch_one(&pool)
            .await
            .map_err(|error| format!("category row: {error}"))?;
    require_eq!(name.as_str(), "NewCat");
    require_eq!(slug.as_str(), "newcat");

    let linked_agent: String = sqlx::query_scalar("SELECT agent_id FROM agent_categories")
        .fetch_one(&pool)
        .await
        .map_err(|error| format!("join row: {error}"))?;
    require_eq!(linked_agent, receipt.agent_id.0);
    require_eq!(receipt.agent_id.detail_path(), format!("/agent/{}", receipt.agent_id.0));

    Ok(())
}

#[tokio::test]
async fn visible_dimensions_equal_join_rows() -> ContractResult {
    let pool = empty_store().await?;
    seed_default_categories(&pool).await.map_err(|error| format!("seed: {error}"))?;

    let submission = payload(
        r#"{
            "name": "AI Assistant Pro",
            "description": "Writes and researches",
            "shortDescription": "Assistant",
            "websiteUrl": "https://assistant.example",
            "categories": ["Writing", "Research", "Business Intelligence"],
            "tags": ["GPT", "Chrome Extension"],
            "features": ["Drafting"],
            "industries": ["Media"],
            "platforms": ["Web"],
            "pricing": {"type": "subscription", "startingPrice": "12", "currency": "USD"}
        }"#,
    )?;

    let receipt = SqlSubmissionService::new(pool.clone())
        .submit(submission)
        .await
        .map_err(|error| format!("submit: {error}"))?;

    // 15 seeded defaults plus one created on demand.
    require_eq!(count(&pool, "categories").await?, 16);
    require_eq!(receipt.created_dimensions(), 3);

    let listing = SqlListingRepository::new(pool.clone())
        .get_agent_listing(&receipt.agent_id)
        .await
        .map_err(|error| format!("listing: {error}"))?
        .ok_or_else(|| "listing should exist".to_string())?;

    require_eq!(
        listing.categories,
        vec!["Business Intelligence".to_string(), "Research".to_string(), "Writing".to_string()]
    );
    require_eq!(listing.tags, vec!["Chrome Extension".to_string(), "GPT".to_string()]);

    Ok(())
}
