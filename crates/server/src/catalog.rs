//! JSON API for listing submission and catalog reads.

use std::sync::Arc;

use agentdir_core::domain::agent::{AgentId, AgentListing};
use agentdir_core::domain::dimension::{Category, Tag};
use agentdir_core::errors::{
    ApplicationError, DomainError, InterfaceError, SubmissionError, ValidationError,
    SUBMISSION_RETRY_MESSAGE,
};
use agentdir_core::submission::form::{FormEvent, FormStep, SubmissionForm};
use agentdir_core::submission::AgentSubmission;
use agentdir_db::repositories::{ListingRepository, RepositoryError};
use agentdir_db::{DbPool, SqlListingRepository, SqlSubmissionService};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct CatalogState {
    submissions: SqlSubmissionService,
    listings: Arc<dyn ListingRepository>,
}

impl CatalogState {
    pub fn new(db_pool: DbPool) -> Self {
        Self {
            submissions: SqlSubmissionService::new(db_pool.clone()),
            listings: Arc::new(SqlListingRepository::new(db_pool)),
        }
    }
}

pub fn router(db_pool: DbPool) -> Router {
    Router::new()
        .route("/api/v1/agents", post(submit_agent))
        .route("/api/v1/agents/{id}", get(get_agent))
        .route("/api/v1/submissions/advance", post(advance_submission))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/tags", get(list_tags))
        .with_state(CatalogState::new(db_pool))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub agent_id: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub step: u8,
    #[serde(default = "default_event")]
    pub event: FormEvent,
    #[serde(default)]
    pub submission: AgentSubmission,
}

fn default_event() -> FormEvent {
    FormEvent::Next
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResponse {
    pub step: u8,
    pub title: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u8>,
    pub correlation_id: String,
}

/// Error response. `message` replaces the default user-facing text when set.
#[derive(Debug)]
pub struct ApiFailure {
    error: InterfaceError,
    message: Option<&'static str>,
}

impl ApiFailure {
    fn new(error: ApplicationError, correlation_id: &str) -> Self {
        Self { error: error.into_interface(correlation_id), message: None }
    }

    fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    fn from_repository(error: RepositoryError, operation: &'static str, correlation_id: &str) -> Self {
        warn!(
            event_name = "catalog.read.failed",
            correlation_id,
            operation,
            error = %error,
            "catalog read failed"
        );
        Self::new(ApplicationError::Persistence(error.into_persistence(operation)), correlation_id)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, step) = match &self.error {
            InterfaceError::BadRequest { step, .. } => (StatusCode::BAD_REQUEST, *step),
            InterfaceError::NotFound { .. } => (StatusCode::NOT_FOUND, None),
            InterfaceError::ServiceUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, None),
            InterfaceError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };
        let error = match self.message {
            Some(message) => message.to_string(),
            None => self.error.user_message().to_string(),
        };
        let body = ApiError {
            error,
            step,
            correlation_id: self.error.correlation_id().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn submit_agent(
    State(state): State<CatalogState>,
    Json(submission): Json<AgentSubmission>,
) -> Result<impl IntoResponse, ApiFailure> {
    let correlation_id = correlation_id();

    match state.submissions.submit(submission).await {
        Ok(receipt) => {
            let location = receipt.agent_id.detail_path();
            info!(
                event_name = "catalog.agent.submitted",
                correlation_id = %correlation_id,
                agent_id = %receipt.agent_id.0,
                "agent submission accepted"
            );
            Ok((
                StatusCode::CREATED,
                [(header::LOCATION, location.clone())],
                Json(SubmitResponse { agent_id: receipt.agent_id.0, location }),
            ))
        }
        Err(error @ SubmissionError::Validation(_)) => {
            Err(ApiFailure::new(ApplicationError::from(error), &correlation_id))
        }
        Err(error @ SubmissionError::Persistence(_)) => {
            Err(ApiFailure::new(ApplicationError::from(error), &correlation_id)
                .with_message(SUBMISSION_RETRY_MESSAGE))
        }
    }
}

async fn advance_submission(
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<AdvanceResponse>, ApiFailure> {
    let correlation_id = correlation_id();
    let step = FormStep::from_number(request.step).ok_or_else(|| {
        let error = ValidationError::field(
            "step",
            format!("Unknown form step {}; expected 1, 2 or 3", request.step),
        );
        ApiFailure::new(error.into(), &correlation_id)
    })?;

    let mut form = SubmissionForm::at_step(step, request.submission);
    let transition = form
        .apply(request.event)
        .map_err(|error| ApiFailure::new(DomainError::from(error).into(), &correlation_id))?;

    Ok(Json(AdvanceResponse {
        step: transition.to.number(),
        title: transition.to.title().to_string(),
    }))
}

async fn get_agent(
    State(state): State<CatalogState>,
    Path(id): Path<String>,
) -> Result<Json<AgentListing>, ApiFailure> {
    let correlation_id = correlation_id();
    let agent_id = AgentId(id);

    match state.listings.get_agent_listing(&agent_id).await {
        Ok(Some(listing)) => Ok(Json(listing)),
        Ok(None) => Err(ApiFailure::new(
            ApplicationError::NotFound { entity: "agent", id: agent_id.0 },
            &correlation_id,
        )),
        Err(error) => Err(ApiFailure::from_repository(error, "load agent", &correlation_id)),
    }
}

async fn list_categories(
    State(state): State<CatalogState>,
) -> Result<Json<Vec<Category>>, ApiFailure> {
    state
        .listings
        .list_categories()
        .await
        .map(Json)
        .map_err(|error| ApiFailure::from_repository(error, "list categories", &correlation_id()))
}

async fn list_tags(State(state): State<CatalogState>) -> Result<Json<Vec<Tag>>, ApiFailure> {
    state
        .listings
        .list_tags()
        .await
        .map(Json)
        .map_err(|error| ApiFailure::from_repository(error, "list tags", &correlation_id()))
}

#[cfg(test)]
mod tests {
    use agentdir_core::SUBMISSION_RETRY_MESSAGE;
    use agentdir_db::{connect_with_settings, migrations, DbPool};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::router;

    async fn setup() -> (DbPool, Router) {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        (pool.clone(), router(pool))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, location, json)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn valid_submission() -> Value {
        json!({
            "name": "AI Assistant Pro",
            "shortDescription": "General assistant",
            "description": "Writes, researches and summarizes.",
            "websiteUrl": "https://assistant.example",
            "pricing": {"type": "freemium"},
            "categories": ["Writing"],
            "tags": ["GPT"],
            "features": ["Summaries"]
        })
    }

    #[tokio::test]
    async fn submit_returns_created_with_detail_location() {
        let (_pool, app) = setup().await;

        let (status, location, body) =
            send(app.clone(), post_json("/api/v1/agents", &valid_submission())).await;

        assert_eq!(status, StatusCode::CREATED);
        let agent_id = body["agentId"].as_str().expect("agent id");
        let expected = format!("/agent/{agent_id}");
        assert_eq!(body["location"], json!(expected));
        assert_eq!(location.as_deref(), Some(expected.as_str()));

        let (status, _, detail) = send(app, get(&format!("/api/v1/agents/{agent_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["name"], json!("AI Assistant Pro"));
        assert_eq!(detail["categories"], json!(["Writing"]));
        assert_eq!(detail["tags"], json!(["GPT"]));
    }

    #[tokio::test]
    async fn submit_with_missing_category_is_bad_request_at_step_two() {
        let (pool, app) = setup().await;
        let mut payload = valid_submission();
        payload["categories"] = json!([]);

        let (status, _, body) = send(app, post_json("/api/v1/agents", &payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("At least one category is required"));
        assert_eq!(body["step"], json!(2));

        let agents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM agents")
            .fetch_one(&pool)
            .await
            .expect("count agents");
        assert_eq!(agents, 0);
    }

    #[tokio::test]
    async fn persistence_failure_returns_generic_retry_message() {
        let (pool, app) = setup().await;
        sqlx::query(
            "CREATE TRIGGER reject_tags BEFORE INSERT ON tags
             BEGIN SELECT RAISE(ABORT, 'tags are read only'); END",
        )
        .execute(&pool)
        .await
        .expect("create trigger");

        let (status, _, body) = send(app, post_json("/api/v1/agents", &valid_submission())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], json!(SUBMISSION_RETRY_MESSAGE));
        assert!(body.get("step").is_none());
        assert!(body["correlationId"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn unknown_agent_is_not_found() {
        let (_pool, app) = setup().await;

        let (status, _, body) = send(app, get("/api/v1/agents/does-not-exist")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("The requested listing was not found."));
    }

    #[tokio::test]
    async fn advance_moves_to_next_step_when_current_step_is_complete() {
        let (_pool, app) = setup().await;

        let (status, _, body) = send(
            app,
            post_json(
                "/api/v1/submissions/advance",
                &json!({"step": 1, "submission": valid_submission()}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], json!(2));
        assert_eq!(body["title"], json!("Categories & Features"));
    }

    #[tokio::test]
    async fn advance_reports_first_missing_field() {
        let (_pool, app) = setup().await;

        let (status, _, body) = send(
            app,
            post_json(
                "/api/v1/submissions/advance",
                &json!({"step": 1, "submission": {"name": "Only a name"}}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Short description is required"));
        assert_eq!(body["step"], json!(1));
    }

    #[tokio::test]
    async fn advance_back_and_unknown_step() {
        let (_pool, app) = setup().await;

        let (status, _, body) = send(
            app.clone(),
            post_json("/api/v1/submissions/advance", &json!({"step": 3, "event": "back"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], json!(2));

        let (status, _, body) =
            send(app, post_json("/api/v1/submissions/advance", &json!({"step": 9}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], json!("Unknown form step 9; expected 1, 2 or 3"));
        assert!(body.get("step").is_none());
    }

    #[tokio::test]
    async fn dimension_lists_are_sorted_by_name() {
        let (_pool, app) = setup().await;
        let mut payload = valid_submission();
        payload["categories"] = json!(["Writing", "Design"]);
        payload["tags"] = json!(["Slack", "API"]);
        let (status, _, _) = send(app.clone(), post_json("/api/v1/agents", &payload)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, categories) = send(app.clone(), get("/api/v1/categories")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(categories[0]["name"], json!("Design"));
        assert_eq!(categories[0]["description"], json!("Category for Design"));
        assert_eq!(categories[1]["slug"], json!("writing"));

        let (_, _, tags) = send(app, get("/api/v1/tags")).await;
        assert_eq!(tags[0]["name"], json!("API"));
        assert_eq!(tags[1]["name"], json!("Slack"));
    }
}
