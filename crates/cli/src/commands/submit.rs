use std::fs;
use std::path::Path;

use agentdir_core::errors::SubmissionError;
use agentdir_core::submission::AgentSubmission;
use agentdir_core::SUBMISSION_RETRY_MESSAGE;
use agentdir_db::SqlSubmissionService;

use crate::commands::{build_runtime, load_config, open_migrated_pool, CommandResult};

pub fn run(path: &Path) -> CommandResult {
    let submission = match read_submission(path) {
        Ok(submission) => submission,
        Err(message) => return CommandResult::failure("submit", "input", message, 7),
    };
    let config = match load_config("submit") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("submit") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = open_migrated_pool(&config).await?;
        let outcome = SqlSubmissionService::new(pool.clone()).submit(submission).await;
        pool.close().await;
        outcome.map_err(classify)
    });

    match result {
        Ok(receipt) => CommandResult::success(
            "submit",
            format!(
                "agent {} created with {} categories, {} tags ({} new)",
                receipt.agent_id.0,
                receipt.categories.len(),
                receipt.tags.len(),
                receipt.created_dimensions()
            ),
        ),
        Err(failure) => CommandResult::from_step("submit", failure),
    }
}

fn read_submission(path: &Path) -> Result<AgentSubmission, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read `{}`: {error}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|error| format!("`{}` is not a submission document: {error}", path.display()))
}

fn classify(error: SubmissionError) -> (&'static str, String, u8) {
    match error {
        SubmissionError::Validation(error) => {
            let message = match error.step {
                Some(step) => format!("step {} ({}): {}", step.number(), step.title(), error.message),
                None => error.message,
            };
            ("validation", message, 8)
        }
        SubmissionError::Persistence(error) => {
            ("persistence", format!("{SUBMISSION_RETRY_MESSAGE} ({error})"), 9)
        }
    }
}

#[cfg(test)]
mod tests {
    use agentdir_core::errors::{PersistenceError, SubmissionError, ValidationError};
    use agentdir_core::submission::form::FormStep;

    use super::classify;

    #[test]
    fn validation_failures_name_the_step() {
        let error = SubmissionError::Validation(ValidationError::at_step(
            FormStep::Classification,
            "categories",
            "At least one category is required",
        ));

        let (class, message, code) = classify(error);
        assert_eq!(class, "validation");
        assert_eq!(code, 8);
        assert_eq!(message, "step 2 (Categories & Features): At least one category is required");
    }

    #[test]
    fn persistence_failures_use_the_retry_message() {
        let error =
            SubmissionError::Persistence(PersistenceError::MissingIdentifier { entity: "tag" });

        let (class, message, code) = classify(error);
        assert_eq!(class, "persistence");
        assert_eq!(code, 9);
        assert!(message.starts_with("Failed to submit agent. Please try again."));
    }
}
