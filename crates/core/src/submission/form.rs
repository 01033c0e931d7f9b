//! Three-step listing submission form.
//!
//! Steps progress linearly: basic info, then categories and features, then
//! additional details. Moving forward is guarded by the validation predicate
//! of the step being left; moving back is always allowed except from the
//! first step.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ValidationError;
use crate::submission::{AgentSubmission, ValidatedSubmission};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_SHORT_DESCRIPTION_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 2000;
pub const MAX_CURRENCY_CHARS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStep {
    BasicInfo,
    Classification,
    AdditionalDetails,
}

impl FormStep {
    pub const ALL: [FormStep; 3] =
        [FormStep::BasicInfo, FormStep::Classification, FormStep::AdditionalDetails];

    pub fn number(&self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::Classification => 2,
            Self::AdditionalDetails => 3,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::BasicInfo),
            2 => Some(Self::Classification),
            3 => Some(Self::AdditionalDetails),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Classification => "Categories & Features",
            Self::AdditionalDetails => "Additional Details",
        }
    }

    fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn previous(&self) -> Option<Self> {
        Self::from_number(self.number() - 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormEvent {
    Next,
    Back,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepTransition {
    pub from: FormStep,
    pub to: FormStep,
    pub event: FormEvent,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormTransitionError {
    #[error(transparent)]
    StepIncomplete(#[from] ValidationError),
    #[error("invalid form transition from {step:?} using event {event:?}")]
    InvalidTransition { step: FormStep, event: FormEvent },
    #[error("submission is only possible from the final step, current step is {step:?}")]
    NotOnFinalStep { step: FormStep },
}

/// Checks the fields owned by `step`, returning the first failure in form order.
pub fn validate_step(step: FormStep, submission: &AgentSubmission) -> Result<(), ValidationError> {
    match step {
        FormStep::BasicInfo => validate_basic_info(submission),
        FormStep::Classification => validate_classification(submission),
        FormStep::AdditionalDetails => Ok(()),
    }
}

fn validate_basic_info(submission: &AgentSubmission) -> Result<(), ValidationError> {
    let step = FormStep::BasicInfo;
    let required = [
        ("name", &submission.name, "Agent name is required"),
        ("shortDescription", &submission.short_description, "Short description is required"),
        ("description", &submission.description, "Description is required"),
        ("websiteUrl", &submission.website_url, "Website URL is required"),
    ];
    for (field, value, message) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::at_step(step, field, message));
        }
    }

    let limits = [
        ("name", &submission.name, MAX_NAME_CHARS, "Agent name"),
        (
            "shortDescription",
            &submission.short_description,
            MAX_SHORT_DESCRIPTION_CHARS,
            "Short description",
        ),
        ("description", &submission.description, MAX_DESCRIPTION_CHARS, "Description"),
    ];
    for (field, value, max, label) in limits {
        if value.chars().count() > max {
            return Err(ValidationError::at_step(
                step,
                field,
                format!("{label} must be at most {max} characters"),
            ));
        }
    }

    let pricing = &submission.pricing;
    if pricing.starting_price.is_some_and(|price| price.is_sign_negative()) {
        return Err(ValidationError::at_step(
            step,
            "pricing.startingPrice",
            "Starting price cannot be negative",
        ));
    }
    if pricing.currency.as_ref().is_some_and(|currency| currency.chars().count() > MAX_CURRENCY_CHARS)
    {
        return Err(ValidationError::at_step(
            step,
            "pricing.currency",
            format!("Currency must be at most {MAX_CURRENCY_CHARS} characters"),
        ));
    }

    Ok(())
}

fn validate_classification(submission: &AgentSubmission) -> Result<(), ValidationError> {
    let step = FormStep::Classification;
    if submission.categories.is_empty() {
        return Err(ValidationError::at_step(
            step,
            "categories",
            "At least one category is required",
        ));
    }
    if submission.features.is_empty() {
        return Err(ValidationError::at_step(step, "features", "At least one feature is required"));
    }
    if submission.categories.iter().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::at_step(step, "categories", "Category names cannot be blank"));
    }
    if submission.tags.iter().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::at_step(step, "tags", "Tag names cannot be blank"));
    }
    Ok(())
}

fn transition(
    current: FormStep,
    event: FormEvent,
    submission: &AgentSubmission,
) -> Result<StepTransition, FormTransitionError> {
    let to = match event {
        FormEvent::Next => {
            let next = current
                .next()
                .ok_or(FormTransitionError::InvalidTransition { step: current, event })?;
            validate_step(current, submission)?;
            next
        }
        FormEvent::Back => current
            .previous()
            .ok_or(FormTransitionError::InvalidTransition { step: current, event })?,
    };

    Ok(StepTransition { from: current, to, event })
}

/// Form state: the current step plus the submission being edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionForm {
    step: FormStep,
    submission: AgentSubmission,
}

impl SubmissionForm {
    pub fn new(submission: AgentSubmission) -> Self {
        Self { step: FormStep::BasicInfo, submission }
    }

    /// Resumes a form at `step`, as a stateless caller does when it echoes the step back.
    pub fn at_step(step: FormStep, submission: AgentSubmission) -> Self {
        Self { step, submission }
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn submission(&self) -> &AgentSubmission {
        &self.submission
    }

    pub fn submission_mut(&mut self) -> &mut AgentSubmission {
        &mut self.submission
    }

    pub fn apply(&mut self, event: FormEvent) -> Result<StepTransition, FormTransitionError> {
        let outcome = transition(self.step, event, &self.submission)?;
        self.step = outcome.to;
        Ok(outcome)
    }

    /// Validates every step and hands back a submission ready for persistence.
    pub fn submit(&self) -> Result<ValidatedSubmission, FormTransitionError> {
        if self.step != FormStep::AdditionalDetails {
            return Err(FormTransitionError::NotOnFinalStep { step: self.step });
        }
        Ok(self.submission.clone().validate()?)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{
        validate_step, FormEvent, FormStep, FormTransitionError, SubmissionForm, MAX_NAME_CHARS,
    };
    use crate::submission::AgentSubmission;

    fn complete_submission() -> AgentSubmission {
        AgentSubmission {
            name: "AI Assistant Pro".to_string(),
            short_description: "A helpful assistant".to_string(),
            description: "Helps with writing, research and analysis.".to_string(),
            website_url: "https://assistant.example".to_string(),
            categories: vec!["Productivity".to_string()],
            features: vec!["Natural language understanding".to_string()],
            ..AgentSubmission::default()
        }
    }

    #[test]
    fn happy_path_walks_all_three_steps() {
        let mut form = SubmissionForm::new(complete_submission());
        assert_eq!(form.step(), FormStep::BasicInfo);

        let first = form.apply(FormEvent::Next).expect("basic info -> classification");
        assert_eq!(first.to, FormStep::Classification);
        let second = form.apply(FormEvent::Next).expect("classification -> details");
        assert_eq!(second.to, FormStep::AdditionalDetails);

        let validated = form.submit().expect("final step submits");
        assert_eq!(validated.submission().name, "AI Assistant Pro");
    }

    #[test]
    fn next_is_blocked_by_first_missing_basic_field() {
        let mut form = SubmissionForm::new(AgentSubmission {
            name: "Named".to_string(),
            ..AgentSubmission::default()
        });

        let error = form.apply(FormEvent::Next).expect_err("short description missing");
        assert!(matches!(
            error,
            FormTransitionError::StepIncomplete(ref validation)
                if validation.message == "Short description is required"
                    && validation.step == Some(FormStep::BasicInfo)
        ));
        assert_eq!(form.step(), FormStep::BasicInfo, "a failed transition keeps the step");
    }

    #[test]
    fn classification_requires_category_then_feature() {
        let mut submission = complete_submission();
        submission.categories.clear();
        submission.features.clear();
        let error = validate_step(FormStep::Classification, &submission).expect_err("no category");
        assert_eq!(error.message, "At least one category is required");

        submission.categories.push("Writing".to_string());
        let error = validate_step(FormStep::Classification, &submission).expect_err("no feature");
        assert_eq!(error.message, "At least one feature is required");
    }

    #[test]
    fn additional_details_has_no_required_fields() {
        assert!(validate_step(FormStep::AdditionalDetails, &AgentSubmission::default()).is_ok());
    }

    #[test]
    fn back_is_unguarded_but_not_allowed_from_first_step() {
        let mut form = SubmissionForm::at_step(FormStep::Classification, AgentSubmission::default());
        let outcome = form.apply(FormEvent::Back).expect("classification -> basic info");
        assert_eq!(outcome.to, FormStep::BasicInfo);

        let error = form.apply(FormEvent::Back).expect_err("no step before the first");
        assert_eq!(
            error,
            FormTransitionError::InvalidTransition {
                step: FormStep::BasicInfo,
                event: FormEvent::Back
            }
        );
    }

    #[test]
    fn next_from_final_step_is_invalid() {
        let mut form = SubmissionForm::at_step(FormStep::AdditionalDetails, complete_submission());
        let error = form.apply(FormEvent::Next).expect_err("final step has no successor");
        assert!(matches!(error, FormTransitionError::InvalidTransition { .. }));
    }

    #[test]
    fn submit_before_final_step_is_rejected() {
        let form = SubmissionForm::new(complete_submission());
        assert_eq!(
            form.submit(),
            Err(FormTransitionError::NotOnFinalStep { step: FormStep::BasicInfo })
        );
    }

    #[test]
    fn submit_revalidates_earlier_steps() {
        let mut form = SubmissionForm::at_step(FormStep::AdditionalDetails, complete_submission());
        form.submission_mut().website_url = "   ".to_string();

        let error = form.submit().expect_err("website cleared after step 1");
        assert!(matches!(
            error,
            FormTransitionError::StepIncomplete(ref validation)
                if validation.message == "Website URL is required"
        ));
    }

    #[test]
    fn field_limits_follow_the_form() {
        let mut submission = complete_submission();
        submission.name = "x".repeat(MAX_NAME_CHARS + 1);
        let error = validate_step(FormStep::BasicInfo, &submission).expect_err("name too long");
        assert_eq!(error.message, "Agent name must be at most 100 characters");

        let mut submission = complete_submission();
        submission.pricing.starting_price = Some(Decimal::new(-100, 2));
        let error = validate_step(FormStep::BasicInfo, &submission).expect_err("negative price");
        assert_eq!(error.field, "pricing.startingPrice");

        let mut submission = complete_submission();
        submission.pricing.currency = Some("EURO".to_string());
        let error = validate_step(FormStep::BasicInfo, &submission).expect_err("long currency");
        assert_eq!(error.field, "pricing.currency");
    }

    #[test]
    fn blank_dimension_names_are_rejected() {
        let mut submission = complete_submission();
        submission.tags = vec!["GPT".to_string(), " ".to_string()];
        let error = validate_step(FormStep::Classification, &submission).expect_err("blank tag");
        assert_eq!(error.message, "Tag names cannot be blank");
    }

    #[test]
    fn step_numbers_round_trip() {
        for step in FormStep::ALL {
            assert_eq!(FormStep::from_number(step.number()), Some(step));
        }
        assert_eq!(FormStep::from_number(0), None);
        assert_eq!(FormStep::from_number(4), None);
        assert_eq!(FormStep::Classification.title(), "Categories & Features");
    }
}
