//! Listing submissions: the form payload, its validation, and normalization into rows.

pub mod form;
pub mod normalizer;

use serde::{Deserialize, Serialize};

use crate::domain::agent::{NewAgent, Pricing};
use crate::errors::ValidationError;
use crate::submission::form::{validate_step, FormStep};

/// Payload collected by the three-step form.
///
/// Industries, platforms, integrations and languages are accepted so that
/// existing clients keep working, but nothing downstream persists them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentSubmission {
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub logo_url: Option<String>,
    pub website_url: String,
    pub pricing: Pricing,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    pub industries: Vec<String>,
    pub platforms: Vec<String>,
    pub integrations: Vec<String>,
    pub languages: Vec<String>,
}

impl AgentSubmission {
    /// Runs every step's checks in form order.
    pub fn validate(self) -> Result<ValidatedSubmission, ValidationError> {
        for step in FormStep::ALL {
            validate_step(step, &self)?;
        }
        Ok(ValidatedSubmission { inner: self })
    }

    pub fn ignored_field_count(&self) -> usize {
        self.industries.len() + self.platforms.len() + self.integrations.len() + self.languages.len()
    }
}

/// A submission that passed every step. Only obtainable through [`AgentSubmission::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedSubmission {
    inner: AgentSubmission,
}

impl ValidatedSubmission {
    pub fn submission(&self) -> &AgentSubmission {
        &self.inner
    }

    pub fn into_inner(self) -> AgentSubmission {
        self.inner
    }

    pub fn new_agent(&self) -> NewAgent {
        let submission = &self.inner;
        NewAgent {
            name: submission.name.clone(),
            description: submission.description.clone(),
            short_description: submission.short_description.clone(),
            logo_url: submission.logo_url.clone().filter(|url| !url.trim().is_empty()),
            website_url: submission.website_url.clone(),
            pricing: submission.pricing.clone(),
            features: submission.features.clone(),
        }
    }

    pub fn categories(&self) -> &[String] {
        &self.inner.categories
    }

    pub fn tags(&self) -> &[String] {
        &self.inner.tags
    }
}

#[cfg(test)]
mod tests {
    use super::AgentSubmission;
    use crate::domain::agent::PricingType;
    use crate::submission::form::FormStep;

    #[test]
    fn deserializes_camel_case_payload_with_defaults() {
        let submission: AgentSubmission = serde_json::from_str(
            r#"{
                "name": "AI Assistant Pro",
                "description": "Long form",
                "shortDescription": "Short",
                "websiteUrl": "https://assistant.example",
                "pricing": {"type": "freemium"},
                "categories": ["Productivity"],
                "features": ["Summaries"],
                "platforms": ["Web"]
            }"#,
        )
        .expect("submission payload");

        assert_eq!(submission.short_description, "Short");
        assert_eq!(submission.pricing.pricing_type, PricingType::Freemium);
        assert!(submission.tags.is_empty());
        assert_eq!(submission.logo_url, None);
        assert_eq!(submission.ignored_field_count(), 1);
    }

    #[test]
    fn validate_reports_earliest_failing_step() {
        let submission = AgentSubmission { name: "Only a name".to_string(), ..Default::default() };
        let error = submission.validate().expect_err("basic info incomplete");
        assert_eq!(error.step, Some(FormStep::BasicInfo));
        assert_eq!(error.field, "shortDescription");
    }

    #[test]
    fn blank_logo_url_is_dropped_from_new_agent() {
        let validated = AgentSubmission {
            name: "Agent".to_string(),
            description: "Desc".to_string(),
            short_description: "Short".to_string(),
            website_url: "https://agent.example".to_string(),
            logo_url: Some("  ".to_string()),
            categories: vec!["Writing".to_string()],
            features: vec!["Drafts".to_string()],
            ..Default::default()
        }
        .validate()
        .expect("valid submission");

        let agent = validated.new_agent();
        assert_eq!(agent.logo_url, None);
        assert_eq!(agent.features, vec!["Drafts".to_string()]);
        assert_eq!(validated.categories(), ["Writing".to_string()]);
    }
}
