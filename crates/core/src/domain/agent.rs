use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Route of the per-agent detail view the caller navigates to after a submission.
    pub fn detail_path(&self) -> String {
        format!("/agent/{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingType {
    #[default]
    Free,
    Freemium,
    Paid,
    Subscription,
    Contact,
}

impl PricingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Freemium => "freemium",
            Self::Paid => "paid",
            Self::Subscription => "subscription",
            Self::Contact => "contact",
        }
    }
}

impl FromStr for PricingType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "freemium" => Ok(Self::Freemium),
            "paid" => Ok(Self::Paid),
            "subscription" => Ok(Self::Subscription),
            "contact" => Ok(Self::Contact),
            other => Err(DomainError::UnknownPricingType { value: other.to_string() }),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(rename = "type")]
    pub pricing_type: PricingType,
    #[serde(default)]
    pub starting_price: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub pricing_url: Option<String>,
}

impl Pricing {
    pub fn of_type(pricing_type: PricingType) -> Self {
        Self { pricing_type, ..Self::default() }
    }
}

/// Column values for a new row in `agents`. The identifier is assigned by the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAgent {
    pub name: String,
    pub description: String,
    pub short_description: String,
    pub logo_url: Option<String>,
    pub website_url: String,
    pub pricing: Pricing,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub description: String,
    pub short_description: Option<String>,
    pub logo_url: Option<String>,
    pub website_url: String,
    pub pricing: Option<Pricing>,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An agent together with the category and tag names reachable through its join rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentListing {
    #[serde(flatten)]
    pub agent: Agent,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}
