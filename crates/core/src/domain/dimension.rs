use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Normalized lookup tables an agent is associated with through join rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    Category,
    Tag,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Tag => "tag",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionId(pub String);

/// Column values for a dimension row created on demand by a submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewDimension {
    pub kind: DimensionKind,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

impl NewDimension {
    pub fn for_name(kind: DimensionKind, name: &str) -> Self {
        let description = match kind {
            DimensionKind::Category => Some(format!("Category for {name}")),
            DimensionKind::Tag => None,
        };
        Self { kind, name: name.to_string(), slug: slugify(name), description }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: DimensionId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub parent_id: Option<DimensionId>,
    pub icon_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: DimensionId,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// Lowercases `name` and collapses every run of whitespace into a single hyphen.
///
/// Leading and trailing whitespace are not trimmed; they become hyphens like any other run.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                slug.push('-');
            }
            in_whitespace = true;
        } else {
            slug.push(ch);
            in_whitespace = false;
        }
    }

    slug
}
