use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Urgency attached to a recommendation by the upstream analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationStatus {
    NeverDone,
    Missing,
    DueSoon,
    #[default]
    Recommended,
    Urgent,
}

impl FromStr for RecommendationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "NEVER_DONE" => Ok(Self::NeverDone),
            "MISSING" => Ok(Self::Missing),
            "DUE_SOON" => Ok(Self::DueSoon),
            "RECOMMENDED" => Ok(Self::Recommended),
            "URGENT" => Ok(Self::Urgent),
            other => Err(format!("unknown recommendation status: {}", other)),
        }
    }
}

impl fmt::Display for RecommendationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NeverDone => "NEVER_DONE",
            Self::Missing => "MISSING",
            Self::DueSoon => "DUE_SOON",
            Self::Recommended => "RECOMMENDED",
            Self::Urgent => "URGENT",
        };
        f.write_str(label)
    }
}

/// A suggested health test produced by the screening analysis
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub explanation: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timeframe: String,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: RecommendationStatus,
}

impl Recommendation {
    /// Convenience constructor used by callers that only know the test name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A single measurable marker a product tests for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Biomarker {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Biomarker {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            category: None,
        }
    }
}

/// Purchasable test as returned by the catalog provider
///
/// `tags` and `biomarkers` are `None` when the catalog row carries no data
/// (or data in a shape we do not recognise); the matching strategies that
/// need them are skipped in that case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogProduct {
    #[serde(default)]
    pub id: Value,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_biomarkers")]
    pub biomarkers: Option<Vec<Biomarker>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
}

impl CatalogProduct {
    pub fn new(id: impl Into<Value>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_biomarkers(mut self, biomarkers: Vec<Biomarker>) -> Self {
        self.biomarkers = Some(biomarkers);
        self
    }

    /// Products without an explicit flag are treated as available
    pub fn is_available(&self) -> bool {
        self.available.unwrap_or(true)
    }
}

/// Which comparison produced a match score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    ExactName,
    NameContainment,
    Biomarker,
    Keyword,
    PartialKeyword,
    Tag,
}

/// Outcome of matching one recommendation against the catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub recommendation: Recommendation,
    #[serde(rename = "matchedProduct")]
    pub matched_product: Option<CatalogProduct>,
    pub score: f64,
    pub reason: String,
    pub strategy: Option<MatchStrategy>,
}

impl MatchResult {
    pub fn is_matched(&self) -> bool {
        self.matched_product.is_some()
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

fn lenient_status<'de, D>(deserializer: D) -> Result<RecommendationStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default())
}

/// Tags arrive either as a flat array or grouped as `{type, audience, features}`
fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| tags_from_value(&v)))
}

pub(crate) fn tags_from_value(value: &Value) -> Option<Vec<String>> {
    let strings = |items: &Vec<Value>| -> Vec<String> {
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect()
    };

    match value {
        Value::Array(items) => Some(strings(items)),
        Value::Object(groups) => {
            let mut tags = Vec::new();
            for group in ["type", "audience", "features"] {
                if let Some(Value::Array(items)) = groups.get(group) {
                    tags.extend(strings(items));
                }
            }
            Some(tags)
        }
        _ => None,
    }
}

/// Biomarkers arrive either as an array or wrapped as `{biomarkers: [...]}`
fn lenient_biomarkers<'de, D>(deserializer: D) -> Result<Option<Vec<Biomarker>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| biomarkers_from_value(&v)))
}

pub(crate) fn biomarkers_from_value(value: &Value) -> Option<Vec<Biomarker>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(wrapper) => match wrapper.get("biomarkers") {
            Some(Value::Array(items)) => items,
            _ => return None,
        },
        _ => return None,
    };

    Some(
        items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| match Biomarker::deserialize(item) {
                Ok(biomarker) => Some(biomarker),
                Err(e) => {
                    tracing::warn!("Skipping malformed biomarker: {}", e);
                    None
                }
            })
            .collect(),
    )
}
