use mongodb::bson::Bson;
use serde::{Deserialize, Deserializer, Serialize};

/// Store field names, shared by the model and the read projection.
pub const SUMMARY_FIELDS: [&str; 5] = [
    "title",
    "summary",
    "translated_summary",
    "image",
    "category",
];

/// A news item and its (optionally translated) summary, as served by `/news`.
///
/// Every field is optional: the collection has no enforced schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub translated_summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
}

/// Reads scalars as text; null and non-scalar values read as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Bson>::deserialize(deserializer)?;
    Ok(value.and_then(|bson| match bson {
        Bson::String(s) => Some(s),
        Bson::Int32(n) => Some(n.to_string()),
        Bson::Int64(n) => Some(n.to_string()),
        Bson::Double(n) => Some(n.to_string()),
        Bson::Boolean(b) => Some(b.to_string()),
        Bson::Symbol(s) => Some(s),
        _ => None,
    }))
}
