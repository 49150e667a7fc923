//! Prismic REST API payloads

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::CmsResult;

/// `GET {endpoint}` - repository description
#[derive(Debug, Clone, Deserialize)]
pub struct ApiInfo {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

/// A content release reference
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master_ref: bool,
}

impl ApiInfo {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference.as_str())
    }
}

/// `GET {endpoint}/documents/search` - one page of documents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: u32,
    #[serde(default)]
    pub total_results_size: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    #[serde(default)]
    pub results: Vec<Document>,
}

/// A CMS document with its custom-type fields kept as raw JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default, with = "prismic_date")]
    pub first_publication_date: Option<DateTime<Utc>>,
    #[serde(default, with = "prismic_date")]
    pub last_publication_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// Decode the `data` object into a typed struct
    pub fn data_as<T: DeserializeOwned>(&self) -> CmsResult<T> {
        Ok(T::deserialize(&self.data)?)
    }
}

/// Prismic timestamps look like `2021-03-15T19:25:28+0000`
pub mod prismic_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_str(s, FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(s))
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(d) => serializer.serialize_str(&d.format("%Y-%m-%dT%H:%M:%S%z").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}
