//! Listing records and the display cards made from them

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ListingRecordError, Loaded};
use crate::helpers::is_external;

/// Accept any scalar as text, so `title: 2048` reads as "2048"
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// A listing record as written in a data file, before validation
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawListingRecord {
    #[serde(deserialize_with = "scalar_string")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub description: Option<String>,
    #[serde(deserialize_with = "scalar_string")]
    pub href: Option<String>,
    #[serde(rename = "imgSrc", alias = "img_src", deserialize_with = "scalar_string")]
    pub img_src: Option<String>,
}

impl RawListingRecord {
    /// Read the record at `index` from its parsed data-file value
    pub fn from_value(index: usize, value: serde_json::Value) -> Result<Self, ListingRecordError> {
        serde_json::from_value(value).map_err(|e| ListingRecordError::Malformed {
            index,
            reason: e.to_string(),
        })
    }
}

/// A validated listing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(rename = "imgSrc", default, skip_serializing_if = "Option::is_none")]
    pub img_src: Option<String>,
}

impl ListingRecord {
    /// Check mandatory fields of the record at `index`
    pub fn validate(index: usize, raw: RawListingRecord) -> Result<Self, ListingRecordError> {
        let missing = |field| ListingRecordError::MissingField { index, field };
        let title = non_blank(raw.title).ok_or_else(|| missing("title"))?;
        let description = non_blank(raw.description).ok_or_else(|| missing("description"))?;

        Ok(Self {
            title,
            description,
            href: non_blank(raw.href),
            img_src: non_blank(raw.img_src),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Validate records in order, skipping (and reporting) the invalid ones
///
/// Each element is read on its own, so a record of the wrong shape only
/// costs that record.
pub fn validate_records(listing: &str, raw: Vec<serde_json::Value>) -> Loaded<ListingRecord> {
    let mut loaded = Loaded::new();
    for (index, value) in raw.into_iter().enumerate() {
        loaded.push(
            format!("{}[{}]", listing, index),
            RawListingRecord::from_value(index, value)
                .and_then(|record| ListingRecord::validate(index, record)),
        );
    }
    loaded
}

/// One display unit of a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub description: String,
    pub href: Option<String>,
    pub img_src: Option<String>,
    /// The card is clickable
    pub linked: bool,
    /// The link leaves the site
    pub external: bool,
}

impl From<&ListingRecord> for Card {
    fn from(record: &ListingRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            href: record.href.clone(),
            img_src: record.img_src.clone(),
            linked: record.href.is_some(),
            external: record.href.as_deref().map(is_external).unwrap_or(false),
        }
    }
}
