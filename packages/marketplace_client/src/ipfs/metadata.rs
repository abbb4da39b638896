use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::roster::RosterRow;

pub const EXTERNAL_URL: &str = "https://your-nft-collection.com";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: Value,
}

impl Attribute {
    pub fn new(trait_type: &str, value: impl Into<Value>) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: value.into(),
        }
    }

    /// `Created = YYYY-MM-DD`
    pub fn created(date: NaiveDate) -> Self {
        Self::new("Created", date.format("%Y-%m-%d").to_string())
    }
}

/// ERC-721 style metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

fn default_description(name: &str) -> String {
    format!("Custom NFT: {name}")
}

impl NftMetadata {
    /// Document for one batch roster row
    pub fn from_row(row: &RosterRow, image_url: &str, today: NaiveDate) -> Self {
        let mut attributes: Vec<Attribute> = row
            .traits
            .iter()
            .map(|(trait_type, value)| Attribute::new(trait_type, value.as_str()))
            .collect();
        attributes.push(Attribute::new("Batch Upload", "Excel Import"));
        attributes.push(Attribute::created(today));

        Self {
            name: row.name.clone(),
            description: row
                .description
                .clone()
                .unwrap_or_else(|| default_description(&row.name)),
            image: image_url.to_string(),
            external_url: None,
            attributes,
        }
    }

    /// Document for a single custom upload
    pub fn custom(
        name: &str,
        description: Option<&str>,
        image_url: &str,
        attributes: Option<Vec<Attribute>>,
        today: NaiveDate,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| default_description(name)),
            image: image_url.to_string(),
            external_url: Some(EXTERNAL_URL.to_string()),
            attributes: attributes.unwrap_or_else(|| {
                vec![Attribute::new("Type", "Custom Upload"), Attribute::created(today)]
            }),
        }
    }
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
