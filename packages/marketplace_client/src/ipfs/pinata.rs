use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::UploadError;

pub const PINATA_API: &str = "https://api.pinata.cloud";
const PLACEHOLDER_KEY: &str = "your_pinata_api_key_here";
const PLACEHOLDER_SECRET: &str = "your_pinata_secret_key_here";

/// Stores content on IPFS and returns its CID. One call is one attempt;
/// retries belong to the caller.
#[async_trait]
pub trait PinningService: Send + Sync {
    /// Pin raw file bytes under the display name `label`
    async fn pin_file(&self, file_name: &str, bytes: Vec<u8>, label: &str) -> Result<String, UploadError>;
    /// Pin a JSON document under the display name `name`
    async fn pin_json(&self, document: &Value, name: &str) -> Result<String, UploadError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinataConfig {
    pub api_key: String,
    pub secret_api_key: String,
    pub api_url: String,
}

impl PinataConfig {
    /// `PINATA_API_KEY` and `PINATA_SECRET_API_KEY`
    pub fn from_env() -> Result<Self, UploadError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, UploadError> {
        let api_key = lookup("PINATA_API_KEY").unwrap_or_default();
        let secret_api_key = lookup("PINATA_SECRET_API_KEY").unwrap_or_default();
        if api_key.is_empty() || secret_api_key.is_empty() {
            return Err(UploadError::NotConfigured(
                "set PINATA_API_KEY and PINATA_SECRET_API_KEY".to_string(),
            ));
        }
        if api_key == PLACEHOLDER_KEY || secret_api_key == PLACEHOLDER_SECRET {
            return Err(UploadError::NotConfigured(
                "replace the placeholder Pinata API keys".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            secret_api_key,
            api_url: PINATA_API.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

#[derive(Debug, Clone)]
pub struct PinataClient {
    config: PinataConfig,
    client: reqwest::Client,
}

impl PinataClient {
    pub fn new(config: PinataConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn read_hash(response: reqwest::Response) -> Result<String, UploadError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "pinata rejected request");
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let parsed: PinResponse = response.json().await?;
        debug!(cid = %parsed.ipfs_hash, "pinned");
        Ok(parsed.ipfs_hash)
    }
}

#[async_trait]
impl PinningService for PinataClient {
    async fn pin_file(&self, file_name: &str, bytes: Vec<u8>, label: &str) -> Result<String, UploadError> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("pinataMetadata", json!({ "name": label }).to_string())
            .text("pinataOptions", json!({ "cidVersion": 0 }).to_string());

        let response = self
            .client
            .post(format!("{}/pinning/pinFileToIPFS", self.config.api_url))
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .multipart(form)
            .send()
            .await?;
        Self::read_hash(response).await
    }

    async fn pin_json(&self, document: &Value, name: &str) -> Result<String, UploadError> {
        let body = json!({
            "pinataContent": document,
            "pinataMetadata": { "name": name },
        });
        let response = self
            .client
            .post(format!("{}/pinning/pinJSONToIPFS", self.config.api_url))
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .json(&body)
            .send()
            .await?;
        Self::read_hash(response).await
    }
}
