//! IPFS URI handling and metadata lookup with gateway fallback.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::UploadError;

pub const GATEWAY_ENV: &str = "NEXT_PUBLIC_PINATA_GATEWAY";
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs/";
pub const FALLBACK_GATEWAYS: [&str; 2] = ["https://ipfs.io/ipfs/", "https://cloudflare-ipfs.com/ipfs/"];

const BUNDLED_METADATA: &str = include_str!("../assets/bundled_metadata.json");

/// Public gateway prefix used to turn `ipfs://` URIs into HTTP URLs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub gateway: String,
}

impl GatewayConfig {
    pub fn new(gateway: impl Into<String>) -> Self {
        let mut gateway = gateway.into();
        if !gateway.ends_with('/') {
            gateway.push('/');
        }
        Self { gateway }
    }

    /// `NEXT_PUBLIC_PINATA_GATEWAY`, or the public Pinata gateway
    pub fn from_env() -> Self {
        match std::env::var(GATEWAY_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Self::default(),
        }
    }

    /// HTTP URL of a CID on this gateway
    pub fn url_for(&self, cid: &str) -> String {
        format!("{}{cid}", self.gateway)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY)
    }
}

/// CID referenced by `uri`.
///
/// Accepts `ipfs://<cid>`, any gateway URL containing `/ipfs/<cid>`, or a
/// bare CID. Other URLs yield `None`.
pub fn extract_ipfs_hash(uri: &str) -> Option<String> {
    let uri = uri.trim();
    if uri.is_empty() {
        return None;
    }
    if let Some(rest) = uri.strip_prefix("ipfs://") {
        let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
        return first_segment(rest);
    }
    if let Some(index) = uri.find("/ipfs/") {
        return first_segment(&uri[index + "/ipfs/".len()..]);
    }
    if uri.contains("://") || uri.contains('/') {
        return None;
    }
    Some(uri.to_string())
}

fn first_segment(path: &str) -> Option<String> {
    let segment = path.split(['/', '?']).next().unwrap_or_default();
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

/// Replace a leading `ipfs://` with `gateway`; other URIs pass through
pub fn rewrite_ipfs_uri(uri: &str, gateway: &GatewayConfig) -> String {
    match uri.strip_prefix("ipfs://") {
        Some(rest) => gateway.url_for(rest),
        None => uri.to_string(),
    }
}

/// 32-bit `h = h * 31 + unit` over UTF-16 code units, wrapping
fn string_hash(text: &str) -> i32 {
    text.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32)
    })
}

/// Fetches one JSON document
#[async_trait]
pub trait MetadataFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, UploadError>;
}

#[async_trait]
impl<T: MetadataFetcher + ?Sized> MetadataFetcher for std::sync::Arc<T> {
    async fn fetch_json(&self, url: &str) -> Result<Value, UploadError> {
        (**self).fetch_json(url).await
    }
}

/// reqwest-backed fetcher
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[async_trait]
impl MetadataFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value, UploadError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<Value>().await?)
    }
}

/// Where a resolved document came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataSource {
    Gateway(String),
    Bundled(usize),
}

/// Resolves metadata by CID, trying each gateway in order and falling back
/// to a bundled document picked deterministically from the CID.
pub struct MetadataResolver<F: MetadataFetcher> {
    fetcher: F,
    config: GatewayConfig,
    bundled: Vec<Value>,
}

impl<F: MetadataFetcher> MetadataResolver<F> {
    pub fn new(fetcher: F, config: GatewayConfig) -> Result<Self, UploadError> {
        let bundled: Vec<Value> = serde_json::from_str(BUNDLED_METADATA)?;
        Ok(Self {
            fetcher,
            config,
            bundled,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Gateways in the order they are tried
    pub fn gateways(&self) -> Vec<String> {
        let mut gateways = vec![self.config.gateway.clone()];
        for fallback in FALLBACK_GATEWAYS {
            if !gateways.iter().any(|g| g == fallback) {
                gateways.push(fallback.to_string());
            }
        }
        gateways
    }

    /// Index into the bundled set used for `cid`
    pub fn bundled_index(&self, cid: &str) -> Option<usize> {
        if self.bundled.is_empty() {
            return None;
        }
        Some(string_hash(cid).unsigned_abs() as usize % self.bundled.len())
    }

    /// Metadata for `cid_or_url`; a full URL has its CID extracted first
    pub async fn fetch(&self, cid_or_url: &str) -> Result<(Value, MetadataSource), UploadError> {
        let cid = extract_ipfs_hash(cid_or_url)
            .ok_or_else(|| UploadError::NotFound(format!("no IPFS hash in \"{cid_or_url}\"")))?;

        for gateway in self.gateways() {
            let url = format!("{gateway}{cid}");
            debug!(%url, "trying gateway");
            match self.fetcher.fetch_json(&url).await {
                Ok(document) => return Ok((document, MetadataSource::Gateway(gateway))),
                Err(err) => warn!(%gateway, error = %err, "gateway failed"),
            }
        }

        let index = self
            .bundled_index(&cid)
            .ok_or_else(|| UploadError::NotFound(format!("metadata for {cid}")))?;
        warn!(%cid, index, "all gateways failed, using bundled metadata");
        Ok((self.bundled[index].clone(), MetadataSource::Bundled(index)))
    }

    /// Metadata document behind a token URI, with `ipfs://` in its `image`
    /// rewritten to the configured gateway
    pub async fn token_metadata(&self, token_uri: &str) -> Result<Value, UploadError> {
        if token_uri.trim().is_empty() {
            return Err(UploadError::NotFound("token URI".to_string()));
        }
        let url = rewrite_ipfs_uri(token_uri, &self.config);
        let mut document = self.fetcher.fetch_json(&url).await?;

        if let Some(image) = document.get("image").and_then(Value::as_str) {
            let rewritten = rewrite_ipfs_uri(image, &self.config);
            document["image"] = Value::String(rewritten);
        }
        info!(%url, "resolved token metadata");
        Ok(document)
    }
}
