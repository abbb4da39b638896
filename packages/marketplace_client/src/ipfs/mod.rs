//! IPFS upload pipeline: pin images and metadata documents through a
//! [`PinningService`], with per-attempt timeouts, exponential backoff and
//! bounded concurrency.

mod batch;
mod metadata;
mod pinata;
mod retry;
mod roster;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::error::UploadError;
use crate::resolver::GatewayConfig;

pub use batch::{upload_in_batches, DEFAULT_BATCH_SIZE};
pub use metadata::{today, Attribute, NftMetadata, EXTERNAL_URL};
pub use pinata::{PinataClient, PinataConfig, PinningService, PINATA_API};
pub use retry::{with_retry, RetryPolicy};
pub use roster::{match_image, parse_roster, RosterRow, MAX_TRAITS};

/// An uploaded image file
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// One minted-ready entry of a batch upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub name: String,
    pub metadata_hash: String,
    pub image_url: String,
}

fn millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Pins a single image in one attempt; returns its CID
pub async fn upload_image<P>(pinning: &P, image: ImageFile) -> Result<String, UploadError>
where
    P: PinningService + ?Sized,
{
    let label = format!("NFT_Image_{}", millis());
    let policy = RetryPolicy::once(Duration::from_secs(60));
    let cid = with_retry(&policy, "pinFileToIPFS", || {
        pinning.pin_file(&image.name, image.bytes.clone(), &label)
    })
    .await?;
    info!(file = %image.name, %cid, "image pinned");
    Ok(cid)
}

/// Pins a metadata document under the JSON retry policy; returns its CID
pub async fn pin_metadata<P>(pinning: &P, metadata: &NftMetadata) -> Result<String, UploadError>
where
    P: PinningService + ?Sized,
{
    let document = serde_json::to_value(metadata)?;
    let name = format!("NFT Metadata {}", millis());
    let cid = with_retry(&RetryPolicy::json(), "pinJSONToIPFS", || {
        pinning.pin_json(&document, &name)
    })
    .await?;
    info!(name = %metadata.name, %cid, "metadata pinned");
    Ok(cid)
}

/// Batch mint preparation: a CSV roster plus its image files
pub struct BatchUploader<P: PinningService + ?Sized + 'static> {
    pinning: Arc<P>,
    gateway: GatewayConfig,
    policy: RetryPolicy,
    batch_size: usize,
}

impl<P: PinningService + ?Sized + 'static> BatchUploader<P> {
    pub fn new(pinning: Arc<P>, gateway: GatewayConfig) -> Self {
        Self {
            pinning,
            gateway,
            policy: RetryPolicy::batch(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Pin every image, then one metadata document per roster row.
    ///
    /// Fails as a whole on the first error; documents already pinned stay
    /// pinned.
    pub async fn upload(
        &self,
        roster_text: &str,
        images: Vec<ImageFile>,
        today: NaiveDate,
    ) -> Result<Vec<BatchResult>, UploadError> {
        if images.is_empty() {
            return Err(UploadError::InvalidRoster(
                "at least one image is required".to_string(),
            ));
        }
        let rows = parse_roster(roster_text)?;
        info!(images = images.len(), rows = rows.len(), "starting batch upload");

        let uploaded = upload_in_batches(images, self.batch_size, |image| {
            let pinning = Arc::clone(&self.pinning);
            let policy = self.policy.clone();
            let gateway = self.gateway.clone();
            async move {
                let label = format!("NFT_Image_{}_{}", image.name, millis());
                let cid = with_retry(&policy, "pinFileToIPFS", || {
                    pinning.pin_file(&image.name, image.bytes.clone(), &label)
                })
                .await?;
                Ok::<_, UploadError>((image.name, gateway.url_for(&cid)))
            }
        })
        .await?;
        let uploaded = Arc::new(uploaded);

        let results = upload_in_batches(rows, self.batch_size, |row| {
            let pinning = Arc::clone(&self.pinning);
            let policy = self.policy.clone();
            let uploaded = Arc::clone(&uploaded);
            async move {
                let image_url = match_image(&row.image_file, &uploaded)?.to_string();
                let document = serde_json::to_value(NftMetadata::from_row(&row, &image_url, today))?;
                let name = format!("{}-metadata.json", row.name);
                let metadata_hash = with_retry(&policy, "pinJSONToIPFS", || {
                    pinning.pin_json(&document, &name)
                })
                .await?;
                Ok::<_, UploadError>(BatchResult {
                    name: row.name,
                    metadata_hash,
                    image_url,
                })
            }
        })
        .await?;

        info!(count = results.len(), "batch upload complete");
        Ok(results)
    }
}
