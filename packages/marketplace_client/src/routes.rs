//! HTTP surface for uploads, metadata and the image cache.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::{GatewayError, UploadError};
use crate::gateway::CollectionGateway;
use crate::image_cache::{image_cache_from_env, ImageCache};
use crate::ipfs::{
    pin_metadata, today, upload_image as pin_image, Attribute, BatchResult, BatchUploader, ImageFile,
    NftMetadata, PinataClient, PinataConfig, PinningService,
};
use crate::resolver::{GatewayConfig, HttpFetcher, MetadataFetcher, MetadataResolver};

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pinning: Arc<dyn PinningService>,
    pub collection: Arc<dyn CollectionGateway>,
    pub resolver: Arc<MetadataResolver<Arc<dyn MetadataFetcher>>>,
    pub images: Arc<dyn ImageCache>,
    pub gateway: GatewayConfig,
}

impl AppState {
    /// Pinata credentials, gateway and image cache from the environment, and
    /// `collection` for token lookups
    pub fn from_env(collection: Arc<dyn CollectionGateway>) -> Result<Self, UploadError> {
        let gateway = GatewayConfig::from_env();
        let fetcher: Arc<dyn MetadataFetcher> = Arc::new(HttpFetcher::default());
        Ok(Self {
            pinning: Arc::new(PinataClient::new(PinataConfig::from_env()?)),
            collection,
            resolver: Arc::new(MetadataResolver::new(fetcher, gateway.clone())?),
            images: image_cache_from_env(),
            gateway,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ipfs/upload-image", post(upload_image))
        .route("/api/ipfs/create-nft-metadata", post(create_nft_metadata))
        .route("/api/ipfs/batch-upload", post(batch_upload))
        .route("/api/nft/metadata/:token_id", get(token_metadata))
        .route("/api/db/save-image", post(save_image))
        .route("/api/db/get-image", get(get_image))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Serve [`router`] on `addr` until the listener fails
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "marketplace api listening");
    axum::serve(listener, router(state)).await
}

fn json_error(code: StatusCode, message: &str) -> Response {
    (code, Json(json!({ "error": message }))).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub success: bool,
    pub ipfs_hash: String,
    pub image_url: String,
}

async fn upload_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some(ImageFile { name, bytes: bytes.to_vec() }),
                    Err(err) => return json_error(StatusCode::BAD_REQUEST, &err.body_text()),
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(err) => return json_error(StatusCode::BAD_REQUEST, &err.body_text()),
        }
    }
    let Some(file) = file else {
        return json_error(StatusCode::BAD_REQUEST, "No file provided");
    };

    match pin_image(state.pinning.as_ref(), file).await {
        Ok(ipfs_hash) => Json(UploadImageResponse {
            success: true,
            image_url: state.gateway.url_for(&ipfs_hash),
            ipfs_hash,
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "image upload failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Error uploading image to Pinata")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetadataRequest {
    pub image_url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Vec<Attribute>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetadataResponse {
    pub success: bool,
    pub metadata_hash: String,
    pub metadata: NftMetadata,
}

async fn create_nft_metadata(
    State(state): State<AppState>,
    Json(request): Json<CreateMetadataRequest>,
) -> Response {
    let (Some(image_url), Some(name)) = (
        request.image_url.filter(|v| !v.is_empty()),
        request.name.filter(|v| !v.is_empty()),
    ) else {
        return json_error(StatusCode::BAD_REQUEST, "Image URL and name are required");
    };

    let metadata = NftMetadata::custom(
        &name,
        request.description.as_deref(),
        &image_url,
        request.attributes,
        today(),
    );
    match pin_metadata(state.pinning.as_ref(), &metadata).await {
        Ok(metadata_hash) => Json(CreateMetadataResponse {
            success: true,
            metadata_hash,
            metadata,
        })
        .into_response(),
        Err(err) => {
            error!(error = %err, "metadata upload failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Error creating NFT metadata")
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchUploadResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<BatchResult>,
}

fn batch_failure(message: &str) -> Response {
    Json(json!({ "success": false, "error": message })).into_response()
}

async fn batch_upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut roster = None;
    let mut images = Vec::new();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return batch_failure(&err.body_text()),
        };
        let field_name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => return batch_failure(&err.body_text()),
        };
        match field_name.as_str() {
            "csvFile" => roster = Some(String::from_utf8_lossy(&bytes).into_owned()),
            "imageFiles" => images.push(ImageFile {
                name: file_name,
                bytes: bytes.to_vec(),
            }),
            _ => {}
        }
    }

    let Some(roster) = roster else {
        return batch_failure("CSV file is required");
    };
    if images.is_empty() {
        return batch_failure("At least one image is required");
    }

    let uploader = BatchUploader::new(Arc::clone(&state.pinning), state.gateway.clone());
    match uploader.upload(&roster, images, today()).await {
        Ok(results) => {
            info!(count = results.len(), "batch upload served");
            Json(BatchUploadResponse {
                success: true,
                message: format!("Processed {} NFTs", results.len()),
                results,
            })
            .into_response()
        }
        Err(err) => {
            error!(error = %err, "batch upload failed");
            batch_failure(&err.to_string())
        }
    }
}

async fn token_metadata(State(state): State<AppState>, Path(token_id): Path<String>) -> Response {
    let Ok(token_id) = token_id.parse::<u32>() else {
        return json_error(StatusCode::BAD_REQUEST, "Token ID is required");
    };

    let token_uri = match state.collection.token_uri(token_id).await {
        Ok(uri) => uri,
        Err(GatewayError::Reverted(_)) => {
            return json_error(StatusCode::NOT_FOUND, "Token does not exist or has no metadata")
        }
        Err(err) => {
            error!(token_id, error = %err, "token uri lookup failed");
            return json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };
    if token_uri.is_empty() {
        warn!(token_id, "token has no uri");
        return json_error(StatusCode::NOT_FOUND, "Token URI not found");
    }

    match state.resolver.token_metadata(&token_uri).await {
        Ok(document) => Json(document).into_response(),
        Err(err) => {
            error!(token_id, error = %err, "metadata fetch failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch metadata")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveImageRequest {
    pub wallet_address: Option<String>,
    pub metadata_hash: Option<String>,
    pub image_url: Option<String>,
}

async fn save_image(State(state): State<AppState>, Json(request): Json<SaveImageRequest>) -> Response {
    let present = |value: Option<String>| value.filter(|v| !v.is_empty());
    let (Some(wallet), Some(hash), Some(url)) = (
        present(request.wallet_address),
        present(request.metadata_hash),
        present(request.image_url),
    ) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "walletAddress, metadataHash, imageUrl are required",
        );
    };

    match state.images.save(&wallet, &hash, &url).await {
        Ok(()) => Json(json!({ "success": true })).into_response(),
        Err(err) => {
            error!(error = %err, "image cache save failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save image url to DB")
        }
    }
}

async fn get_image(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(hash) = params.get("hash").filter(|h| !h.is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "hash is required");
    };

    match state.images.get(hash).await {
        Ok(Some(image_url)) => Json(json!({ "found": true, "imageUrl": image_url })).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "found": false }))).into_response(),
        Err(err) => {
            error!(error = %err, "image cache lookup failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to get image url from DB")
        }
    }
}
