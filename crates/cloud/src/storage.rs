//! Supabase-compatible object storage client.
//!
//! Uploads go to `POST {base}/storage/v1/object/{bucket}/{key}`; objects in
//! a public bucket resolve at `{base}/storage/v1/object/public/{bucket}/{key}`.
//! The reference-image catalog is read with the bucket list endpoint.

use std::time::Duration;

use async_trait::async_trait;
use faceframe_core::config::{env_or, require_env};
use faceframe_core::error::CoreError;
use faceframe_core::services::{AssetUploader, UploadError};
use faceframe_core::session::Gender;
use serde::{Deserialize, Serialize};

/// Default bucket for captures and framed results.
pub const DEFAULT_IMAGES_BUCKET: &str = "phonepe_images";

/// Default bucket holding the reference images, one folder per gender.
pub const DEFAULT_CHARACTERS_BUCKET: &str = "phonepe_character_images";

/// How many reference images the catalog offers per gender.
pub const MAX_REFERENCE_IMAGES: usize = 4;

/// Extensions accepted as reference images.
const REFERENCE_EXTENSIONS: [&str; 2] = [".png", ".jpg"];

/// Upload / list request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    /// Anonymous API key, sent as both bearer token and `apikey` header.
    pub anon_key: String,
    pub images_bucket: String,
    pub characters_bucket: String,
}

impl StorageConfig {
    /// Load from the environment.
    ///
    /// | Env Var             | Default                    |
    /// |---------------------|----------------------------|
    /// | `SUPABASE_URL`      | required                   |
    /// | `SUPABASE_ANON_KEY` | required                   |
    /// | `IMAGES_BUCKET`     | `phonepe_images`           |
    /// | `CHARACTERS_BUCKET` | `phonepe_character_images` |
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            base_url: require_env("SUPABASE_URL")?,
            anon_key: require_env("SUPABASE_ANON_KEY")?,
            images_bucket: env_or("IMAGES_BUCKET", DEFAULT_IMAGES_BUCKET),
            characters_bucket: env_or("CHARACTERS_BUCKET", DEFAULT_CHARACTERS_BUCKET),
        })
    }
}

// ---------------------------------------------------------------------------
// Catalog types
// ---------------------------------------------------------------------------

/// A selectable reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceImage {
    pub url: String,
    pub name: String,
}

#[derive(Serialize)]
struct ListBody<'a> {
    prefix: &'a str,
    limit: u32,
    offset: u32,
}

#[derive(Debug, Deserialize)]
struct ListedObject {
    name: String,
}

/// Errors from catalog listing.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog request failed: {0}")]
    Request(String),

    #[error("Storage rejected catalog listing ({status}): {body}")]
    Rejected { status: u16, body: String },
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Storage client bound to one project.
pub struct SupabaseStorage {
    client: reqwest::Client,
    config: StorageConfig,
}

impl SupabaseStorage {
    pub fn new(config: StorageConfig) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CoreError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn with_client(client: reqwest::Client, config: StorageConfig) -> Self {
        Self { client, config }
    }

    /// Public URL of `key` in `bucket`.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{bucket}/{key}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn object_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{bucket}/{key}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn list_url(&self, bucket: &str) -> String {
        format!(
            "{}/storage/v1/object/list/{bucket}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.config.anon_key)
            .header("apikey", &self.config.anon_key)
    }

    /// List up to [`MAX_REFERENCE_IMAGES`] reference images for `gender`.
    ///
    /// Only `.png` and `.jpg` objects are offered.
    pub async fn reference_images(&self, gender: Gender) -> Result<Vec<ReferenceImage>, CatalogError> {
        let bucket = &self.config.characters_bucket;
        let folder = gender.as_str();

        let response = self
            .authorized(self.client.post(self.list_url(bucket)))
            .json(&ListBody {
                prefix: folder,
                limit: 100,
                offset: 0,
            })
            .send()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CatalogError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let objects: Vec<ListedObject> = response
            .json()
            .await
            .map_err(|e| CatalogError::Request(e.to_string()))?;

        Ok(select_reference_images(objects.into_iter().map(|o| o.name), |name| {
            self.public_url(bucket, &format!("{folder}/{name}"))
        }))
    }
}

/// Keep image objects only, cap the count, and resolve public URLs.
fn select_reference_images(
    names: impl IntoIterator<Item = String>,
    url_for: impl Fn(&str) -> String,
) -> Vec<ReferenceImage> {
    names
        .into_iter()
        .filter(|name| REFERENCE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
        .take(MAX_REFERENCE_IMAGES)
        .map(|name| ReferenceImage {
            url: url_for(&name),
            name,
        })
        .collect()
}

#[async_trait]
impl AssetUploader for SupabaseStorage {
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UploadError> {
        if bytes.is_empty() {
            return Err(UploadError::EmptyPayload(key.to_string()));
        }

        let bucket = &self.config.images_bucket;
        let size = bytes.len();
        let response = self
            .authorized(self.client.post(self.object_url(bucket, key)))
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(bucket = %bucket, key, size, "Asset uploaded");
        Ok(self.public_url(bucket, key))
    }
}
