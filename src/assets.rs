//! Placeholder images for the verification step's file inputs.

use crate::browser::FilePayload;
use crate::identity::{file_name, AssetKind};
use std::time::Duration;

/// Smallest well-formed JPEG (SOI, JFIF APP0, EOI), used when a download fails.
pub const FALLBACK_JPEG: [u8; 22] = [
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x01, 0x00,
    0x48, 0x00, 0x48, 0x00, 0x00, 0xFF, 0xD9,
];

pub const JPEG_MIME: &str = "image/jpeg";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub struct AssetFetcher {
    http: reqwest::Client,
}

impl AssetFetcher {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http }
    }

    /// Download `url`; any failure or non-2xx status yields [`FALLBACK_JPEG`].
    pub async fn fetch(&self, url: &str) -> Vec<u8> {
        match self.try_fetch(url).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                tracing::warn!("Empty image body from {}, using fallback buffer", url);
                FALLBACK_JPEG.to_vec()
            }
            Err(e) => {
                tracing::warn!("Failed to download image from {}: {}, using fallback buffer", url, e);
                FALLBACK_JPEG.to_vec()
            }
        }
    }

    async fn try_fetch(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Named JPEG attachment for `kind`, sourced from `url`.
    pub async fn attachment(&self, kind: AssetKind, url: &str) -> FilePayload {
        FilePayload {
            name: format!("{}.jpg", file_name(kind)),
            mime_type: JPEG_MIME.to_string(),
            bytes: self.fetch(url).await,
        }
    }
}

impl Default for AssetFetcher {
    fn default() -> Self {
        Self::new()
    }
}
