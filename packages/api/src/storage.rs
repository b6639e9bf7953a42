//! Object storage for [`SupabaseClient`].

use reqwest::Method;
use serde_json::json;
use store::{BlobStore, StoreError};

use crate::client::{send, SupabaseClient};

impl BlobStore for SupabaseClient {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StoreError> {
        let request = self
            .request(Method::POST, &format!("/storage/v1/object/{bucket}/{path}"))?
            .header("Content-Type", content_type)
            .header("x-upsert", if upsert { "true" } else { "false" })
            .body(bytes);
        send(request).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        let base = self.config().map(|c| c.url.as_str()).unwrap_or_default();
        format!("{base}/storage/v1/object/public/{bucket}/{path}")
    }

    async fn remove(&self, bucket: &str, paths: Vec<String>) -> Result<(), StoreError> {
        if paths.is_empty() {
            return Ok(());
        }
        let request = self
            .request(Method::DELETE, &format!("/storage/v1/object/{bucket}"))?
            .json(&json!({ "prefixes": paths }));
        send(request).await?;
        Ok(())
    }
}
