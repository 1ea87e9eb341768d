//! CDN asset download.

use crate::config::EndpointConfig;
use crate::error::{RemoteStage, StageError, StageResult};
use crate::transport::HttpClient;
use crate::types::ItemId;

/// Download the raw ASTC asset for one item.
///
/// Only a 200 with a non-empty body counts as success.
pub async fn fetch_asset(
    client: &HttpClient,
    endpoints: &EndpointConfig,
    id: &ItemId,
) -> StageResult<Vec<u8>> {
    let url = endpoints.asset_url(id.as_str());
    tracing::trace!("GET {url}");

    let response = client.send(RemoteStage::Asset, |c| c.get(&url)).await?;
    let status = response.status().as_u16();
    if status != 200 {
        return Err(StageError::Http {
            stage: RemoteStage::Asset,
            status,
        });
    }

    let bytes = response.bytes().await.map_err(|e| StageError::Transport {
        stage: RemoteStage::Asset,
        message: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(StageError::EmptyAsset);
    }

    tracing::trace!("{id}: fetched {} bytes", bytes.len());
    Ok(bytes.to_vec())
}
