//! Conversion service upload.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER};
use reqwest::multipart::{Form, Part};

use crate::config::EndpointConfig;
use crate::error::{RemoteStage, StageError, StageResult};
use crate::transport::HttpClient;
use crate::types::ItemId;

/// Multipart field the service reads uploads from.
pub const UPLOAD_FIELD: &str = "files";

/// Content type declared for the uploaded asset.
pub const ASTC_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload an asset and return the service's raw response body.
///
/// The User-Agent comes from the worker's client; Origin and Referer are set
/// here because only the conversion service checks them.
pub async fn convert_asset(
    client: &HttpClient,
    endpoints: &EndpointConfig,
    id: &ItemId,
    asset: &[u8],
) -> StageResult<String> {
    let file_name = id.astc_file_name();
    tracing::trace!("POST {} ({file_name}, {} bytes)", endpoints.convert_url, asset.len());

    let response = client
        .send(RemoteStage::Conversion, |c| {
            c.post(&endpoints.convert_url)
                .header(ORIGIN, &endpoints.origin)
                .header(REFERER, &endpoints.referer)
                .multipart(upload_form(&file_name, asset))
        })
        .await?;

    let status = response.status().as_u16();
    if status != 200 {
        return Err(StageError::Http {
            stage: RemoteStage::Conversion,
            status,
        });
    }

    response.text().await.map_err(|e| StageError::Transport {
        stage: RemoteStage::Conversion,
        message: e.to_string(),
    })
}

/// Build the multipart form. Forms are single-use, so this runs per attempt.
fn upload_form(file_name: &str, asset: &[u8]) -> Form {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(ASTC_CONTENT_TYPE));
    let part = Part::bytes(asset.to_vec())
        .file_name(file_name.to_string())
        .headers(headers);
    Form::new().part(UPLOAD_FIELD, part)
}
