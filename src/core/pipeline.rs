use crate::core::{ConfigProvider, Pipeline, PriceDocument, Storage, UploadReceipt};
use crate::domain::model::AccessKey;
use crate::utils::error::{Result, SyncError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

/// Reads the local document and replaces the remote bin with it.
pub struct BinPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    access_key: AccessKey,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> BinPipeline<S, C> {
    pub fn new(storage: S, config: C, access_key: AccessKey) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| SyncError::ConfigError {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            storage,
            config,
            access_key,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BinPipeline<S, C> {
    async fn extract(&self) -> Result<PriceDocument> {
        let path = self.config.input_path();

        let bytes = self.storage.read_file(path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SyncError::InputNotFoundError {
                    path: path.to_string(),
                }
            } else {
                SyncError::InputReadError {
                    path: path.to_string(),
                    source,
                }
            }
        })?;

        // 非 UTF-8 視為讀取錯誤，而不是 JSON 格式錯誤
        if let Err(e) = std::str::from_utf8(&bytes) {
            return Err(SyncError::InputReadError {
                path: path.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            });
        }

        let document = PriceDocument::from_slice(path, &bytes)?;
        tracing::debug!("Parsed {} ({} bytes)", path, bytes.len());
        Ok(document)
    }

    async fn load(&self, document: PriceDocument) -> Result<UploadReceipt> {
        let endpoint = self.config.endpoint();
        tracing::info!("Attempting to update JSON bin at: {}", endpoint);

        let mut request = self
            .client
            .put(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(self.config.access_key_header(), self.access_key.expose());

        for (name, value) in self.config.extra_headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .json(document.value())
            .send()
            .await
            .map_err(SyncError::from_transport)?;

        let status = response.status();
        tracing::debug!("Bin response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable response body: {}>", e));
            tracing::warn!("Bin rejected the update with status {}", status);
            return Err(SyncError::HttpStatusError {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(SyncError::from_transport)?;
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| SyncError::UnexpectedError {
                message: format!(
                    "bin accepted the update with status {} but replied with non-JSON content: {}",
                    status, e
                ),
            })?
        };

        Ok(UploadReceipt {
            status: status.as_u16(),
            response: body,
        })
    }
}
