use crate::core::{Pipeline, UploadReceipt};
use crate::utils::error::Result;

/// Runs a pipeline once: extract, then load. There is no retry; a failed
/// run is recovered by running again, which is safe because the upload is a
/// full replace.
pub struct SyncEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> SyncEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<UploadReceipt> {
        tracing::info!("Starting sync");

        // Extract
        let document = self.pipeline.extract().await.inspect_err(|e| {
            tracing::error!("Local input rejected: {}", e);
        })?;

        // Load
        let receipt = self.pipeline.load(document).await.inspect_err(|e| {
            tracing::error!("Upload failed ({:?}): {}", e.kind(), e);
        })?;

        tracing::info!("Bin updated with status {}", receipt.status);
        Ok(receipt)
    }
}
