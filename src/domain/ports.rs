use crate::domain::model::{PriceDocument, UploadReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::time::Duration;

/// Read access to local files. Errors keep their `io::ErrorKind` so callers
/// can tell a missing file from other read failures.
pub trait Storage: Send + Sync {
    fn read_file(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = std::io::Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn endpoint(&self) -> &str;
    fn input_path(&self) -> &str;
    fn access_key_header(&self) -> &str;
    fn timeout(&self) -> Duration;
    fn extra_headers(&self) -> &BTreeMap<String, String>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PriceDocument>;
    async fn load(&self, document: PriceDocument) -> Result<UploadReceipt>;
}
