pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::{cli::LocalStorage, settings::SyncSettings, toml_config::TomlConfig, CliConfig};
pub use core::{engine::SyncEngine, pipeline::BinPipeline};
pub use domain::model::{AccessKey, PriceDocument, SyncReport, UploadReceipt};
pub use utils::error::{ErrorKind, Result, SyncError};

/// Runs one sync with already-resolved settings: loads the access key,
/// reads the document and uploads it.
pub async fn run_sync(settings: SyncSettings, storage: LocalStorage) -> Result<UploadReceipt> {
    let access_key = settings.load_access_key(&storage).await?;
    let pipeline = BinPipeline::new(storage, settings, access_key)?;
    SyncEngine::new(pipeline).run().await
}
