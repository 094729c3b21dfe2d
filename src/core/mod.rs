pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{PriceDocument, UploadReceipt};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
