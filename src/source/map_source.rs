use async_trait::async_trait;

use crate::error::AppError;

/// Somewhere the raw map payload can be read from, once.
#[async_trait]
pub trait MapSource: Send + Sync {
    /// Human readable location, used in logs and errors.
    fn name(&self) -> String;

    async fn fetch(&self) -> Result<Vec<u8>, AppError>;
}
