use std::path::Path;

use crate::model::{
    error::ProviderError,
    object::{CopyReceipt, ObjectPage, ObjectSummary, WriteCondition},
};

pub mod memory;
pub mod s3;

/// Blocking calls against an object storage provider.
pub trait ObjectAdapter: Send + Sync {
    /// `Ok(None)` only when the provider confirms the key does not exist.
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectSummary>, ProviderError>;

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        condition: WriteCondition,
    ) -> Result<(), ProviderError>;

    /// Deleting an absent key succeeds.
    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderError>;

    /// `Ok(None)` when the provider acknowledged the copy without a result.
    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<Option<CopyReceipt>, ProviderError>;

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage, ProviderError>;

    /// Whether `WriteCondition::IfAbsent` is enforced by the provider.
    fn supports_conditional_put(&self) -> bool {
        false
    }
}
