use crate::model::{error::OperationError, object::FolderCopyMode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    AWS,
    GCS,
}

impl Provider {
    pub fn is_aws(&self) -> bool {
        matches!(self, Provider::AWS)
    }

    pub fn is_gcs(&self) -> bool {
        matches!(self, Provider::GCS)
    }
}

pub fn parse_provider_from_uri(bucket_uri: &str) -> Option<Provider> {
    if bucket_uri.starts_with("s3://") {
        Some(Provider::AWS)
    } else if bucket_uri.starts_with("gs://") {
        Some(Provider::GCS)
    } else {
        None
    }
}

pub fn parse_bucket_from_uri(bucket_uri: &str) -> &str {
    bucket_uri
        .split_once("://")
        .map(|(_, rest)| rest.trim_end_matches('/'))
        .unwrap_or("")
}

pub fn require_key(key: &str) -> Result<(), OperationError> {
    if key.is_empty() {
        return Err(OperationError::InvalidKey {
            key: key.to_string(),
            reason: "key must not be empty",
        });
    }

    Ok(())
}

/// Last path segment of a key, ignoring a trailing `/`.
pub fn base_name(key: &str) -> &str {
    key.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Key path below `prefix`, without a leading `/`.
pub fn relative_key<'a>(prefix: &str, key: &'a str) -> &'a str {
    key.strip_prefix(prefix).unwrap_or(key).trim_start_matches('/')
}

/// Joins a prefix and a relative name with exactly one `/`.
///
/// An empty name yields the marker key `prefix/`; an empty prefix yields the name itself.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

pub fn folder_destination_key(
    source_prefix: &str,
    destination_prefix: &str,
    key: &str,
    mode: FolderCopyMode,
) -> String {
    let name = match mode {
        FolderCopyMode::Preserve => relative_key(source_prefix, key),
        FolderCopyMode::Flatten => base_name(key),
    };

    join_key(destination_prefix, name)
}
