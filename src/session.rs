use std::{fmt, sync::Arc};

use aws_config::retry::RetryConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use tracing::info;

use crate::{
    adapters::s3::{self, S3Adapter},
    model::error::SessionError,
    service::ObjectService,
    util,
};

/// XML API endpoint accepting S3 requests signed with GCS HMAC keys.
pub const GCS_INTEROP_ENDPOINT: &str = "https://storage.googleapis.com";

#[derive(Clone)]
pub struct SessionConfig {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub bucket: String,
    /// Custom endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// Use `If-None-Match: *` for non-overwriting uploads.
    pub conditional_writes: bool,
    pub page_size: Option<i32>,
    pub max_attempts: Option<u32>,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &"****")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .field("conditional_writes", &self.conditional_writes)
            .field("page_size", &self.page_size)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl SessionConfig {
    pub fn new(access_key: &str, secret_key: &str, region: &str, bucket: &str) -> Self {
        Self {
            access_key: access_key.to_string(),
            secret_key: secret_key.to_string(),
            region: region.to_string(),
            bucket: bucket.to_string(),
            endpoint: None,
            force_path_style: false,
            conditional_writes: true,
            page_size: None,
            max_attempts: None,
        }
    }

    pub fn build(self) -> Result<ObjectService, SessionError> {
        let credentials = Credentials::new(
            &self.access_key,
            &self.secret_key,
            None,
            None,
            "objectop-static",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(self.force_path_style);

        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint_url(endpoint);
        }
        if let Some(max_attempts) = self.max_attempts {
            builder = builder.retry_config(RetryConfig::standard().with_max_attempts(max_attempts));
        }

        let runtime = s3::new_runtime()?;
        let client = aws_sdk_s3::Client::from_conf(builder.build());
        let adapter = S3Adapter::new(client, runtime)
            .with_conditional_put(self.conditional_writes)
            .with_page_size(self.page_size);

        info!(
            bucket = %self.bucket,
            region = %self.region,
            endpoint = ?self.endpoint,
            "session built"
        );

        Ok(ObjectService::new(Arc::new(adapter), &self.bucket))
    }
}

/// Binds static credentials, region and bucket into a service handle.
///
/// Neither the credentials nor the bucket are checked here; the first
/// operation reports them.
pub fn build(
    access_key: &str,
    secret_key: &str,
    region: &str,
    bucket: &str,
) -> Result<ObjectService, SessionError> {
    SessionConfig::new(access_key, secret_key, region, bucket).build()
}

/// Builds a session from the standard AWS environment (credential chain,
/// `AWS_REGION`, profiles) for `s3://<bucket>` or `gs://<bucket>`.
pub fn from_env(bucket_uri: &str) -> Result<ObjectService, SessionError> {
    let provider = util::object::parse_provider_from_uri(bucket_uri)
        .ok_or_else(|| SessionError::BucketUri(bucket_uri.to_string()))?;
    let bucket = util::object::parse_bucket_from_uri(bucket_uri);
    if bucket.is_empty() {
        return Err(SessionError::BucketUri(bucket_uri.to_string()));
    }

    let runtime = s3::new_runtime()?;
    let sdk_config = runtime.block_on(aws_config::load_from_env());

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
    if provider.is_gcs() {
        builder = builder.endpoint_url(GCS_INTEROP_ENDPOINT);
    }

    let client = aws_sdk_s3::Client::from_conf(builder.build());
    // GCS rejects If-None-Match on the XML API
    let adapter = S3Adapter::new(client, runtime).with_conditional_put(provider.is_aws());

    info!(bucket = bucket, provider = ?provider, "session built from environment");

    Ok(ObjectService::new(Arc::new(adapter), bucket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = SessionConfig::new("AKIA", "very-secret", "us-east-1", "bucket");
        let printed = format!("{:?}", config);
        assert!(printed.contains("AKIA"));
        assert!(!printed.contains("very-secret"));
    }

    #[test]
    fn test_build_does_not_contact_provider() {
        let service = build("accessKey", "secretKey", "us-east-1", "s3BucketName").unwrap();
        assert_eq!(service.bucket(), "s3BucketName");
    }

    #[test]
    fn test_independent_sessions() {
        let first = build("a", "a", "us-east-1", "first").unwrap();
        let second = build("b", "b", "eu-west-1", "second").unwrap();
        assert_eq!(first.bucket(), "first");
        assert_eq!(second.bucket(), "second");
    }

    #[test]
    fn test_from_env_rejects_bad_uri() {
        assert!(matches!(from_env("ftp://bucket"), Err(SessionError::BucketUri(_))));
        assert!(matches!(from_env("s3://"), Err(SessionError::BucketUri(_))));
    }
}
