use std::path::Path;

use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime},
};
use time::OffsetDateTime;
use tokio::runtime::Runtime;

use crate::{
    adapters,
    model::{
        error::{ProviderError, ServiceErrorKind},
        object::{CopyReceipt, ObjectPage, ObjectSummary, WriteCondition},
    },
};

/// S3 (or S3-compatible) provider. Each call blocks on the owned runtime,
/// so the adapter must be used, and dropped, outside of an async context.
pub struct S3Adapter {
    client: aws_sdk_s3::Client,
    runtime: Runtime,
    conditional_put: bool,
    page_size: Option<i32>,
}

impl S3Adapter {
    pub fn new(client: aws_sdk_s3::Client, runtime: Runtime) -> Self {
        Self {
            client,
            runtime,
            conditional_put: true,
            page_size: None,
        }
    }

    pub fn with_conditional_put(mut self, enabled: bool) -> Self {
        self.conditional_put = enabled;
        self
    }

    /// `max-keys` for each listing request; `None` keeps the provider default.
    pub fn with_page_size(mut self, page_size: Option<i32>) -> Self {
        self.page_size = page_size;
        self
    }
}

pub fn new_runtime() -> std::io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

fn provider_error<E>(operation: &'static str, key: &str, err: SdkError<E>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::ServiceError(ctx) => ProviderError::Service {
            operation,
            key: key.to_string(),
            kind: ServiceErrorKind::classify(ctx.raw().status().as_u16(), ctx.err().code()),
            message,
        },
        _ => ProviderError::Transport {
            operation,
            key: key.to_string(),
            message,
        },
    }
}

fn to_offset_date_time(dt: &DateTime) -> Option<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(dt.as_nanos()).ok()
}

fn copy_source(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, urlencoding::encode(key))
}

impl adapters::ObjectAdapter for S3Adapter {
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectSummary>, ProviderError> {
        let req = self.client.head_object().bucket(bucket).key(key);

        let ho = match self.runtime.block_on(req.send()) {
            Err(err) => {
                if let Some(svc_err) = err.as_service_error() {
                    if svc_err.is_not_found() {
                        return Ok(None);
                    }
                }

                return Err(provider_error("head_object", key, err));
            }
            Ok(ho) => ho,
        };

        Ok(Some(ObjectSummary {
            key: key.to_string(),
            size: ho.content_length().unwrap_or(0),
            e_tag: ho.e_tag().map(str::to_string),
            last_modified: ho.last_modified().and_then(to_offset_date_time),
        }))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        condition: WriteCondition,
    ) -> Result<(), ProviderError> {
        let body = self
            .runtime
            .block_on(ByteStream::from_path(local_path))
            .map_err(|err| ProviderError::Transport {
                operation: "put_object",
                key: key.to_string(),
                message: format!("failed to read {}: {}", local_path.display(), err),
            })?;

        let mut req = self.client.put_object().bucket(bucket).key(key).body(body);
        if condition == WriteCondition::IfAbsent {
            req = req.if_none_match("*");
        }

        self.runtime
            .block_on(req.send())
            .map_err(|err| provider_error("put_object", key, err))?;

        Ok(())
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderError> {
        let req = self.client.delete_object().bucket(bucket).key(key);

        self.runtime
            .block_on(req.send())
            .map_err(|err| provider_error("delete_object", key, err))?;

        Ok(())
    }

    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<Option<CopyReceipt>, ProviderError> {
        let req = self
            .client
            .copy_object()
            .copy_source(copy_source(bucket, source_key))
            .bucket(bucket)
            .key(destination_key);

        let co = self
            .runtime
            .block_on(req.send())
            .map_err(|err| provider_error("copy_object", destination_key, err))?;

        Ok(co.copy_object_result().map(|result| CopyReceipt {
            e_tag: result.e_tag().map(str::to_string),
            last_modified: result.last_modified().and_then(to_offset_date_time),
        }))
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage, ProviderError> {
        let mut req = self.client.list_objects_v2().bucket(bucket).prefix(prefix);

        if let Some(tok) = continuation_token {
            req = req.continuation_token(tok);
        }
        if let Some(max_keys) = self.page_size {
            req = req.max_keys(max_keys);
        }

        let lo = self
            .runtime
            .block_on(req.send())
            .map_err(|err| provider_error("list_objects", prefix, err))?;

        let objects = lo
            .contents()
            .iter()
            .map(|o| ObjectSummary {
                key: o.key().unwrap_or("").to_string(),
                size: o.size().unwrap_or(0),
                e_tag: o.e_tag().map(str::to_string),
                last_modified: o.last_modified().and_then(to_offset_date_time),
            })
            .collect();

        Ok(ObjectPage {
            objects,
            next_continuation_token: lo.next_continuation_token().map(str::to_string),
        })
    }

    fn supports_conditional_put(&self) -> bool {
        self.conditional_put
    }
}
