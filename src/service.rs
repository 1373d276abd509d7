use std::{path::Path, sync::Arc};

use tracing::{error, info, span, warn, Level};

use crate::{
    adapters,
    model::{
        error::{OperationError, ProviderError},
        object::{CopyReceipt, Existence, FolderCopyMode, FolderReport, ObjectSummary, WriteCondition},
    },
    util::object::{folder_destination_key, require_key},
};

/// Caller-owned handle binding a provider to one bucket.
///
/// Clones share the provider; distinct handles are fully independent.
/// Check-then-act sequences (non-overwriting copy, and non-overwriting
/// upload on providers without conditional puts) are not atomic.
#[derive(Clone)]
pub struct ObjectService {
    client: Arc<dyn adapters::ObjectAdapter>,
    bucket: String,
    folder_copy: FolderCopyMode,
}

impl ObjectService {
    pub fn new(client: Arc<dyn adapters::ObjectAdapter>, bucket: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            folder_copy: FolderCopyMode::default(),
        }
    }

    /// Key mapping used by [`ObjectService::copy_folder`].
    pub fn with_folder_copy(mut self, mode: FolderCopyMode) -> Self {
        self.folder_copy = mode;
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn exists(&self, key: &str) -> Result<Existence, ProviderError> {
        match self.client.head_object(&self.bucket, key) {
            Ok(Some(summary)) => Ok(Existence::Present(summary)),
            Ok(None) => Ok(Existence::Absent),
            Err(err) if err.is_not_found() => Ok(Existence::Absent),
            Err(err) => Err(err),
        }
    }

    /// Boolean collapse of [`ObjectService::exists`]; a failed check reads as absent.
    pub fn is_present(&self, key: &str) -> bool {
        match self.exists(key) {
            Ok(existence) => existence.is_present(),
            Err(err) => {
                warn!(key = key, error_message = %err, error_group = "head_object");
                false
            }
        }
    }

    /// Uploads `local_path` to `key`.
    ///
    /// With `overwrite == false` an existing object is left untouched and
    /// `AlreadyExists` is returned. Providers with conditional puts enforce
    /// this atomically; otherwise an existence check precedes the put.
    pub fn upload_file(
        &self,
        local_path: impl AsRef<Path>,
        key: &str,
        overwrite: bool,
    ) -> Result<(), OperationError> {
        let local_path = local_path.as_ref();
        let span = span!(Level::INFO, "upload_file", context = "upload_file");
        let _e = span.enter();
        info!(local_path = %local_path.display(), key = key, overwrite = overwrite, "called");

        let result = self.try_upload_file(local_path, key, overwrite);
        if let Err(err) = &result {
            error!(error_message = %err, error_group = "put_object");
        }

        result
    }

    fn try_upload_file(&self, local_path: &Path, key: &str, overwrite: bool) -> Result<(), OperationError> {
        require_key(key)?;

        if overwrite {
            self.client
                .put_object(&self.bucket, key, local_path, WriteCondition::Overwrite)?;
            return Ok(());
        }

        if self.client.supports_conditional_put() {
            return match self
                .client
                .put_object(&self.bucket, key, local_path, WriteCondition::IfAbsent)
            {
                Err(err) if err.is_precondition_failed() => Err(OperationError::AlreadyExists {
                    key: key.to_string(),
                }),
                other => other.map_err(OperationError::from),
            };
        }

        self.require_absent(key)?;
        self.client
            .put_object(&self.bucket, key, local_path, WriteCondition::Overwrite)?;

        Ok(())
    }

    /// Deletes an existing object; an absent key is reported as `NotFound`.
    pub fn delete_file(&self, key: &str) -> Result<(), OperationError> {
        let span = span!(Level::INFO, "delete_file", context = "delete_file");
        let _e = span.enter();
        info!(key = key, "called");

        let result = self.try_delete_file(key);
        if let Err(err) = &result {
            error!(error_message = %err, error_group = "delete_object");
        }

        result
    }

    fn try_delete_file(&self, key: &str) -> Result<(), OperationError> {
        require_key(key)?;

        let summary = self.resolve(key)?;
        self.client.delete_object(&self.bucket, &summary.key)?;

        Ok(())
    }

    /// Copies `source` to `destination` within the bucket.
    ///
    /// With `overwrite == false` an existing destination is left untouched
    /// and `AlreadyExists` is returned.
    pub fn copy_file(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<CopyReceipt, OperationError> {
        let span = span!(Level::INFO, "copy_file", context = "copy_file");
        let _e = span.enter();
        info!(source = source, destination = destination, overwrite = overwrite, "called");

        let result = self.try_copy_file(source, destination, overwrite);
        if let Err(err) = &result {
            error!(error_message = %err, error_group = "copy_object");
        }

        result
    }

    fn try_copy_file(
        &self,
        source: &str,
        destination: &str,
        overwrite: bool,
    ) -> Result<CopyReceipt, OperationError> {
        require_key(source)?;
        require_key(destination)?;

        if !overwrite {
            self.require_absent(destination)?;
        }

        let summary = self.resolve(source)?;
        self.copy_listed(&summary.key, destination)
    }

    /// Deletes every object under `prefix`, then the marker key equal to `prefix`.
    ///
    /// The first failure stops the loop; objects deleted before it stay deleted.
    pub fn delete_folder(&self, prefix: &str) -> Result<FolderReport, OperationError> {
        let span = span!(Level::INFO, "delete_folder", context = "delete_folder");
        let _e = span.enter();
        info!(prefix = prefix, "called");

        let result = self.try_delete_folder(prefix);
        match &result {
            Ok(report) => info!(prefix = prefix, deleted = report.keys.len(), "done"),
            Err(err) => error!(error_message = %err, error_group = "delete_folder"),
        }

        result
    }

    fn try_delete_folder(&self, prefix: &str) -> Result<FolderReport, OperationError> {
        if prefix.is_empty() {
            return Err(OperationError::InvalidKey {
                key: prefix.to_string(),
                reason: "folder prefix must not be empty",
            });
        }

        let incomplete = |completed: usize, err: OperationError| OperationError::FolderIncomplete {
            operation: "delete_folder",
            prefix: prefix.to_string(),
            completed,
            source: Box::new(err),
        };

        let mut keys: Vec<String> = self
            .list_all(prefix)
            .map_err(|err| incomplete(0, err.into()))?
            .into_iter()
            .map(|o| o.key)
            .collect();

        if !keys.iter().any(|k| k == prefix) {
            keys.push(prefix.to_string());
        }

        for (completed, key) in keys.iter().enumerate() {
            self.client
                .delete_object(&self.bucket, key)
                .map_err(|err| incomplete(completed, err.into()))?;
        }

        Ok(FolderReport {
            prefix: prefix.to_string(),
            keys,
        })
    }

    /// Copies every object under `source_prefix` below `destination_prefix`
    /// using the handle's [`FolderCopyMode`]. Existing destinations are overwritten.
    pub fn copy_folder(
        &self,
        source_prefix: &str,
        destination_prefix: &str,
    ) -> Result<FolderReport, OperationError> {
        self.copy_folder_with(source_prefix, destination_prefix, self.folder_copy)
    }

    pub fn copy_folder_with(
        &self,
        source_prefix: &str,
        destination_prefix: &str,
        mode: FolderCopyMode,
    ) -> Result<FolderReport, OperationError> {
        let span = span!(Level::INFO, "copy_folder", context = "copy_folder");
        let _e = span.enter();
        info!(
            source_prefix = source_prefix,
            destination_prefix = destination_prefix,
            mode = ?mode,
            "called"
        );

        let result = self.try_copy_folder(source_prefix, destination_prefix, mode);
        match &result {
            Ok(report) => info!(prefix = source_prefix, copied = report.keys.len(), "done"),
            Err(err) => error!(error_message = %err, error_group = "copy_folder"),
        }

        result
    }

    fn try_copy_folder(
        &self,
        source_prefix: &str,
        destination_prefix: &str,
        mode: FolderCopyMode,
    ) -> Result<FolderReport, OperationError> {
        if source_prefix.is_empty() {
            return Err(OperationError::InvalidKey {
                key: source_prefix.to_string(),
                reason: "folder prefix must not be empty",
            });
        }

        let incomplete = |completed: usize, err: OperationError| OperationError::FolderIncomplete {
            operation: "copy_folder",
            prefix: source_prefix.to_string(),
            completed,
            source: Box::new(err),
        };

        // collected up front so copies into a sub-prefix of the source are not re-listed
        let objects = self
            .list_all(source_prefix)
            .map_err(|err| incomplete(0, err.into()))?;

        let mut keys = Vec::with_capacity(objects.len());
        for object in objects {
            let destination = folder_destination_key(source_prefix, destination_prefix, &object.key, mode);
            if destination.is_empty() {
                continue;
            }
            if keys.contains(&destination) {
                warn!(key = %object.key, destination = %destination, "destination overwritten within the same copy");
            }

            self.copy_listed(&object.key, &destination)
                .map_err(|err| incomplete(keys.len(), err))?;
            keys.push(destination);
        }

        Ok(FolderReport {
            prefix: source_prefix.to_string(),
            keys,
        })
    }

    fn copy_listed(&self, source: &str, destination: &str) -> Result<CopyReceipt, OperationError> {
        self.client
            .copy_object(&self.bucket, source, destination)?
            .ok_or_else(|| OperationError::EmptyCopyResult {
                from: source.to_string(),
                to: destination.to_string(),
            })
    }

    fn require_absent(&self, key: &str) -> Result<(), OperationError> {
        match self.exists(key) {
            Ok(Existence::Absent) => Ok(()),
            Ok(Existence::Present(_)) => Err(OperationError::AlreadyExists { key: key.to_string() }),
            Err(source) => Err(OperationError::ExistenceUnknown {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn resolve(&self, key: &str) -> Result<ObjectSummary, OperationError> {
        match self.exists(key) {
            Ok(Existence::Present(summary)) => Ok(summary),
            Ok(Existence::Absent) => Err(OperationError::NotFound { key: key.to_string() }),
            Err(source) => Err(OperationError::ExistenceUnknown {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn list_all(&self, prefix: &str) -> Result<Vec<ObjectSummary>, ProviderError> {
        let mut objects = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects(&self.bucket, prefix, continuation_token)?;
            objects.extend(page.objects);

            continuation_token = page.next_continuation_token;
            if continuation_token.is_none() {
                break;
            }
        }

        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;
    use crate::{
        adapters::memory::{AdapterOp, InjectedFailure, MemoryAdapter},
        model::error::{FailureKind, ServiceErrorKind},
    };

    const BUCKET: &str = "s3BucketName";

    fn service(adapter: &Arc<MemoryAdapter>) -> ObjectService {
        ObjectService::new(adapter.clone(), BUCKET)
    }

    fn local_file(body: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(body).unwrap();
        file
    }

    #[test]
    fn test_exists_absent_key() {
        let adapter = Arc::new(MemoryAdapter::new());
        let service = service(&adapter);

        assert_eq!(service.exists("missing.csv").unwrap(), Existence::Absent);
        assert!(!service.is_present("missing.csv"));
    }

    #[test]
    fn test_exists_check_failure_is_not_absence() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.fail_on(AdapterOp::Head, "a.csv", InjectedFailure::Transport);
        let service = service(&adapter);

        let err = service.exists("a.csv").unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(!service.is_present("a.csv"));

        adapter.fail_on(
            AdapterOp::Head,
            "b.csv",
            InjectedFailure::Service(ServiceErrorKind::AccessDenied),
        );
        assert!(service.exists("b.csv").is_err());
    }

    #[test]
    fn test_upload_then_exists() {
        let adapter = Arc::new(MemoryAdapter::new());
        let service = service(&adapter);
        let file = local_file(b"id,name\n1,a\n");

        service.upload_file(file.path(), "test/test.csv", true).unwrap();

        assert!(service.exists("test/test.csv").unwrap().is_present());
        assert_eq!(adapter.body(BUCKET, "test/test.csv").unwrap(), b"id,name\n1,a\n");
    }

    #[test]
    fn test_upload_without_overwrite_keeps_existing() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "test/test.csv", b"old");
        let service = service(&adapter);
        let file = local_file(b"new");

        let err = service.upload_file(file.path(), "test/test.csv", false).unwrap_err();

        assert!(matches!(err, OperationError::AlreadyExists { ref key } if key == "test/test.csv"));
        assert_eq!(err.kind(), FailureKind::Logical);
        assert_eq!(adapter.body(BUCKET, "test/test.csv").unwrap(), b"old");
        assert_eq!(adapter.calls(AdapterOp::Put), 0);
    }

    #[test]
    fn test_upload_with_overwrite_replaces_content() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "test/test.csv", b"old");
        let service = service(&adapter);
        let file = local_file(b"new");

        service.upload_file(file.path(), "test/test.csv", true).unwrap();

        assert_eq!(adapter.body(BUCKET, "test/test.csv").unwrap(), b"new");
        assert_eq!(adapter.calls(AdapterOp::Head), 0);
    }

    #[test]
    fn test_upload_uses_conditional_put() {
        let adapter = Arc::new(MemoryAdapter::new().with_conditional_put(true));
        adapter.insert(BUCKET, "test/test.csv", b"old");
        let service = service(&adapter);
        let file = local_file(b"new");

        let err = service.upload_file(file.path(), "test/test.csv", false).unwrap_err();
        assert!(matches!(err, OperationError::AlreadyExists { .. }));
        assert_eq!(adapter.calls(AdapterOp::Head), 0);
        assert_eq!(adapter.body(BUCKET, "test/test.csv").unwrap(), b"old");

        service.upload_file(file.path(), "test/other.csv", false).unwrap();
        assert_eq!(adapter.body(BUCKET, "test/other.csv").unwrap(), b"new");
    }

    #[test]
    fn test_upload_does_not_proceed_when_check_fails() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.fail_on(AdapterOp::Head, "test/test.csv", InjectedFailure::Transport);
        let service = service(&adapter);
        let file = local_file(b"new");

        let err = service.upload_file(file.path(), "test/test.csv", false).unwrap_err();

        assert!(matches!(err, OperationError::ExistenceUnknown { .. }));
        assert_eq!(adapter.calls(AdapterOp::Put), 0);
        assert!(adapter.body(BUCKET, "test/test.csv").is_none());
    }

    #[test]
    fn test_upload_put_failures() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.fail_on(
            AdapterOp::Put,
            "denied.csv",
            InjectedFailure::Service(ServiceErrorKind::AccessDenied),
        );
        let service = service(&adapter);
        let file = local_file(b"x");

        let err = service.upload_file(file.path(), "denied.csv", true).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Service);

        let err = service
            .upload_file("/nonexistent/objectop/input.csv", "missing-local.csv", true)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert!(adapter.keys(BUCKET).is_empty());
    }

    #[test]
    fn test_upload_rejects_empty_key() {
        let adapter = Arc::new(MemoryAdapter::new());
        let file = local_file(b"x");

        let err = service(&adapter).upload_file(file.path(), "", true).unwrap_err();
        assert!(matches!(err, OperationError::InvalidKey { .. }));
    }

    #[test]
    fn test_upload_delete_scenario() {
        let adapter = Arc::new(MemoryAdapter::new());
        let service = service(&adapter);
        let file = local_file(b"a,b\n");

        assert!(service.upload_file(file.path(), "a/b.csv", true).is_ok());
        assert!(service.upload_file(file.path(), "a/b.csv", false).is_err());
        assert!(service.delete_file("a/b.csv").is_ok());
        assert!(!service.exists("a/b.csv").unwrap().is_present());
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let adapter = Arc::new(MemoryAdapter::new());
        let service = service(&adapter);

        let err = service.delete_file("missing.csv").unwrap_err();

        assert!(matches!(err, OperationError::NotFound { ref key } if key == "missing.csv"));
        assert_eq!(adapter.calls(AdapterOp::Delete), 0);
    }

    #[test]
    fn test_delete_failure_is_reported() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a.csv", b"x");
        adapter.fail_on(AdapterOp::Delete, "a.csv", InjectedFailure::Transport);
        let service = service(&adapter);

        let err = service.delete_file("a.csv").unwrap_err();

        assert!(matches!(err, OperationError::Provider(ProviderError::Transport { .. })));
        assert!(service.exists("a.csv").unwrap().is_present());
    }

    #[test]
    fn test_copy_scenario() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/b.csv", b"content");
        let service = service(&adapter);

        let receipt = service.copy_file("a/b.csv", "c.csv", true).unwrap();
        assert!(receipt.e_tag.is_some());
        assert!(service.exists("c.csv").unwrap().is_present());
        assert_eq!(adapter.body(BUCKET, "c.csv").unwrap(), b"content");
        assert_eq!(adapter.body(BUCKET, "a/b.csv").unwrap(), b"content");

        let err = service.copy_file("a/b.csv", "c.csv", false).unwrap_err();
        assert!(matches!(err, OperationError::AlreadyExists { ref key } if key == "c.csv"));
    }

    #[test]
    fn test_copy_without_overwrite_keeps_destination() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "src.csv", b"new");
        adapter.insert(BUCKET, "dst.csv", b"old");
        let service = service(&adapter);

        assert!(service.copy_file("src.csv", "dst.csv", false).is_err());

        assert_eq!(adapter.body(BUCKET, "dst.csv").unwrap(), b"old");
        assert_eq!(adapter.calls(AdapterOp::Copy), 0);
    }

    #[test]
    fn test_copy_missing_source_is_not_found() {
        let adapter = Arc::new(MemoryAdapter::new());
        let service = service(&adapter);

        let err = service.copy_file("missing.csv", "dst.csv", true).unwrap_err();

        assert!(matches!(err, OperationError::NotFound { ref key } if key == "missing.csv"));
        assert_eq!(adapter.calls(AdapterOp::Copy), 0);
    }

    #[test]
    fn test_copy_empty_result_is_failure() {
        let adapter = Arc::new(MemoryAdapter::new().with_empty_copy_results(true));
        adapter.insert(BUCKET, "src.csv", b"x");
        let service = service(&adapter);

        let err = service.copy_file("src.csv", "dst.csv", true).unwrap_err();

        assert!(matches!(err, OperationError::EmptyCopyResult { .. }));
        assert_eq!(err.kind(), FailureKind::Logical);
    }

    #[test]
    fn test_delete_folder_empty_prefix_match() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "other/x.csv", b"x");
        let service = service(&adapter);

        let report = service.delete_folder("test").unwrap();

        assert_eq!(report.keys, vec!["test".to_string()]);
        assert_eq!(adapter.keys(BUCKET), vec!["other/x.csv".to_string()]);
    }

    #[test]
    fn test_delete_folder_removes_members_and_marker() {
        let adapter = Arc::new(MemoryAdapter::new());
        for key in ["test/", "test/test.csv", "test/sub/deep.csv", "test1.csv", "keep/x.csv"] {
            adapter.insert(BUCKET, key, b"x");
        }
        let service = service(&adapter);

        let report = service.delete_folder("test/").unwrap();

        assert_eq!(report.keys.len(), 3);
        for key in ["test/", "test/test.csv", "test/sub/deep.csv"] {
            assert!(!service.exists(key).unwrap().is_present());
        }
        assert!(service.exists("test1.csv").unwrap().is_present());
        assert!(service.exists("keep/x.csv").unwrap().is_present());
    }

    #[test]
    fn test_delete_folder_beyond_one_page() {
        let adapter = Arc::new(MemoryAdapter::new().with_page_size(2));
        for i in 0..7 {
            adapter.insert(BUCKET, &format!("logs/{}.csv", i), b"x");
        }
        let service = service(&adapter);

        let report = service.delete_folder("logs").unwrap();

        // seven members plus the marker
        assert_eq!(report.keys.len(), 8);
        assert!(adapter.keys(BUCKET).is_empty());
        assert_eq!(adapter.calls(AdapterOp::List), 4);
    }

    #[test]
    fn test_delete_folder_partial_failure() {
        let adapter = Arc::new(MemoryAdapter::new());
        for key in ["d/1", "d/2", "d/3"] {
            adapter.insert(BUCKET, key, b"x");
        }
        adapter.fail_on(AdapterOp::Delete, "d/2", InjectedFailure::Transport);
        let service = service(&adapter);

        let err = service.delete_folder("d/").unwrap_err();

        assert!(matches!(
            err,
            OperationError::FolderIncomplete { operation: "delete_folder", completed: 1, .. }
        ));
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(adapter.keys(BUCKET), vec!["d/2".to_string(), "d/3".to_string()]);
    }

    #[test]
    fn test_delete_folder_rejects_empty_prefix() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "x.csv", b"x");

        let err = service(&adapter).delete_folder("").unwrap_err();

        assert!(matches!(err, OperationError::InvalidKey { .. }));
        assert_eq!(adapter.keys(BUCKET).len(), 1);
    }

    #[test]
    fn test_copy_folder_preserves_hierarchy() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/x.csv", b"x");
        adapter.insert(BUCKET, "a/sub/y.csv", b"y");
        let service = service(&adapter);

        let report = service.copy_folder("a", "z").unwrap();

        assert_eq!(report.keys, vec!["z/sub/y.csv".to_string(), "z/x.csv".to_string()]);
        assert_eq!(adapter.body(BUCKET, "z/sub/y.csv").unwrap(), b"y");
        assert!(service.exists("a/x.csv").unwrap().is_present());
    }

    #[test]
    fn test_copy_folder_flatten_mode() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/x.csv", b"x");
        adapter.insert(BUCKET, "a/sub/y.csv", b"y");
        let service = service(&adapter).with_folder_copy(FolderCopyMode::Flatten);

        service.copy_folder("a", "z").unwrap();

        assert!(service.exists("z/x.csv").unwrap().is_present());
        assert!(service.exists("z/y.csv").unwrap().is_present());
        assert!(!service.exists("z/sub/y.csv").unwrap().is_present());
    }

    #[test]
    fn test_copy_folder_overwrites_destination() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/x.csv", b"new");
        adapter.insert(BUCKET, "z/x.csv", b"old");
        let service = service(&adapter);

        service.copy_folder("a/", "z/").unwrap();

        assert_eq!(adapter.body(BUCKET, "z/x.csv").unwrap(), b"new");
        assert_eq!(adapter.calls(AdapterOp::Head), 0);
    }

    #[test]
    fn test_copy_folder_into_own_subprefix() {
        let adapter = Arc::new(MemoryAdapter::new().with_page_size(1));
        adapter.insert(BUCKET, "a/1.csv", b"1");
        adapter.insert(BUCKET, "a/2.csv", b"2");
        let service = service(&adapter);

        let report = service.copy_folder("a", "a/backup").unwrap();

        assert_eq!(report.keys.len(), 2);
        assert_eq!(adapter.keys(BUCKET).len(), 4);
    }

    #[test]
    fn test_copy_folder_stops_on_failure() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/1.csv", b"1");
        adapter.insert(BUCKET, "a/2.csv", b"2");
        adapter.fail_on(
            AdapterOp::Copy,
            "z/2.csv",
            InjectedFailure::Service(ServiceErrorKind::AccessDenied),
        );
        let service = service(&adapter);

        let err = service.copy_folder("a", "z").unwrap_err();

        assert!(matches!(
            err,
            OperationError::FolderIncomplete { operation: "copy_folder", completed: 1, .. }
        ));
        assert!(service.exists("z/1.csv").unwrap().is_present());
    }

    #[test]
    fn test_copy_folder_empty_listing() {
        let adapter = Arc::new(MemoryAdapter::new());
        let report = service(&adapter).copy_folder("nothing", "z").unwrap();
        assert!(report.keys.is_empty());
    }

    #[test]
    fn test_listing_failure_aborts_folder_ops() {
        let adapter = Arc::new(MemoryAdapter::new());
        adapter.insert(BUCKET, "a/1.csv", b"1");
        adapter.fail_on(AdapterOp::List, "a", InjectedFailure::Transport);
        let service = service(&adapter);

        assert!(service.delete_folder("a").is_err());
        assert!(service.copy_folder("a", "z").is_err());
        assert_eq!(adapter.calls(AdapterOp::Delete), 0);
        assert_eq!(adapter.calls(AdapterOp::Copy), 0);
    }
}
