use std::{
    collections::{BTreeMap, HashMap},
    path::Path,
    sync::Mutex,
};

use time::OffsetDateTime;

use crate::{
    adapters,
    model::{
        error::{ProviderError, ServiceErrorKind},
        object::{CopyReceipt, ObjectPage, ObjectSummary, WriteCondition},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdapterOp {
    Head,
    Put,
    Delete,
    Copy,
    List,
}

impl AdapterOp {
    fn name(&self) -> &'static str {
        match self {
            AdapterOp::Head => "head_object",
            AdapterOp::Put => "put_object",
            AdapterOp::Delete => "delete_object",
            AdapterOp::Copy => "copy_object",
            AdapterOp::List => "list_objects",
        }
    }
}

/// Failure to raise when an operation touches a given key.
#[derive(Clone, Debug)]
pub enum InjectedFailure {
    Service(ServiceErrorKind),
    Transport,
}

#[derive(Clone, Debug)]
struct StoredObject {
    body: Vec<u8>,
    e_tag: String,
    last_modified: OffsetDateTime,
}

#[derive(Default)]
struct State {
    objects: BTreeMap<(String, String), StoredObject>,
    failures: HashMap<(AdapterOp, String), InjectedFailure>,
    calls: HashMap<AdapterOp, usize>,
    next_version: u64,
}

/// In-process provider with S3-like semantics: lexicographic, paginated
/// listings and idempotent deletes.
pub struct MemoryAdapter {
    state: Mutex<State>,
    page_size: usize,
    conditional_put: bool,
    empty_copy_results: bool,
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAdapter {
    pub const DEFAULT_PAGE_SIZE: usize = 1000;

    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: Self::DEFAULT_PAGE_SIZE,
            conditional_put: false,
            empty_copy_results: false,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_conditional_put(mut self, enabled: bool) -> Self {
        self.conditional_put = enabled;
        self
    }

    /// Acknowledge copies without a result, the way some S3-compatible stores do.
    pub fn with_empty_copy_results(mut self, enabled: bool) -> Self {
        self.empty_copy_results = enabled;
        self
    }

    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        let mut state = self.lock();
        let object = Self::stored(&mut state, body.to_vec());
        state
            .objects
            .insert((bucket.to_string(), key.to_string()), object);
    }

    pub fn body(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| o.body.clone())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .objects
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect()
    }

    pub fn fail_on(&self, op: AdapterOp, key: &str, failure: InjectedFailure) {
        self.lock().failures.insert((op, key.to_string()), failure);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self, op: AdapterOp) -> usize {
        self.lock().calls.get(&op).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // a panic in another test thread must not hide the store
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stored(state: &mut State, body: Vec<u8>) -> StoredObject {
        state.next_version += 1;
        StoredObject {
            body,
            e_tag: format!("\"{:032x}\"", state.next_version),
            last_modified: OffsetDateTime::now_utc(),
        }
    }

    fn enter(&self, state: &mut State, op: AdapterOp, key: &str) -> Result<(), ProviderError> {
        *state.calls.entry(op).or_insert(0) += 1;

        match state.failures.get(&(op, key.to_string())) {
            None => Ok(()),
            Some(InjectedFailure::Service(kind)) => Err(ProviderError::Service {
                operation: op.name(),
                key: key.to_string(),
                kind: kind.clone(),
                message: "injected service failure".to_string(),
            }),
            Some(InjectedFailure::Transport) => Err(ProviderError::Transport {
                operation: op.name(),
                key: key.to_string(),
                message: "injected transport failure".to_string(),
            }),
        }
    }

    fn summary(key: &str, object: &StoredObject) -> ObjectSummary {
        ObjectSummary {
            key: key.to_string(),
            size: object.body.len() as i64,
            e_tag: Some(object.e_tag.clone()),
            last_modified: Some(object.last_modified),
        }
    }
}

impl adapters::ObjectAdapter for MemoryAdapter {
    fn head_object(&self, bucket: &str, key: &str) -> Result<Option<ObjectSummary>, ProviderError> {
        let mut state = self.lock();
        self.enter(&mut state, AdapterOp::Head, key)?;

        Ok(state
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| Self::summary(key, o)))
    }

    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        local_path: &Path,
        condition: WriteCondition,
    ) -> Result<(), ProviderError> {
        let mut state = self.lock();
        self.enter(&mut state, AdapterOp::Put, key)?;

        let body = std::fs::read(local_path).map_err(|err| ProviderError::Transport {
            operation: AdapterOp::Put.name(),
            key: key.to_string(),
            message: format!("failed to read {}: {}", local_path.display(), err),
        })?;

        let id = (bucket.to_string(), key.to_string());
        if self.conditional_put
            && condition == WriteCondition::IfAbsent
            && state.objects.contains_key(&id)
        {
            return Err(ProviderError::Service {
                operation: AdapterOp::Put.name(),
                key: key.to_string(),
                kind: ServiceErrorKind::PreconditionFailed,
                message: "At least one of the pre-conditions you specified did not hold".to_string(),
            });
        }

        let object = Self::stored(&mut state, body);
        state.objects.insert(id, object);

        Ok(())
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), ProviderError> {
        let mut state = self.lock();
        self.enter(&mut state, AdapterOp::Delete, key)?;

        state.objects.remove(&(bucket.to_string(), key.to_string()));

        Ok(())
    }

    fn copy_object(
        &self,
        bucket: &str,
        source_key: &str,
        destination_key: &str,
    ) -> Result<Option<CopyReceipt>, ProviderError> {
        let mut state = self.lock();
        self.enter(&mut state, AdapterOp::Copy, destination_key)?;

        let body = match state.objects.get(&(bucket.to_string(), source_key.to_string())) {
            Some(source) => source.body.clone(),
            None => {
                return Err(ProviderError::Service {
                    operation: AdapterOp::Copy.name(),
                    key: source_key.to_string(),
                    kind: ServiceErrorKind::NotFound,
                    message: "The specified key does not exist.".to_string(),
                })
            }
        };

        let object = Self::stored(&mut state, body);
        let receipt = CopyReceipt {
            e_tag: Some(object.e_tag.clone()),
            last_modified: Some(object.last_modified),
        };
        state
            .objects
            .insert((bucket.to_string(), destination_key.to_string()), object);

        if self.empty_copy_results {
            return Ok(None);
        }

        Ok(Some(receipt))
    }

    fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
        continuation_token: Option<String>,
    ) -> Result<ObjectPage, ProviderError> {
        let mut state = self.lock();
        self.enter(&mut state, AdapterOp::List, prefix)?;

        // the token is the last key of the previous page
        let mut matching = state
            .objects
            .iter()
            .filter(|((b, k), _)| b == bucket && k.starts_with(prefix))
            .filter(|((_, k), _)| match &continuation_token {
                Some(tok) => k.as_str() > tok.as_str(),
                None => true,
            });

        let mut objects = Vec::new();
        for ((_, key), object) in matching.by_ref().take(self.page_size) {
            objects.push(Self::summary(key, object));
        }

        let next_continuation_token = if matching.next().is_some() {
            objects.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ObjectPage {
            objects,
            next_continuation_token,
        })
    }

    fn supports_conditional_put(&self) -> bool {
        self.conditional_put
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::adapters::ObjectAdapter;

    #[test]
    fn test_list_pages() {
        let adapter = MemoryAdapter::new().with_page_size(2);
        for key in ["a/1", "a/2", "a/3", "b/1"] {
            adapter.insert("bucket", key, b"x");
        }

        let first = adapter.list_objects("bucket", "a/", None).unwrap();
        assert_eq!(first.objects.len(), 2);
        assert_eq!(first.next_continuation_token.as_deref(), Some("a/2"));

        let second = adapter
            .list_objects("bucket", "a/", first.next_continuation_token)
            .unwrap();
        assert_eq!(second.objects.len(), 1);
        assert_eq!(second.objects[0].key, "a/3");
        assert!(second.next_continuation_token.is_none());
    }

    #[test]
    fn test_buckets_are_isolated() {
        let adapter = MemoryAdapter::new();
        adapter.insert("one", "k", b"x");

        assert!(adapter.head_object("one", "k").unwrap().is_some());
        assert!(adapter.head_object("two", "k").unwrap().is_none());
        assert!(adapter.list_objects("two", "", None).unwrap().objects.is_empty());
    }

    #[test]
    fn test_conditional_put() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"new").unwrap();

        let adapter = MemoryAdapter::new().with_conditional_put(true);
        adapter.insert("bucket", "k", b"old");

        let err = adapter
            .put_object("bucket", "k", file.path(), WriteCondition::IfAbsent)
            .unwrap_err();
        assert!(err.is_precondition_failed());
        assert_eq!(adapter.body("bucket", "k").unwrap(), b"old");

        adapter
            .put_object("bucket", "k", file.path(), WriteCondition::Overwrite)
            .unwrap();
        assert_eq!(adapter.body("bucket", "k").unwrap(), b"new");
    }

    #[test]
    fn test_injected_failure_and_counters() {
        let adapter = MemoryAdapter::new();
        adapter.fail_on(AdapterOp::Delete, "k", InjectedFailure::Transport);

        assert!(adapter.delete_object("bucket", "k").is_err());
        assert!(adapter.delete_object("bucket", "other").is_ok());
        assert_eq!(adapter.calls(AdapterOp::Delete), 2);

        adapter.clear_failures();
        assert!(adapter.delete_object("bucket", "k").is_ok());
    }
}
