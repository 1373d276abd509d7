//! Conditional upload, delete and copy of objects and prefix "folders" in an
//! object storage bucket.
//!
//! ```no_run
//! let service = objectop::session::build("accessKey", "secretKey", "us-east-1", "bucket")?;
//! service.upload_file("/tmp/test.csv", "test/test.csv", false)?;
//! service.copy_folder("test", "archive/test")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod adapters;
pub mod model;
pub mod service;
pub mod session;
pub mod util;

pub use model::error::{FailureKind, OperationError, ProviderError, SessionError};
pub use model::object::{Existence, FolderCopyMode, FolderReport};
pub use service::ObjectService;
