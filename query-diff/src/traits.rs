use crate::config::Request;
use crate::encoding::EncodingDetector;
use crate::error::Result;
use crate::observer::Observer;
use crate::persist::{FileNaming, FilePersister};
use crate::types::{HttpResponse, ProcessedFile, SavedFile};
use std::future::Future;
use std::path::PathBuf;

/// Trait for fetching one response from one server
pub trait ResponseFetcher: Send + Sync {
    /// Send `request` to `server` and capture the raw response
    fn fetch(
        &self,
        server: &str,
        request: &Request,
    ) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Everything a normalizer may need besides the saved file itself
pub struct NormalizeContext<'a> {
    pub detector: &'a EncodingDetector,
    pub persister: &'a FilePersister,
    pub naming: &'a FileNaming,
    pub observer: &'a dyn Observer,
}

/// Per-format post-process strategy.
///
/// Implementations never modify the saved file. A normalizer that writes
/// new content returns the new path; the identity normalizer returns the
/// saved path unchanged.
pub trait Normalizer: Send + Sync {
    /// Format tag this normalizer is registered under
    fn mode(&self) -> &str;

    fn normalize(&self, saved: &SavedFile, ctx: &NormalizeContext<'_>) -> Result<ProcessedFile>;
}

/// Trait for launching the external diff viewer
pub trait DiffViewer: Send + Sync {
    /// Program name, for reporting
    fn command(&self) -> &str;

    /// Launch the viewer with `paths` as positional arguments, in order
    fn invoke(&self, paths: &[PathBuf]) -> Result<()>;
}
