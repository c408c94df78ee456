use std::collections::BTreeMap;
use std::path::PathBuf;

/// Raw HTTP response captured from one server
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Body bytes exactly as received
    pub body: Vec<u8>,
    pub url: String,
}

impl HttpResponse {
    pub fn new(status: u16, headers: BTreeMap<String, String>, body: Vec<u8>, url: String) -> Self {
        Self {
            status,
            headers,
            body,
            url,
        }
    }

    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One fetched response tagged with the server it came from
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    /// 1-based server index
    pub index: usize,
    pub server: String,
    pub response: HttpResponse,
}

/// A raw capture on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    /// 1-based server index
    pub index: usize,
    pub server: String,
    pub path: PathBuf,
    pub status: u16,
}

/// Output of the post-process stage for one saved file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedFile {
    /// 1-based server index, carried over from the saved file
    pub index: usize,
    pub path: PathBuf,
    /// False when the saved path was passed through unchanged
    pub normalized: bool,
}

impl ProcessedFile {
    /// Identity post-process: the saved file is the processed file
    pub fn passthrough(saved: &SavedFile) -> Self {
        Self {
            index: saved.index,
            path: saved.path.clone(),
            normalized: false,
        }
    }

    pub fn normalized(index: usize, path: PathBuf) -> Self {
        Self {
            index,
            path,
            normalized: true,
        }
    }
}

/// A file whose post-processing failed and fell back to its raw capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub index: usize,
    pub path: PathBuf,
    pub message: String,
}
