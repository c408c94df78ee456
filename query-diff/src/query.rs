use crate::config::Request;
use crate::error::{QueryDiffError, Result};
use crate::observer::{Observer, RunEvent, Stage};
use crate::persist::{FileNaming, FilePersister};
use crate::traits::ResponseFetcher;
use crate::types::{ResponseRecord, SavedFile};

/// Sends the request to every server in order and saves each raw response
pub struct QueryOrchestrator<'a, F: ResponseFetcher> {
    fetcher: &'a F,
    persister: &'a FilePersister,
    naming: FileNaming,
    fail_on_error_status: bool,
    observer: &'a dyn Observer,
}

impl<'a, F: ResponseFetcher> QueryOrchestrator<'a, F> {
    pub fn new(
        fetcher: &'a F,
        persister: &'a FilePersister,
        naming: FileNaming,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            fetcher,
            persister,
            naming,
            fail_on_error_status: false,
            observer,
        }
    }

    /// Treat non-2xx responses as transport failures
    pub fn with_fail_on_error_status(mut self, fail_on_error_status: bool) -> Self {
        self.fail_on_error_status = fail_on_error_status;
        self
    }

    /// Query `servers` strictly in order.
    ///
    /// The first failure aborts the run: files already saved stay on disk and
    /// the remaining servers are not queried. On success `result[i]` belongs
    /// to `servers[i]`.
    pub async fn run(&self, servers: &[String], request: &Request) -> Result<Vec<SavedFile>> {
        let total = servers.len();
        let mut saved_files = Vec::with_capacity(total);

        for (position, server) in servers.iter().enumerate() {
            let index = position + 1;
            self.observer.notify(&RunEvent::ItemStarted {
                stage: Stage::Query,
                index,
                total,
            });

            let saved = self
                .query_one(index, total, server, request)
                .await
                .inspect_err(|e| {
                    self.observer.notify(&RunEvent::ItemFailed {
                        stage: Stage::Query,
                        index,
                        total,
                        message: e.to_string(),
                    })
                })?;

            self.observer.notify(&RunEvent::ItemFinished {
                stage: Stage::Query,
                index,
                total,
                path: saved.path.clone(),
            });
            saved_files.push(saved);
        }

        Ok(saved_files)
    }

    async fn query_one(&self, index: usize, total: usize, server: &str, request: &Request) -> Result<SavedFile> {
        let response = self
            .fetcher
            .fetch(server, request)
            .await
            .map_err(|e| QueryDiffError::transport(index, total, server, e.to_string()))?;

        if self.fail_on_error_status && !response.is_success() {
            return Err(QueryDiffError::transport(
                index,
                total,
                server,
                format!("server answered with status {}", response.status),
            ));
        }

        let record = ResponseRecord {
            index,
            server: server.to_string(),
            response,
        };
        self.persist(record)
    }

    fn persist(&self, record: ResponseRecord) -> Result<SavedFile> {
        let file_name = self.naming.raw_file_name(record.index);
        let path = self
            .persister
            .save_bytes(&file_name, &record.response.body)?;

        Ok(SavedFile {
            index: record.index,
            server: record.server,
            path,
            status: record.response.status,
        })
    }
}
