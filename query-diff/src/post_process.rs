use crate::config::PostProcessConfig;
use crate::encoding::EncodingDetector;
use crate::error::{QueryDiffError, Result};
use crate::normalize::NormalizerRegistry;
use crate::observer::{Observer, RunEvent, Stage};
use crate::persist::FilePersister;
use crate::traits::NormalizeContext;
use crate::types::{ItemFailure, ProcessedFile, SavedFile};

/// Processed files in server order plus the files that fell back to raw
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostProcessOutcome {
    pub files: Vec<ProcessedFile>,
    pub failures: Vec<ItemFailure>,
}

impl PostProcessOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Runs the configured normalizer over every saved file
pub struct PostProcessOrchestrator<'a> {
    registry: &'a NormalizerRegistry,
    detector: &'a EncodingDetector,
    persister: &'a FilePersister,
    observer: &'a dyn Observer,
}

impl<'a> PostProcessOrchestrator<'a> {
    pub fn new(
        registry: &'a NormalizerRegistry,
        detector: &'a EncodingDetector,
        persister: &'a FilePersister,
        observer: &'a dyn Observer,
    ) -> Self {
        Self {
            registry,
            detector,
            persister,
            observer,
        }
    }

    /// Normalize `saved` in order; the output has the same length and order.
    ///
    /// A file that cannot be normalized keeps its saved path and is listed in
    /// `failures`. Only a failure to write into the output directory aborts.
    pub fn run(&self, saved: &[SavedFile], config: &PostProcessConfig) -> Result<PostProcessOutcome> {
        let normalizer = self.registry.select(&config.mode);
        let naming = config.naming();
        let ctx = NormalizeContext {
            detector: self.detector,
            persister: self.persister,
            naming: &naming,
            observer: self.observer,
        };

        let total = saved.len();
        let mut outcome = PostProcessOutcome {
            files: Vec::with_capacity(total),
            failures: Vec::new(),
        };

        for file in saved {
            self.observer.notify(&RunEvent::ItemStarted {
                stage: Stage::PostProcess,
                index: file.index,
                total,
            });

            let processed = match normalizer.normalize(file, &ctx) {
                Ok(processed) => processed,
                Err(e) if e.is_fatal() => {
                    self.notify_failed(file, total, &e);
                    return Err(e);
                }
                Err(e) => {
                    self.notify_failed(file, total, &e);
                    outcome.failures.push(ItemFailure {
                        index: file.index,
                        path: file.path.clone(),
                        message: e.to_string(),
                    });
                    ProcessedFile::passthrough(file)
                }
            };

            self.observer.notify(&RunEvent::ItemFinished {
                stage: Stage::PostProcess,
                index: file.index,
                total,
                path: processed.path.clone(),
            });
            outcome.files.push(processed);
        }

        Ok(outcome)
    }

    fn notify_failed(&self, file: &SavedFile, total: usize, error: &QueryDiffError) {
        self.observer.notify(&RunEvent::ItemFailed {
            stage: Stage::PostProcess,
            index: file.index,
            total,
            message: error.to_string(),
        });
    }
}
