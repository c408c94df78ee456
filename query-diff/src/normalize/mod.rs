//! Post-process strategies keyed by format tag.
//!
//! A [`NormalizerRegistry`] maps the `mode` of the post-process config to a
//! [`Normalizer`]. Unknown tags resolve to the identity normalizer, so a
//! typo in the config degrades to "no post process" instead of failing.

pub mod xml;

use crate::config::{MODE_DISABLED, MODE_XML};
use crate::error::Result;
use crate::traits::{NormalizeContext, Normalizer};
use crate::types::{ProcessedFile, SavedFile};
use std::collections::HashMap;

pub use xml::XmlNormalizer;

/// Identity post process: the saved path is the processed path
#[derive(Debug, Clone, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn mode(&self) -> &str {
        MODE_DISABLED
    }

    fn normalize(&self, saved: &SavedFile, _ctx: &NormalizeContext<'_>) -> Result<ProcessedFile> {
        Ok(ProcessedFile::passthrough(saved))
    }
}

/// Normalizers by format tag
pub struct NormalizerRegistry {
    normalizers: HashMap<String, Box<dyn Normalizer>>,
    identity: IdentityNormalizer,
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl NormalizerRegistry {
    /// Registry with only the identity fallback
    pub fn new() -> Self {
        Self {
            normalizers: HashMap::new(),
            identity: IdentityNormalizer,
        }
    }

    /// Registry with `disabled` and `xml`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(IdentityNormalizer);
        registry.register(XmlNormalizer::new());
        registry
    }

    /// Register `normalizer` under its own mode tag, replacing any previous one
    pub fn register<N: Normalizer + 'static>(&mut self, normalizer: N) {
        self.normalizers
            .insert(normalizer.mode().to_ascii_lowercase(), Box::new(normalizer));
    }

    pub fn is_registered(&self, mode: &str) -> bool {
        self.normalizers.contains_key(&mode.trim().to_ascii_lowercase())
    }

    /// Normalizer for `mode`; the identity normalizer when none is registered
    pub fn select(&self, mode: &str) -> &dyn Normalizer {
        match self.normalizers.get(&mode.trim().to_ascii_lowercase()) {
            Some(normalizer) => normalizer.as_ref(),
            None => &self.identity,
        }
    }

    /// Registered tags, sorted
    pub fn modes(&self) -> Vec<&str> {
        let mut modes: Vec<&str> = self.normalizers.keys().map(String::as_str).collect();
        modes.sort_unstable();
        modes
    }
}
