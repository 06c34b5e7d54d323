#![forbid(unsafe_code)]

//! Tolerant importer for FreeMind-style mind-map markup (headless).
//!
//! The markup is scanned with a depth-aware tag matcher rather than a strict XML parser, so
//! unclosed or mis-nested elements degrade to warnings and partial trees instead of failing the
//! import. Only three problems are fatal: no `<map>` element, no `<node>` element, and an
//! unclosed root node.
//!
//! Layout and conversion into positioned nodes live in `mindport-render`.

pub mod attrs;
pub mod color;
pub mod config;
pub mod error;
pub mod ids;
pub mod model;
pub mod parse;
pub mod preview;
pub mod scan;
pub mod style;
pub mod validate;

pub use config::ImportConfig;
pub use error::{Error, Result};
pub use ids::IdGenerator;
pub use model::{
    ArrowLink, FatalErrorKind, ImportError, ImportWarning, ParseResult, ParseStats, ShapeHint,
    Side, SourceNode, SourceStyle, WarningKind,
};
pub use parse::ParseOptions;
pub use preview::{PreviewLimits, PreviewNode, PreviewSummary};

/// Entry point that carries one [`ImportConfig`] across parse, validation and preview.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::from_config(&self.config)
    }

    pub fn preview_limits(&self) -> PreviewLimits {
        PreviewLimits::from_config(&self.config)
    }

    /// Parses `text` with a fresh [`IdGenerator`] (timestamped, random ids for nodes without
    /// an `ID` attribute).
    pub fn parse(&self, text: &str) -> ParseResult {
        self.parse_with_ids(text, &mut IdGenerator::new())
    }

    pub fn parse_with_ids(&self, text: &str, ids: &mut IdGenerator) -> ParseResult {
        parse::parse_document(text, &self.parse_options(), ids)
    }

    pub fn validate(&self, result: ParseResult) -> ParseResult {
        validate::validate(result)
    }

    pub fn preview(&self, result: &ParseResult) -> PreviewSummary {
        preview::preview(result, &self.preview_limits())
    }
}

/// Parses `text` with the default configuration.
pub fn parse(text: &str) -> ParseResult {
    Importer::new().parse(text)
}

/// See [`validate::validate`].
pub fn validate(result: ParseResult) -> ParseResult {
    validate::validate(result)
}

/// Summarizes `result` with the default limits.
pub fn preview(result: &ParseResult) -> PreviewSummary {
    preview::preview(result, &PreviewLimits::default())
}
