mod node;


use rustc_hash::FxHashSet;
use std::time::Instant;

use crate::attrs::get_attr;
use crate::config::ImportConfig;
use crate::ids::IdGenerator;
use crate::model::{
    ArrowLink, FatalErrorKind, ImportError, ImportWarning, ParseResult, ParseStats, SourceNode,
    WarningKind,
};
use crate::scan::{close_tag_len, find_matching_close, find_open_tag, open_tags, read_open_tag};

use node::parse_node;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Title used when the root node has no text or the parse failed.
    pub default_title: String,
    /// Only read style elements, arrow links and rich content from a node's own content
    /// instead of anywhere inside its span.
    pub strict_element_scope: bool,
    /// Deepest node level kept (the root is level 0). Deeper children are skipped with a
    /// warning.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl ParseOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            default_title: config.str_or_default("parser.defaultTitle"),
            strict_element_scope: config.bool_or_default("parser.strictElementScope"),
            max_depth: config.usize_or_default("parser.maxDepth"),
        }
    }
}

/// Mutable state shared by one document parse.
pub(crate) struct ParseContext<'a> {
    pub(crate) ids: &'a mut IdGenerator,
    pub(crate) warnings: Vec<ImportWarning>,
    pub(crate) arrow_links: Vec<ArrowLink>,
    pub(crate) strict_element_scope: bool,
    pub(crate) max_depth: usize,
    /// Explicit `ID` values in the source; synthesized ids never take one of these.
    reserved_ids: FxHashSet<String>,
}

impl<'a> ParseContext<'a> {
    pub(crate) fn new(ids: &'a mut IdGenerator, options: &ParseOptions, source: &str) -> Self {
        Self {
            ids,
            warnings: Vec::new(),
            arrow_links: Vec::new(),
            strict_element_scope: options.strict_element_scope,
            max_depth: options.max_depth,
            reserved_ids: explicit_ids(source),
        }
    }

    /// Next generated id for `prefix` that does not clash with an explicit source id.
    pub(crate) fn synthesize_id(&mut self, prefix: &str) -> String {
        loop {
            let id = self.ids.next_id(prefix);
            if !self.reserved_ids.contains(&id) {
                return id;
            }
        }
    }

    pub(crate) fn warn(&mut self, kind: WarningKind, message: String, node_id: Option<&str>) {
        tracing::debug!(?kind, node_id, "{message}");
        let mut warning = ImportWarning::new(kind, message);
        if let Some(id) = node_id {
            warning = warning.with_node(id);
        }
        self.warnings.push(warning);
    }
}

fn explicit_ids(source: &str) -> FxHashSet<String> {
    open_tags(source, "node")
        .chain(open_tags(source, "arrowlink"))
        .filter_map(|tag| get_attr(tag.attrs, "ID"))
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Parses a whole document: `<map>` root element, then the first `<node>` after it.
///
/// `ids` is reset before use so identifiers are reproducible for a sequential generator.
pub fn parse_document(text: &str, options: &ParseOptions, ids: &mut IdGenerator) -> ParseResult {
    let started = Instant::now();
    let _span = tracing::debug_span!("parse_document", input_bytes = text.len()).entered();
    ids.reset();

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let source = normalized.trim();
    let mut cx = ParseContext::new(ids, options, source);

    let (version, root) = match locate_root(source) {
        Ok((version, root_span)) => (version, parse_node(root_span, &mut cx)),
        Err((version, kind)) => {
            tracing::debug!(?kind, "fatal parse error");
            let mut result = failed_result(options, version, kind, cx.warnings);
            result.stats.parse_time_ms = elapsed_ms(started);
            return result;
        }
    };

    let Some(root) = root else {
        // `locate_root` only hands out spans that start with a node tag.
        let mut result = failed_result(options, version, FatalErrorKind::MissingNode, cx.warnings);
        result.stats.parse_time_ms = elapsed_ms(started);
        return result;
    };

    let title = if root.text.trim().is_empty() {
        options.default_title.clone()
    } else {
        root.text.clone()
    };
    let stats = ParseStats {
        total_nodes: root.count_nodes(),
        total_arrow_links: cx.arrow_links.len(),
        max_depth: root.max_depth(),
        parse_time_ms: elapsed_ms(started),
    };
    tracing::debug!(
        total_nodes = stats.total_nodes,
        max_depth = stats.max_depth,
        arrow_links = stats.total_arrow_links,
        warnings = cx.warnings.len(),
        "parsed mind map"
    );

    ParseResult {
        title,
        version,
        root_node: Some(root),
        arrow_links: cx.arrow_links,
        warnings: cx.warnings,
        errors: Vec::new(),
        stats,
    }
}

type RootSpan<'a> = (Option<String>, &'a str);

/// Finds the map version and the span of the root node element.
fn locate_root(source: &str) -> Result<RootSpan<'_>, (Option<String>, FatalErrorKind)> {
    let map_open = find_open_tag(source, "map", 0)
        .and_then(|at| read_open_tag(source, "map", at))
        .ok_or((None, FatalErrorKind::MissingMap))?;
    let version = get_attr(map_open.attrs, "version");

    let Some(node_at) = find_open_tag(source, "node", map_open.end) else {
        return Err((version, FatalErrorKind::MissingNode));
    };
    let Some(node_open) = read_open_tag(source, "node", node_at) else {
        return Err((version, FatalErrorKind::UnclosedRootNode));
    };
    let end = if node_open.self_closing {
        node_open.end
    } else {
        match find_matching_close(source, "node", node_open.end) {
            Some(close) => close + close_tag_len("node"),
            None => return Err((version, FatalErrorKind::UnclosedRootNode)),
        }
    };
    Ok((version, &source[node_at..end]))
}

fn failed_result(
    options: &ParseOptions,
    version: Option<String>,
    kind: FatalErrorKind,
    warnings: Vec<ImportWarning>,
) -> ParseResult {
    ParseResult {
        title: options.default_title.clone(),
        version,
        root_node: None,
        arrow_links: Vec::new(),
        warnings,
        errors: vec![ImportError::fatal(kind)],
        stats: ParseStats::default(),
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Parses a single node span on its own (no `<map>` wrapper), for callers that already hold a
/// node fragment.
pub fn parse_node_fragment(
    span: &str,
    options: &ParseOptions,
    ids: &mut IdGenerator,
) -> (Option<SourceNode>, Vec<ArrowLink>, Vec<ImportWarning>) {
    let span = span.trim();
    let mut cx = ParseContext::new(ids, options, span);
    let node = parse_node(span, &mut cx);
    (node, cx.arrow_links, cx.warnings)
}
