use serde::{Deserialize, Serialize};

/// Horizontal branch a root-level subtree is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Shape requested by the source `STYLE` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeHint {
    Ellipse,
    Rectangle,
}

/// Style fields collected from a node and its style elements.
///
/// Every field is optional: "not present in the source" must survive until the destination
/// style mapper decides on defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_width: Option<i64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_cloud: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub icons: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeHint>,
}

/// One `<node>` element and its descendants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceNode {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Side>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default)]
    pub style: SourceStyle,
    #[serde(default)]
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            position: None,
            folded: None,
            link: None,
            note: None,
            style: SourceStyle::default(),
            children: Vec::new(),
        }
    }

    /// Pre-order count of this node and all descendants.
    pub fn count_nodes(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_, _| count += 1);
        count
    }

    /// 0 for a leaf, otherwise one more than the deepest child.
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        self.walk(&mut |_, depth| deepest = deepest.max(depth));
        deepest
    }

    /// Visits the subtree in pre-order, passing each node's depth (this node is depth 0).
    ///
    /// Uses an explicit stack, so tree depth is not bounded by the call stack.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a SourceNode, usize)) {
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            f(node, depth);
            stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
        }
    }
}

/// A cross-tree reference between two nodes. Endpoints are source-document ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowLink {
    pub id: String,
    pub source_node_id: String,
    pub destination_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_arrow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_arrow: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_inclination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_inclination: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum FatalErrorKind {
    #[error("No <map> root element found")]
    MissingMap,
    #[error("No <node> element found after the <map> element")]
    MissingNode,
    #[error("Root <node> element is not closed")]
    UnclosedRootNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportError {
    pub kind: FatalErrorKind,
    pub message: String,
    pub fatal: bool,
}

impl ImportError {
    pub fn fatal(kind: FatalErrorKind) -> Self {
        Self {
            kind,
            message: kind.to_string(),
            fatal: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    UnclosedNode,
    /// Child elements left out because they are nested deeper than `parser.maxDepth`.
    UnresolvedChild,
    UnknownArrowLinkSource,
    UnknownArrowLinkDestination,
    EmptyText,
    DanglingArrowLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWarning {
    pub kind: WarningKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl ImportWarning {
    pub fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn with_node(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseStats {
    pub total_nodes: usize,
    pub total_arrow_links: usize,
    pub max_depth: usize,
    pub parse_time_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// `None` when a fatal error stopped the parse.
    pub root_node: Option<SourceNode>,
    #[serde(default)]
    pub arrow_links: Vec<ArrowLink>,
    #[serde(default)]
    pub warnings: Vec<ImportWarning>,
    #[serde(default)]
    pub errors: Vec<ImportError>,
    #[serde(default)]
    pub stats: ParseStats,
}

impl ParseResult {
    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(|e| e.fatal)
    }
}
