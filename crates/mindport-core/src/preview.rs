use serde::{Deserialize, Serialize};

use crate::config::ImportConfig;
use crate::model::{ParseResult, ParseStats, SourceNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    pub max_sample_nodes: usize,
    pub max_warnings: usize,
    pub max_text_length: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl PreviewLimits {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            max_sample_nodes: config.usize_or_default("preview.maxSampleNodes"),
            max_warnings: config.usize_or_default("preview.maxWarnings"),
            max_text_length: config.usize_or_default("preview.maxTextLength"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewNode {
    pub text: String,
    pub depth: usize,
    pub child_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSummary {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub stats: ParseStats,
    pub sample_nodes: Vec<PreviewNode>,
    /// Error messages first, then the leading warnings.
    pub issues: Vec<String>,
}

/// Builds a short digest of `result` for display before committing an import.
pub fn preview(result: &ParseResult, limits: &PreviewLimits) -> PreviewSummary {
    let mut sample_nodes = Vec::new();
    if let Some(root) = result.root_node.as_ref() {
        sample(root, limits, &mut sample_nodes);
    }

    let issues = result
        .errors
        .iter()
        .map(|e| e.message.clone())
        .chain(
            result
                .warnings
                .iter()
                .take(limits.max_warnings)
                .map(|w| w.message.clone()),
        )
        .collect();

    PreviewSummary {
        title: result.title.clone(),
        version: result.version.clone(),
        stats: result.stats.clone(),
        sample_nodes,
        issues,
    }
}

/// Pre-order, stopping once the sample is full.
fn sample(root: &SourceNode, limits: &PreviewLimits, out: &mut Vec<PreviewNode>) {
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        if out.len() >= limits.max_sample_nodes {
            break;
        }
        out.push(PreviewNode {
            text: truncate(&node.text, limits.max_text_length),
            depth,
            child_count: node.children.len(),
        });
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FatalErrorKind, ImportError, ImportWarning, WarningKind};

    fn result(root: Option<SourceNode>) -> ParseResult {
        ParseResult {
            title: "T".to_string(),
            version: Some("1.0.1".to_string()),
            stats: ParseStats::default(),
            root_node: root,
            arrow_links: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn wide_tree(children: usize) -> SourceNode {
        let mut root = SourceNode::new("r", "Root");
        for i in 0..children {
            let mut child = SourceNode::new(format!("c{i}"), format!("Child {i}"));
            child.children.push(SourceNode::new(format!("g{i}"), "leaf"));
            root.children.push(child);
        }
        root
    }

    #[test]
    fn samples_are_preorder_with_depth_and_child_count() {
        let summary = preview(&result(Some(wide_tree(2))), &PreviewLimits::default());
        let got: Vec<(&str, usize, usize)> = summary
            .sample_nodes
            .iter()
            .map(|n| (n.text.as_str(), n.depth, n.child_count))
            .collect();
        assert_eq!(
            got,
            vec![
                ("Root", 0, 2),
                ("Child 0", 1, 1),
                ("leaf", 2, 0),
                ("Child 1", 1, 1),
                ("leaf", 2, 0),
            ]
        );
    }

    #[test]
    fn samples_are_capped() {
        let summary = preview(&result(Some(wide_tree(20))), &PreviewLimits::default());
        assert_eq!(summary.sample_nodes.len(), 10);
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let long = "x".repeat(60);
        let summary = preview(
            &result(Some(SourceNode::new("r", long))),
            &PreviewLimits::default(),
        );
        assert_eq!(summary.sample_nodes[0].text, format!("{}...", "x".repeat(50)));
        assert_eq!(truncate(&"é".repeat(50), 50), "é".repeat(50));
    }

    #[test]
    fn issues_list_errors_then_capped_warnings() {
        let mut input = result(None);
        input.errors.push(ImportError::fatal(FatalErrorKind::MissingMap));
        for i in 0..15 {
            input
                .warnings
                .push(ImportWarning::new(WarningKind::EmptyText, format!("w{i}")));
        }
        let summary = preview(&input, &PreviewLimits::default());
        assert!(summary.sample_nodes.is_empty());
        assert_eq!(summary.issues.len(), 11);
        assert_eq!(summary.issues[0], "No <map> root element found");
        assert_eq!(summary.issues[1], "w0");
        assert_eq!(summary.issues[10], "w9");
    }
}
