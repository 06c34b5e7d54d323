use rustc_hash::FxHashSet;

use crate::model::{ImportWarning, ParseResult, SourceNode, WarningKind};

/// Appends referential-integrity and empty-text warnings to `result`.
///
/// Existing warnings and errors are left as they are. Validation is additive: running it twice
/// reports every finding twice. A result without a root node is returned unchanged.
pub fn validate(mut result: ParseResult) -> ParseResult {
    let found = match result.root_node.as_ref() {
        Some(root) => find_issues(root, &result),
        None => return result,
    };
    for warning in &found {
        tracing::trace!(
            kind = ?warning.kind,
            node_id = warning.node_id.as_deref(),
            "{}",
            warning.message
        );
    }
    tracing::debug!(found = found.len(), "validated parse result");
    result.warnings.extend(found);
    result
}

fn find_issues(root: &SourceNode, result: &ParseResult) -> Vec<ImportWarning> {
    let mut ids: FxHashSet<&str> = FxHashSet::default();
    root.walk(&mut |node, _| {
        ids.insert(node.id.as_str());
    });

    let mut out = Vec::new();
    for link in &result.arrow_links {
        if !ids.contains(link.source_node_id.as_str()) {
            out.push(
                ImportWarning::new(
                    WarningKind::UnknownArrowLinkSource,
                    format!(
                        "Arrow link \"{}\" starts at unknown node \"{}\"",
                        link.id, link.source_node_id
                    ),
                )
                .with_node(link.source_node_id.clone()),
            );
        }
        if !ids.contains(link.destination_node_id.as_str()) {
            out.push(
                ImportWarning::new(
                    WarningKind::UnknownArrowLinkDestination,
                    format!(
                        "Arrow link \"{}\" points to unknown node \"{}\"",
                        link.id, link.destination_node_id
                    ),
                )
                .with_node(link.destination_node_id.clone()),
            );
        }
    }

    empty_text_warnings(root, &mut out);
    out
}

/// Pre-order over the tree; paths read `root`, `root.0`, `root.0.2`.
fn empty_text_warnings(root: &SourceNode, out: &mut Vec<ImportWarning>) {
    let mut stack = vec![(root, "root".to_string())];
    while let Some((node, path)) = stack.pop() {
        if node.text.trim().is_empty() {
            out.push(
                ImportWarning::new(
                    WarningKind::EmptyText,
                    format!("Node at {path} has no text"),
                )
                .with_node(node.id.clone()),
            );
        }
        for (idx, child) in node.children.iter().enumerate().rev() {
            stack.push((child, format!("{path}.{idx}")));
        }
    }
}
