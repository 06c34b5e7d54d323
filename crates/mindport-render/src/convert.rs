use mindport_core::{
    ArrowLink, IdGenerator, ImportConfig, ImportWarning, ParseResult, WarningKind,
};

use crate::layout::{LayoutOptions, TreeLayout, layout_tree};
use crate::model::{
    ConnectionStyle, ConversionResult, MappedConnection, MappedNode, Marker, NodeType, PathType,
    StrokeStyle,
};
use crate::style::{RootStyleDefaults, map_style};

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDefaults {
    pub stroke_color: String,
    pub stroke_width: f64,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl ConnectionDefaults {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            stroke_color: config.str_or_default("connection.strokeColor"),
            stroke_width: config.f64_or_default("connection.strokeWidth"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub layout: LayoutOptions,
    pub root_style: RootStyleDefaults,
    pub connection: ConnectionDefaults,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl ConvertOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            layout: LayoutOptions::from_config(config),
            root_style: RootStyleDefaults::from_config(config),
            connection: ConnectionDefaults::from_config(config),
        }
    }
}

/// Lays out and styles a parse result.
///
/// A result without a tree converts to empty node and connection lists; its errors and
/// warnings are carried over. Arrow links whose endpoints are not in the tree are dropped with
/// a warning. `ids` is reset first.
pub fn convert_with(
    result: &ParseResult,
    options: &ConvertOptions,
    ids: &mut IdGenerator,
) -> ConversionResult {
    let _span = tracing::debug_span!("convert", title = %result.title).entered();
    ids.reset();

    let mut out = ConversionResult {
        title: result.title.clone(),
        nodes: Vec::new(),
        connections: Vec::new(),
        warnings: result.warnings.clone(),
        errors: result.errors.clone(),
    };
    let Some(root) = &result.root_node else {
        tracing::debug!(errors = out.errors.len(), "nothing to convert");
        return out;
    };

    let layout = layout_tree(root, &options.layout, ids);
    out.nodes = layout
        .nodes
        .iter()
        .map(|placed| {
            let source = placed.source;
            let is_root = placed.is_root();
            MappedNode {
                id: placed.id.clone(),
                source_id: source.id.clone(),
                text: source.text.clone(),
                node_type: if is_root {
                    NodeType::Root
                } else {
                    NodeType::Child
                },
                parent_id: placed.parent_id.clone(),
                position: placed.position,
                size: placed.size,
                style: map_style(&source.style, is_root, &options.root_style),
                folded: source.folded.unwrap_or(false),
                link: source.link.clone(),
                note: source.note.clone(),
                sort_order: placed.sort_order,
            }
        })
        .collect();

    for link in &result.arrow_links {
        match map_connection(link, &layout, &options.connection, ids) {
            Some(connection) => out.connections.push(connection),
            None => {
                let warning = dangling_link_warning(link, &layout);
                tracing::debug!(link = %link.id, "{}", warning.message);
                out.warnings.push(warning);
            }
        }
    }

    tracing::debug!(
        nodes = out.nodes.len(),
        connections = out.connections.len(),
        warnings = out.warnings.len(),
        "converted mind map"
    );
    out
}

fn map_connection(
    link: &ArrowLink,
    layout: &TreeLayout<'_>,
    defaults: &ConnectionDefaults,
    ids: &mut IdGenerator,
) -> Option<MappedConnection> {
    let source_id = layout.mapped_id(&link.source_node_id)?;
    let target_id = layout.mapped_id(&link.destination_node_id)?;
    Some(MappedConnection {
        id: ids.next_id("conn"),
        source_link_id: link.id.clone(),
        source_id: source_id.to_string(),
        target_id: target_id.to_string(),
        style: ConnectionStyle {
            path_type: PathType::Bezier,
            stroke_color: link
                .color
                .clone()
                .unwrap_or_else(|| defaults.stroke_color.clone()),
            stroke_width: defaults.stroke_width,
            stroke_style: StrokeStyle::Solid,
            start_marker: arrow_marker(link.start_arrow.as_deref()),
            end_marker: arrow_marker(link.end_arrow.as_deref()),
        },
        start_inclination: link.start_inclination.clone(),
        end_inclination: link.end_inclination.clone(),
    })
}

/// A marker is drawn for any arrow value except a missing one or the literal `None`.
pub fn arrow_marker(raw: Option<&str>) -> Option<Marker> {
    match raw {
        Some(value) if value != "None" => Some(Marker::Arrow),
        _ => None,
    }
}

fn dangling_link_warning(link: &ArrowLink, layout: &TreeLayout<'_>) -> ImportWarning {
    let missing: Vec<&str> = [&link.source_node_id, &link.destination_node_id]
        .into_iter()
        .filter(|id| layout.mapped_id(id).is_none())
        .map(String::as_str)
        .collect();
    ImportWarning::new(
        WarningKind::DanglingArrowLink,
        format!(
            "Arrow link \"{}\" was skipped: node \"{}\" not found",
            link.id,
            missing.join("\", \"")
        ),
    )
    .with_node(link.source_node_id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindport_core::{ParseStats, SourceNode};

    fn result_with(root: SourceNode, arrow_links: Vec<ArrowLink>) -> ParseResult {
        ParseResult {
            title: root.text.clone(),
            version: None,
            root_node: Some(root),
            arrow_links,
            warnings: Vec::new(),
            errors: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    fn link(id: &str, from: &str, to: &str) -> ArrowLink {
        ArrowLink {
            id: id.to_string(),
            source_node_id: from.to_string(),
            destination_node_id: to.to_string(),
            color: None,
            start_arrow: None,
            end_arrow: None,
            start_inclination: None,
            end_inclination: None,
        }
    }

    fn convert_seq(result: &ParseResult) -> ConversionResult {
        convert_with(result, &ConvertOptions::default(), &mut IdGenerator::sequential())
    }

    #[test]
    fn markers_follow_arrow_attributes() {
        assert_eq!(arrow_marker(None), None);
        assert_eq!(arrow_marker(Some("None")), None);
        assert_eq!(arrow_marker(Some("Default")), Some(Marker::Arrow));
    }

    #[test]
    fn connection_defaults_and_remap() {
        let mut root = SourceNode::new("r", "Root");
        root.children = vec![SourceNode::new("a", "A"), SourceNode::new("b", "B")];
        let mut l = link("L1", "a", "b");
        l.end_arrow = Some("Default".to_string());
        l.start_arrow = Some("None".to_string());
        l.start_inclination = Some("10;0;".to_string());
        let converted = convert_seq(&result_with(root, vec![l]));

        assert_eq!(converted.connections.len(), 1);
        let c = &converted.connections[0];
        let a = converted.nodes.iter().find(|n| n.source_id == "a").unwrap();
        let b = converted.nodes.iter().find(|n| n.source_id == "b").unwrap();
        assert_eq!(c.source_id, a.id);
        assert_eq!(c.target_id, b.id);
        assert_eq!(c.source_link_id, "L1");
        assert_eq!(c.id, "conn_4");
        assert_eq!(c.style.path_type, PathType::Bezier);
        assert_eq!(c.style.stroke_color, "#6b7280");
        assert_eq!(c.style.stroke_width, 2.0);
        assert_eq!(c.style.stroke_style, StrokeStyle::Solid);
        assert_eq!(c.style.start_marker, None);
        assert_eq!(c.style.end_marker, Some(Marker::Arrow));
        assert_eq!(c.start_inclination.as_deref(), Some("10;0;"));
        assert!(converted.warnings.is_empty());
    }

    #[test]
    fn link_color_overrides_default_stroke() {
        let mut root = SourceNode::new("r", "Root");
        root.children = vec![SourceNode::new("a", "A")];
        let mut l = link("L1", "r", "a");
        l.color = Some("#ff0000".to_string());
        let converted = convert_seq(&result_with(root, vec![l]));
        assert_eq!(converted.connections[0].style.stroke_color, "#ff0000");
    }

    #[test]
    fn dangling_links_are_dropped_with_warning() {
        let root = SourceNode::new("r", "Root");
        let converted = convert_seq(&result_with(
            root,
            vec![link("L1", "r", "missing-id"), link("L2", "ghost", "r")],
        ));
        assert!(converted.connections.is_empty());
        assert_eq!(converted.warnings.len(), 2);
        assert!(
            converted
                .warnings
                .iter()
                .all(|w| w.kind == WarningKind::DanglingArrowLink)
        );
        assert!(converted.warnings[0].message.contains("missing-id"));
        assert!(converted.warnings[1].message.contains("ghost"));
        assert!(converted.errors.is_empty());
    }

    #[test]
    fn null_tree_converts_to_nothing() {
        let failed = mindport_core::parse("no markup here");
        let converted = convert_seq(&failed);
        assert!(converted.nodes.is_empty());
        assert!(converted.connections.is_empty());
        assert_eq!(converted.errors.len(), 1);
        assert_eq!(converted.title, "Imported Mind Map");
    }

    #[test]
    fn node_fields_are_carried_over() {
        let mut child = SourceNode::new("c", "Child");
        child.folded = Some(true);
        child.link = Some("https://example.com".to_string());
        child.note = Some("remember".to_string());
        let mut root = SourceNode::new("r", "Root");
        root.children = vec![child];
        let converted = convert_seq(&result_with(root, Vec::new()));

        let root = &converted.nodes[0];
        assert_eq!(root.node_type, NodeType::Root);
        assert_eq!(root.parent_id, None);
        assert_eq!(root.style.font_size, Some(18));

        let child = &converted.nodes[1];
        assert_eq!(child.node_type, NodeType::Child);
        assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
        assert!(child.folded);
        assert_eq!(child.link.as_deref(), Some("https://example.com"));
        assert_eq!(child.note.as_deref(), Some("remember"));
        assert_eq!(child.style.font_size, None);
    }
}
