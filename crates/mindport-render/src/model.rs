use mindport_core::{ImportError, ImportWarning};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Root,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Rounded,
    Rectangle,
    Ellipse,
    Cloud,
}

/// Node style in the destination vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
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
    pub shape: NodeShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<i64>,
    pub border_radius: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedNode {
    pub id: String,
    /// Id of the node in the source document.
    pub source_id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// `None` only for the root.
    pub parent_id: Option<String>,
    pub position: Point,
    pub size: Size,
    pub style: NodeStyle,
    #[serde(default)]
    pub folded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub sort_order: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    Bezier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    Solid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    Arrow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStyle {
    pub path_type: PathType,
    pub stroke_color: String,
    pub stroke_width: f64,
    pub stroke_style: StrokeStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_marker: Option<Marker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_marker: Option<Marker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedConnection {
    pub id: String,
    /// Id of the arrow link in the source document.
    pub source_link_id: String,
    pub source_id: String,
    pub target_id: String,
    pub style: ConnectionStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_inclination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_inclination: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub title: String,
    pub nodes: Vec<MappedNode>,
    pub connections: Vec<MappedConnection>,
    pub warnings: Vec<ImportWarning>,
    pub errors: Vec<ImportError>,
}
