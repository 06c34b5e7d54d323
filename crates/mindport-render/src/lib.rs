#![forbid(unsafe_code)]

//! Layout and styling for imported mind maps (headless).
//!
//! Turns a [`mindport_core::ParseResult`] into positioned, styled nodes and cross-link
//! connections. Positions come from a deterministic left/right tree layout and node sizes from
//! a text-length heuristic; there is no text measurement or rendering here.

pub mod convert;
pub mod layout;
pub mod model;
pub mod style;

pub use convert::{ConnectionDefaults, ConvertOptions, convert_with};
pub use layout::{LayoutOptions, PlacedNode, SizeHeuristic, TreeLayout, layout_tree};
pub use model::{
    ConnectionStyle, ConversionResult, MappedConnection, MappedNode, Marker, NodeShape, NodeStyle,
    NodeType, PathType, Point, Size, StrokeStyle,
};
pub use style::{RootStyleDefaults, map_icon, map_style};

use mindport_core::{IdGenerator, Importer, ParseResult};

/// Converts `result` with the default options and a fresh [`IdGenerator`].
pub fn convert(result: &ParseResult) -> ConversionResult {
    convert_with(result, &ConvertOptions::default(), &mut IdGenerator::new())
}

/// Parse, validate and convert with the default configuration.
pub fn parse_and_convert(text: &str) -> ConversionResult {
    parse_and_convert_with(&Importer::new(), text, &mut IdGenerator::new())
}

/// Parse, validate and convert using `importer`'s configuration for every stage.
pub fn parse_and_convert_with(
    importer: &Importer,
    text: &str,
    ids: &mut IdGenerator,
) -> ConversionResult {
    let parsed = importer.validate(importer.parse_with_ids(text, ids));
    convert_with(&parsed, &ConvertOptions::from_config(importer.config()), ids)
}
