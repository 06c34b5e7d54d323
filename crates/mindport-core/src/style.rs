//! Per-element style mappers for `<font>`, `<edge>`, `<cloud>` and `<icon>`.
//!
//! Each mapper reads one element's attributes and yields a partial [`StyleElement`]; a node's
//! [`SourceStyle`] is the left fold of its elements in document order.

use crate::attrs::{get_attr, get_flag, parse_int_prefix};
use crate::color::normalize_color;
use crate::model::SourceStyle;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontFragment {
    pub family: Option<String>,
    pub size: Option<i64>,
    pub weight: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeFragment {
    pub color: Option<String>,
    pub style: Option<String>,
    pub width: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudFragment {
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleElement {
    Font(FontFragment),
    Edge(EdgeFragment),
    Cloud(CloudFragment),
    Icon(String),
}

pub fn font_fragment(attrs: &str) -> FontFragment {
    FontFragment {
        family: get_attr(attrs, "NAME"),
        size: get_attr(attrs, "SIZE").and_then(|v| parse_int_prefix(&v)),
        // A false/missing flag leaves the field open for a later default.
        weight: get_flag(attrs, "BOLD")
            .filter(|b| *b)
            .map(|_| "bold".to_string()),
        style: get_flag(attrs, "ITALIC")
            .filter(|b| *b)
            .map(|_| "italic".to_string()),
    }
}

pub fn edge_fragment(attrs: &str) -> EdgeFragment {
    EdgeFragment {
        color: normalize_color(get_attr(attrs, "COLOR").as_deref()),
        style: get_attr(attrs, "STYLE"),
        width: get_attr(attrs, "WIDTH").and_then(|w| edge_width(&w)),
    }
}

/// `thin` is 1, `parent` (inherit) has no destination equivalent, numbers parse as integers.
pub fn edge_width(raw: &str) -> Option<i64> {
    match raw.trim() {
        "thin" => Some(1),
        "parent" => None,
        other => parse_int_prefix(other),
    }
}

pub fn cloud_fragment(attrs: &str) -> CloudFragment {
    CloudFragment {
        color: normalize_color(get_attr(attrs, "COLOR").as_deref()),
    }
}

pub fn icon_name(attrs: &str) -> Option<String> {
    get_attr(attrs, "BUILTIN")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl SourceStyle {
    /// Applies one element on top of the current style. Present fields overwrite, missing
    /// fields keep their value; icons accumulate.
    pub fn apply(&mut self, element: StyleElement) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        match element {
            StyleElement::Font(font) => {
                set(&mut self.font_family, font.family);
                set(&mut self.font_size, font.size);
                set(&mut self.font_weight, font.weight);
                set(&mut self.font_style, font.style);
            }
            StyleElement::Edge(edge) => {
                set(&mut self.edge_color, edge.color);
                set(&mut self.edge_style, edge.style);
                set(&mut self.edge_width, edge.width);
            }
            StyleElement::Cloud(cloud) => {
                self.has_cloud = true;
                set(&mut self.cloud_color, cloud.color);
            }
            StyleElement::Icon(name) => self.icons.push(name),
        }
    }

    pub fn fold(mut self, elements: impl IntoIterator<Item = StyleElement>) -> Self {
        for element in elements {
            self.apply(element);
        }
        self
    }
}
