use mindport_core::{ImportConfig, ShapeHint, SourceStyle};

use crate::model::{NodeShape, NodeStyle};

/// Fallback style values for the root node.
#[derive(Debug, Clone, PartialEq)]
pub struct RootStyleDefaults {
    pub background_color: String,
    pub text_color: String,
    pub font_size: i64,
    pub font_weight: String,
}

impl Default for RootStyleDefaults {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl RootStyleDefaults {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            background_color: config.str_or_default("style.rootBackgroundColor"),
            text_color: config.str_or_default("style.rootTextColor"),
            font_size: config.f64_or_default("style.rootFontSize").round() as i64,
            font_weight: config.str_or_default("style.rootFontWeight"),
        }
    }
}

/// Maps a parsed style bag onto the destination style vocabulary.
///
/// Source values always win. The root falls back to `root_defaults` for its colors and font;
/// other nodes leave those fields empty.
pub fn map_style(source: &SourceStyle, is_root: bool, root_defaults: &RootStyleDefaults) -> NodeStyle {
    let root_fallback = |value: &str| is_root.then(|| value.to_string());

    let mut background_color = source
        .background_color
        .clone()
        .or_else(|| root_fallback(&root_defaults.background_color));

    let shape = if source.has_cloud {
        if let Some(cloud_color) = &source.cloud_color {
            background_color = Some(cloud_color.clone());
        }
        NodeShape::Cloud
    } else {
        match source.shape {
            Some(ShapeHint::Ellipse) => NodeShape::Ellipse,
            Some(ShapeHint::Rectangle) => NodeShape::Rectangle,
            None => NodeShape::Rounded,
        }
    };

    NodeStyle {
        background_color,
        text_color: source
            .text_color
            .clone()
            .or_else(|| root_fallback(&root_defaults.text_color)),
        font_family: source.font_family.clone(),
        font_size: source
            .font_size
            .or_else(|| is_root.then_some(root_defaults.font_size)),
        font_weight: source
            .font_weight
            .clone()
            .or_else(|| root_fallback(&root_defaults.font_weight)),
        font_style: source.font_style.clone(),
        shape,
        icon: source.icons.first().map(|name| map_icon(name)),
        border_color: source.edge_color.clone(),
        border_width: source.edge_width,
        border_radius: border_radius(shape, is_root),
    }
}

pub fn border_radius(shape: NodeShape, is_root: bool) -> i64 {
    match shape {
        NodeShape::Ellipse | NodeShape::Cloud => 50,
        NodeShape::Rectangle => 0,
        NodeShape::Rounded if is_root => 12,
        NodeShape::Rounded => 8,
    }
}

/// Built-in icon name to destination icon name. Priority icons (`full-1` .. `full-9`) map to
/// their digit; unknown names are returned unchanged.
pub fn map_icon(name: &str) -> String {
    let priority = name
        .strip_prefix("full-")
        .filter(|digit| digit.len() == 1 && digit.bytes().all(|b| b.is_ascii_digit()));
    if let Some(digit) = priority {
        return digit.to_string();
    }
    let mapped = match name {
        "idea" => "lightbulb",
        "help" => "question",
        "yes" => "important",
        "messagebox_warning" => "warning",
        "button_ok" => "check",
        "button_cancel" => "cancel",
        "stop-sign" => "stop",
        "flag" | "flag-green" | "flag-orange" | "flag-pink" | "flag-yellow" | "flag-black" => {
            "flag"
        }
        "bookmark" => "star",
        "clock" => "clock",
        "attach" => "attachment",
        "info" => "info",
        "list" => "list",
        "calendar" => "calendar",
        "mail" => "mail",
        "password" => "lock",
        "smiley-good" => "happy",
        "smiley-bad" => "sad",
        _ => name,
    };
    mapped.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RootStyleDefaults {
        RootStyleDefaults::default()
    }

    #[test]
    fn root_gets_defaults_only_where_source_is_silent() {
        let source = SourceStyle {
            text_color: Some("#112233".to_string()),
            ..SourceStyle::default()
        };
        let style = map_style(&source, true, &defaults());
        assert_eq!(style.background_color.as_deref(), Some("#3b82f6"));
        assert_eq!(style.text_color.as_deref(), Some("#112233"));
        assert_eq!(style.font_size, Some(18));
        assert_eq!(style.font_weight.as_deref(), Some("bold"));
        assert_eq!(style.font_style, None);
        assert_eq!(style.shape, NodeShape::Rounded);
        assert_eq!(style.border_radius, 12);
    }

    #[test]
    fn non_root_without_style_stays_empty() {
        let style = map_style(&SourceStyle::default(), false, &defaults());
        assert_eq!(style.background_color, None);
        assert_eq!(style.text_color, None);
        assert_eq!(style.font_size, None);
        assert_eq!(style.font_weight, None);
        assert_eq!(style.icon, None);
        assert_eq!(style.shape, NodeShape::Rounded);
        assert_eq!(style.border_radius, 8);
    }

    #[test]
    fn cloud_overrides_shape_and_background() {
        let source = SourceStyle {
            background_color: Some("#ffeecc".to_string()),
            has_cloud: true,
            cloud_color: Some("#f0f0f0".to_string()),
            shape: Some(ShapeHint::Rectangle),
            ..SourceStyle::default()
        };
        let style = map_style(&source, false, &defaults());
        assert_eq!(style.shape, NodeShape::Cloud);
        assert_eq!(style.background_color.as_deref(), Some("#f0f0f0"));
        assert_eq!(style.border_radius, 50);
    }

    #[test]
    fn cloud_without_color_keeps_background() {
        let source = SourceStyle {
            background_color: Some("#ffeecc".to_string()),
            has_cloud: true,
            ..SourceStyle::default()
        };
        let style = map_style(&source, false, &defaults());
        assert_eq!(style.shape, NodeShape::Cloud);
        assert_eq!(style.background_color.as_deref(), Some("#ffeecc"));
    }

    #[test]
    fn shape_hints_and_radius() {
        let ellipse = SourceStyle {
            shape: Some(ShapeHint::Ellipse),
            ..SourceStyle::default()
        };
        let rect = SourceStyle {
            shape: Some(ShapeHint::Rectangle),
            ..SourceStyle::default()
        };
        let a = map_style(&ellipse, true, &defaults());
        assert_eq!((a.shape, a.border_radius), (NodeShape::Ellipse, 50));
        let b = map_style(&rect, true, &defaults());
        assert_eq!((b.shape, b.border_radius), (NodeShape::Rectangle, 0));
    }

    #[test]
    fn edge_becomes_border_and_first_icon_wins() {
        let source = SourceStyle {
            edge_color: Some("#ff6600".to_string()),
            edge_width: Some(1),
            icons: vec!["full-1".to_string(), "idea".to_string()],
            ..SourceStyle::default()
        };
        let style = map_style(&source, false, &defaults());
        assert_eq!(style.border_color.as_deref(), Some("#ff6600"));
        assert_eq!(style.border_width, Some(1));
        assert_eq!(style.icon.as_deref(), Some("1"));
    }

    #[test]
    fn icon_table() {
        assert_eq!(map_icon("full-7"), "7");
        assert_eq!(map_icon("idea"), "lightbulb");
        assert_eq!(map_icon("messagebox_warning"), "warning");
        assert_eq!(map_icon("full-10"), "full-10");
        assert_eq!(map_icon("my-custom"), "my-custom");
    }

    #[test]
    fn configured_root_defaults() {
        let mut config = ImportConfig::default();
        config.set_value("style.rootBackgroundColor", serde_json::json!("#000000"));
        config.set_value("style.rootFontSize", serde_json::json!(24));
        let style = map_style(
            &SourceStyle::default(),
            true,
            &RootStyleDefaults::from_config(&config),
        );
        assert_eq!(style.background_color.as_deref(), Some("#000000"));
        assert_eq!(style.font_size, Some(24));
    }
}
