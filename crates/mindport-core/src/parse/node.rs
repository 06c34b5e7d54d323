use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

use super::ParseContext;
use crate::attrs::{decode_entities, get_attr, get_flag};
use crate::color::normalize_color;
use crate::model::{ArrowLink, ShapeHint, Side, SourceNode, SourceStyle, WarningKind};
use crate::scan::{close_tag_len, find_matching_close, find_open_tag, open_tags, read_open_tag};
use crate::style::{StyleElement, cloud_fragment, edge_fragment, font_fragment, icon_name};

const NODE: &str = "node";

/// Parses the `<node>` element that `span` starts with, including its whole subtree.
///
/// Returns `None` when `span` does not start with a node open tag. Malformed content never
/// fails the call: unclosed elements become warnings on `cx` and the node keeps whatever was
/// parsed before the problem. Descendants are walked with an explicit stack; children nested
/// deeper than `cx.max_depth` are skipped with a warning on their parent.
pub(crate) fn parse_node(span: &str, cx: &mut ParseContext<'_>) -> Option<SourceNode> {
    if find_open_tag(span, NODE, 0) != Some(0) {
        return None;
    }
    let open = read_open_tag(span, NODE, 0)?;
    if open.self_closing {
        return Some(node_from_attrs(open.attrs, cx).0);
    }
    let Some(close) = find_matching_close(span, NODE, open.end) else {
        let (node, _) = node_from_attrs(open.attrs, cx);
        cx.warn(
            WarningKind::UnclosedNode,
            format!("Node \"{}\" has no closing tag; children were skipped", node.id),
            Some(&node.id),
        );
        return Some(node);
    };

    let mut stack = vec![open_branch(open.attrs, &span[open.end..close], cx)];
    loop {
        let child_depth = stack.len();
        let Some(top) = stack.last_mut() else {
            return None;
        };
        match next_child(top) {
            Some(_) if child_depth > cx.max_depth => {
                cx.warn(
                    WarningKind::UnresolvedChild,
                    format!(
                        "Children of node \"{}\" exceed the depth limit of {} and were skipped",
                        top.node.id, cx.max_depth
                    ),
                    Some(&top.node.id),
                );
                top.cursor = top.inner.len();
            }
            Some(ChildElement { attrs, inner: None }) => {
                let (child, _) = node_from_attrs(attrs, cx);
                top.node.children.push(child);
            }
            Some(ChildElement {
                attrs,
                inner: Some(inner),
            }) => {
                let frame = open_branch(attrs, inner, cx);
                stack.push(frame);
            }
            None => {
                let done = stack.pop()?;
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(done.node),
                    None => return Some(done.node),
                }
            }
        }
    }
}

/// A delimited node whose children are still being walked.
struct Frame<'s> {
    node: SourceNode,
    inner: &'s str,
    cursor: usize,
}

/// A direct child `<node>` element. `inner` is `None` for a self-closing tag.
struct ChildElement<'s> {
    attrs: &'s str,
    inner: Option<&'s str>,
}

/// Builds a delimited node from its attributes and the content between its tags.
fn open_branch<'s>(attrs: &'s str, inner: &'s str, cx: &mut ParseContext<'_>) -> Frame<'s> {
    let (mut node, has_text_attr) = node_from_attrs(attrs, cx);
    let scope: Cow<'_, str> = if cx.strict_element_scope {
        Cow::Owned(without_child_nodes(inner))
    } else {
        Cow::Borrowed(inner)
    };

    node.style = std::mem::take(&mut node.style).fold(style_elements(&scope));
    collect_arrow_links(&scope, &node.id, cx);
    apply_rich_content(&mut node, &scope, has_text_attr);
    Frame {
        node,
        inner,
        cursor: 0,
    }
}

/// Advances past the next direct child of `frame`.
///
/// `frame.inner` lies between a matched pair of tags, so every child open tag in it is
/// terminated and every delimited child is matched.
fn next_child<'s>(frame: &mut Frame<'s>) -> Option<ChildElement<'s>> {
    let inner = frame.inner;
    let at = find_open_tag(inner, NODE, frame.cursor)?;
    let open = read_open_tag(inner, NODE, at)?;
    if open.self_closing {
        frame.cursor = open.end;
        return Some(ChildElement {
            attrs: open.attrs,
            inner: None,
        });
    }
    let close = find_matching_close(inner, NODE, open.end)?;
    frame.cursor = close + close_tag_len(NODE);
    Some(ChildElement {
        attrs: open.attrs,
        inner: Some(&inner[open.end..close]),
    })
}

fn node_from_attrs(attrs: &str, cx: &mut ParseContext<'_>) -> (SourceNode, bool) {
    let id = get_attr(attrs, "ID")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| cx.synthesize_id("node"));
    let text = get_attr(attrs, "TEXT");
    let has_text_attr = text.is_some();

    let style = SourceStyle {
        background_color: normalize_color(get_attr(attrs, "BACKGROUND_COLOR").as_deref()),
        text_color: normalize_color(get_attr(attrs, "COLOR").as_deref()),
        shape: get_attr(attrs, "STYLE").and_then(|s| shape_hint(&s)),
        ..SourceStyle::default()
    };

    let node = SourceNode {
        id,
        text: text.unwrap_or_default(),
        position: get_attr(attrs, "POSITION").and_then(|p| Side::parse(&p)),
        folded: get_flag(attrs, "FOLDED"),
        link: get_attr(attrs, "LINK").filter(|l| !l.trim().is_empty()),
        note: None,
        style,
        children: Vec::new(),
    };
    (node, has_text_attr)
}

fn shape_hint(raw: &str) -> Option<ShapeHint> {
    match raw.trim() {
        "bubble" => Some(ShapeHint::Ellipse),
        "fork" => Some(ShapeHint::Rectangle),
        _ => None,
    }
}

/// Style elements grouped by kind, each group in document order.
fn style_elements(scope: &str) -> Vec<StyleElement> {
    let fonts = open_tags(scope, "font").map(|t| StyleElement::Font(font_fragment(t.attrs)));
    let edges = open_tags(scope, "edge").map(|t| StyleElement::Edge(edge_fragment(t.attrs)));
    let clouds = open_tags(scope, "cloud").map(|t| StyleElement::Cloud(cloud_fragment(t.attrs)));
    let icons = open_tags(scope, "icon").filter_map(|t| icon_name(t.attrs).map(StyleElement::Icon));
    fonts.chain(edges).chain(clouds).chain(icons).collect()
}

fn collect_arrow_links(scope: &str, source_id: &str, cx: &mut ParseContext<'_>) {
    for tag in open_tags(scope, "arrowlink") {
        let attrs = tag.attrs;
        let id = get_attr(attrs, "ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| cx.synthesize_id("arrow"));
        cx.arrow_links.push(ArrowLink {
            id,
            source_node_id: source_id.to_string(),
            destination_node_id: get_attr(attrs, "DESTINATION")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            color: normalize_color(get_attr(attrs, "COLOR").as_deref()),
            start_arrow: get_attr(attrs, "STARTARROW"),
            end_arrow: get_attr(attrs, "ENDARROW"),
            start_inclination: get_attr(attrs, "STARTINCLINATION"),
            end_inclination: get_attr(attrs, "ENDINCLINATION"),
        });
    }
}

/// `<richcontent TYPE="NODE">` supplies text when `TEXT` is missing; `TYPE="NOTE"` becomes the
/// note. The first element of each type wins.
fn apply_rich_content(node: &mut SourceNode, scope: &str, has_text_attr: bool) {
    for tag in open_tags(scope, "richcontent") {
        if tag.self_closing {
            continue;
        }
        let Some(close) = find_matching_close(scope, "richcontent", tag.end) else {
            continue;
        };
        let kind = get_attr(tag.attrs, "TYPE").unwrap_or_default();
        let body = &scope[tag.end..close];
        if kind.eq_ignore_ascii_case("NODE") && !has_text_attr && node.text.is_empty() {
            node.text = html_to_text(body);
        } else if kind.eq_ignore_ascii_case("NOTE") && node.note.is_none() {
            let note = html_to_text(body);
            if !note.is_empty() {
                node.note = Some(note);
            }
        }
    }
}

fn markup_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<head>.*?</head>|<[^>]*>").expect("valid regex"))
}

fn whitespace_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

/// Flattens an embedded HTML fragment to plain text.
fn html_to_text(html: &str) -> String {
    let stripped = markup_tag_regex().replace_all(html, " ");
    let decoded = decode_entities(&stripped);
    whitespace_regex()
        .replace_all(decoded.trim(), " ")
        .into_owned()
}

/// `inner` with every direct child `<node>` element cut out. An unclosed child ends the
/// content: nothing after it is attributed to the parent.
fn without_child_nodes(inner: &str) -> String {
    let mut own = String::with_capacity(inner.len());
    let mut cursor = 0;
    while let Some(at) = find_open_tag(inner, NODE, cursor) {
        own.push_str(&inner[cursor..at]);
        let Some(open) = read_open_tag(inner, NODE, at) else {
            return own;
        };
        if open.self_closing {
            cursor = open.end;
            continue;
        }
        match find_matching_close(inner, NODE, open.end) {
            Some(close) => cursor = close + close_tag_len(NODE),
            None => return own,
        }
    }
    own.push_str(&inner[cursor..]);
    own
}
