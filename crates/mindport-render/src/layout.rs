use mindport_core::{IdGenerator, ImportConfig, Side, SourceNode};
use rustc_hash::FxHashMap;

use crate::model::{Point, Size};

/// Text-length sizing heuristic. Not a text measurement: wide fonts can still overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeHeuristic {
    pub min_width: f64,
    pub max_width: f64,
    pub char_width: f64,
    pub width_padding: f64,
    pub min_height: f64,
    pub chars_per_line: f64,
    pub line_height: f64,
}

impl SizeHeuristic {
    pub fn size_for(&self, text: &str) -> Size {
        let len = text.chars().count() as f64;
        let width = (len * self.char_width + self.width_padding)
            .max(self.min_width)
            .min(self.max_width);
        let lines = if self.chars_per_line > 0.0 {
            (len / self.chars_per_line).ceil()
        } else {
            1.0
        };
        let height = (lines * self.line_height + self.line_height).max(self.min_height);
        Size { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub root_x: f64,
    pub root_y: f64,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub sizing: SizeHeuristic,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

impl LayoutOptions {
    pub fn from_config(config: &ImportConfig) -> Self {
        let f = |key: &str| config.f64_or_default(key);
        Self {
            root_x: f("layout.rootX"),
            root_y: f("layout.rootY"),
            horizontal_spacing: f("layout.horizontalSpacing"),
            vertical_spacing: f("layout.verticalSpacing"),
            sizing: SizeHeuristic {
                min_width: f("layout.minNodeWidth"),
                max_width: f("layout.maxNodeWidth"),
                char_width: f("layout.charWidth"),
                width_padding: f("layout.widthPadding"),
                min_height: f("layout.minNodeHeight"),
                chars_per_line: f("layout.charsPerLine"),
                line_height: f("layout.lineHeight"),
            },
        }
    }
}

/// One node after layout. `source` borrows from the parsed tree.
#[derive(Debug, Clone)]
pub struct PlacedNode<'a> {
    pub source: &'a SourceNode,
    pub id: String,
    pub parent_id: Option<String>,
    pub depth: usize,
    /// `None` for the root.
    pub side: Option<Side>,
    pub position: Point,
    pub size: Size,
    pub sort_order: usize,
}

impl PlacedNode<'_> {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TreeLayout<'a> {
    /// Nodes in traversal order, which is also `sort_order` order.
    pub nodes: Vec<PlacedNode<'a>>,
    /// Source node id to generated node id. When source ids repeat, the first node wins.
    pub id_map: FxHashMap<String, String>,
}

impl TreeLayout<'_> {
    pub fn mapped_id(&self, source_id: &str) -> Option<&str> {
        self.id_map.get(source_id).map(String::as_str)
    }
}

/// Places every node of `root` in one depth-first pass over an explicit stack.
///
/// X depends only on depth and side. Each subtree occupies `max(verticalSpacing, sum of child
/// heights)` rows and its node is centered on its children. At the root, children are split
/// between the right and left sides; below the root every node inherits its parent's side.
pub fn layout_tree<'a>(
    root: &'a SourceNode,
    options: &LayoutOptions,
    ids: &mut IdGenerator,
) -> TreeLayout<'a> {
    let mut pass = LayoutPass {
        options,
        ids,
        layout: TreeLayout::default(),
        next_sort_order: 0,
    };
    pass.run(root);
    pass.layout
}

/// Splits the root's children into (left, right). Explicit positions are honored; the rest go
/// to whichever side has fewer members so far, left on ties.
pub fn partition_root_children(children: &[SourceNode]) -> (Vec<&SourceNode>, Vec<&SourceNode>) {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for child in children {
        let side = child.position.unwrap_or(if right.len() < left.len() {
            Side::Right
        } else {
            Side::Left
        });
        match side {
            Side::Left => left.push(child),
            Side::Right => right.push(child),
        }
    }
    (left, right)
}

struct LayoutPass<'a, 'o, 'i> {
    options: &'o LayoutOptions,
    ids: &'i mut IdGenerator,
    layout: TreeLayout<'a>,
    next_sort_order: usize,
}

/// A placed node whose children are still being stacked below `offset`.
struct Frame<'a> {
    index: usize,
    id: String,
    depth: usize,
    offset: f64,
    /// Children with their side, in placement order. At the root the right group comes first.
    children: Vec<(&'a SourceNode, Side)>,
    /// Where the root's left group starts in `children`.
    left_from: usize,
    next: usize,
    cursor: f64,
    /// Height of the root's right group once its left group has started.
    right_height: f64,
}

impl<'a> LayoutPass<'a, '_, '_> {
    fn run(&mut self, root: &'a SourceNode) {
        let row = self.options.vertical_spacing;
        let mut stack: Vec<Frame<'a>> = Vec::new();
        stack.extend(self.place(root, 0, None, self.options.root_y, None));

        while let Some(top) = stack.last_mut() {
            if top.next < top.children.len() {
                if top.next == top.left_from && top.next > 0 {
                    top.right_height = top.cursor - top.offset;
                    top.cursor = top.offset;
                }
                let (child, side) = top.children[top.next];
                top.next += 1;
                let placed = self.place(
                    child,
                    top.depth + 1,
                    Some(side),
                    top.cursor,
                    Some(top.id.as_str()),
                );
                match placed {
                    Some(frame) => stack.push(frame),
                    None => top.cursor += row,
                }
                continue;
            }

            let Some(done) = stack.pop() else {
                break;
            };
            let children_height = (done.cursor - done.offset).max(done.right_height);
            self.layout.nodes[done.index].position.y = done.offset + (children_height - row) / 2.0;
            if let Some(parent) = stack.last_mut() {
                parent.cursor += children_height.max(row);
            }
        }
    }

    /// Places `node` at vertical `offset`. Returns a frame for stacking its children, or `None`
    /// for a leaf, which occupies one row.
    fn place(
        &mut self,
        node: &'a SourceNode,
        depth: usize,
        side: Option<Side>,
        offset: f64,
        parent_id: Option<&str>,
    ) -> Option<Frame<'a>> {
        let id = self.ids.next_id("node");
        self.layout
            .id_map
            .entry(node.id.clone())
            .or_insert_with(|| id.clone());
        let sort_order = self.next_sort_order;
        self.next_sort_order += 1;

        let step = depth as f64 * self.options.horizontal_spacing;
        let x = match side {
            None => self.options.root_x,
            Some(Side::Left) => self.options.root_x - step,
            Some(Side::Right) => self.options.root_x + step,
        };
        let index = self.layout.nodes.len();
        self.layout.nodes.push(PlacedNode {
            source: node,
            id: id.clone(),
            parent_id: parent_id.map(str::to_string),
            depth,
            side,
            position: Point { x, y: offset },
            size: self.options.sizing.size_for(&node.text),
            sort_order,
        });

        if node.children.is_empty() {
            return None;
        }
        let (children, left_from) = match side {
            None => {
                let (left, right) = partition_root_children(&node.children);
                let left_from = right.len();
                let children = right
                    .into_iter()
                    .map(|child| (child, Side::Right))
                    .chain(left.into_iter().map(|child| (child, Side::Left)))
                    .collect();
                (children, left_from)
            }
            Some(side) => (
                node.children.iter().map(|child| (child, side)).collect(),
                node.children.len(),
            ),
        };
        Some(Frame {
            index,
            id,
            depth,
            offset,
            children,
            left_from,
            next: 0,
            cursor: offset,
            right_height: 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, text: &str) -> SourceNode {
        SourceNode::new(id, text)
    }

    fn positioned(id: &str, side: Side) -> SourceNode {
        let mut node = leaf(id, id);
        node.position = Some(side);
        node
    }

    fn run(root: &SourceNode) -> TreeLayout<'_> {
        layout_tree(root, &LayoutOptions::default(), &mut IdGenerator::sequential())
    }

    fn placed<'t, 'a>(layout: &'t TreeLayout<'a>, source_id: &str) -> &'t PlacedNode<'a> {
        layout
            .nodes
            .iter()
            .find(|n| n.source.id == source_id)
            .unwrap()
    }

    #[test]
    fn lone_root_sits_at_origin() {
        let root = leaf("r", "Root");
        let layout = run(&root);
        assert_eq!(layout.nodes.len(), 1);
        let r = &layout.nodes[0];
        assert_eq!(r.position, Point { x: 500.0, y: 400.0 });
        assert_eq!(r.sort_order, 0);
        assert_eq!(r.side, None);
        assert!(r.is_root());
        assert_eq!(layout.mapped_id("r"), Some("node_1"));
    }

    #[test]
    fn size_heuristic() {
        let sizing = LayoutOptions::default().sizing;
        assert_eq!(sizing.size_for(""), Size { width: 150.0, height: 50.0 });
        // 20 chars: 200 wide, one line.
        assert_eq!(
            sizing.size_for("abcdefghijabcdefghij"),
            Size { width: 200.0, height: 50.0 }
        );
        // 61 chars: clamped width, three lines.
        let long = "x".repeat(61);
        assert_eq!(sizing.size_for(&long), Size { width: 300.0, height: 100.0 });
        // Non-ASCII text is measured in characters.
        assert_eq!(sizing.size_for(&"é".repeat(20)).width, 200.0);
    }

    #[test]
    fn unpositioned_children_alternate_starting_left() {
        let mut root = leaf("r", "Root");
        root.children = (0..4).map(|i| leaf(&format!("c{i}"), "c")).collect();
        let (left, right) = partition_root_children(&root.children);
        let ids = |v: &[&SourceNode]| v.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&left), vec!["c0", "c2"]);
        assert_eq!(ids(&right), vec!["c1", "c3"]);
    }

    #[test]
    fn explicit_positions_feed_the_balance() {
        let mut root = leaf("r", "Root");
        root.children = vec![
            positioned("a", Side::Left),
            positioned("b", Side::Left),
            leaf("c", "c"),
            leaf("d", "d"),
        ];
        let (left, right) = partition_root_children(&root.children);
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert_eq!(right[0].id, "c");
    }

    #[test]
    fn right_side_is_laid_out_first() {
        let mut root = leaf("r", "Root");
        root.children = vec![positioned("l", Side::Left), positioned("rt", Side::Right)];
        let layout = run(&root);
        assert_eq!(placed(&layout, "rt").sort_order, 1);
        assert_eq!(placed(&layout, "l").sort_order, 2);
        assert_eq!(placed(&layout, "rt").position.x, 750.0);
        assert_eq!(placed(&layout, "l").position.x, 250.0);
        assert_eq!(placed(&layout, "rt").position.y, 400.0);
        assert_eq!(placed(&layout, "l").position.y, 400.0);
    }

    #[test]
    fn side_is_inherited_and_parent_is_centered() {
        let mut branch = positioned("b", Side::Left);
        branch.children = vec![leaf("b1", "x"), leaf("b2", "y"), leaf("b3", "z")];
        let mut root = leaf("r", "Root");
        root.children = vec![branch];
        let layout = run(&root);

        for id in ["b1", "b2", "b3"] {
            let n = placed(&layout, id);
            assert_eq!(n.side, Some(Side::Left));
            assert_eq!(n.depth, 2);
            assert_eq!(n.position.x, 0.0);
        }
        assert_eq!(placed(&layout, "b1").position.y, 400.0);
        assert_eq!(placed(&layout, "b2").position.y, 480.0);
        assert_eq!(placed(&layout, "b3").position.y, 560.0);
        // Three rows of 80: centered on the middle child.
        assert_eq!(placed(&layout, "b").position.y, 480.0);
        assert_eq!(placed(&layout, "r").position.y, 480.0);
    }

    #[test]
    fn sort_order_blocks_are_contiguous() {
        let mut a = positioned("a", Side::Right);
        a.children = vec![leaf("a1", "1"), leaf("a2", "2")];
        let mut b = positioned("b", Side::Left);
        b.children = vec![leaf("b1", "1")];
        let mut root = leaf("r", "Root");
        root.children = vec![b, a];
        let layout = run(&root);
        let order: Vec<(&str, usize)> = layout
            .nodes
            .iter()
            .map(|n| (n.source.id.as_str(), n.sort_order))
            .collect();
        assert_eq!(
            order,
            vec![("r", 0), ("a", 1), ("a1", 2), ("a2", 3), ("b", 4), ("b1", 5)]
        );
        assert_eq!(placed(&layout, "a").parent_id.as_deref(), Some("node_1"));
        assert_eq!(placed(&layout, "a1").parent_id.as_deref(), Some("node_2"));
    }

    #[test]
    fn long_chains_are_laid_out_without_recursion() {
        let mut node = leaf("n1200", "x");
        for i in (0..1200).rev() {
            let mut parent = leaf(&format!("n{i}"), "x");
            parent.children.push(node);
            node = parent;
        }
        let layout = run(&node);
        assert_eq!(layout.nodes.len(), 1201);
        let deepest = placed(&layout, "n1200");
        assert_eq!(deepest.depth, 1200);
        assert_eq!(deepest.side, Some(Side::Left));
        assert_eq!(deepest.position, Point { x: 500.0 - 1200.0 * 250.0, y: 400.0 });
        assert_eq!(placed(&layout, "n0").position.y, 400.0);
    }

    #[test]
    fn repeated_source_ids_map_to_first_node() {
        let mut root = leaf("r", "Root");
        root.children = vec![leaf("dup", "first"), leaf("dup", "second")];
        let layout = run(&root);
        assert_eq!(layout.nodes.len(), 3);
        assert_eq!(layout.mapped_id("dup"), Some("node_2"));
    }

    #[test]
    fn layout_is_deterministic_with_sequential_ids() {
        let mut root = leaf("r", "Root");
        root.children = (0..5)
            .map(|i| {
                let mut c = leaf(&format!("c{i}"), &"t".repeat(i * 13));
                c.children = vec![leaf(&format!("c{i}x"), "leaf")];
                c
            })
            .collect();
        let mut ids = IdGenerator::sequential();
        let first: Vec<_> = layout_tree(&root, &LayoutOptions::default(), &mut ids)
            .nodes
            .into_iter()
            .map(|n| (n.id, n.position, n.size))
            .collect();
        ids.reset();
        let second: Vec<_> = layout_tree(&root, &LayoutOptions::default(), &mut ids)
            .nodes
            .into_iter()
            .map(|n| (n.id, n.position, n.size))
            .collect();
        assert_eq!(first, second);
    }
}
