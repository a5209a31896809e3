//! Symbolic scene graph.
//!
//! The wire shape is `{ "nodes": [string], "edges": [string] }` where each
//! edge reads `<object>(<relation>)<target>`, e.g. `red_mug(in)red_box`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Target name used for the tabletop.
pub const TABLE: &str = "table";

/// Target name used for held objects.
pub const HAND: &str = "hand";

/// Spatial relation between an object and its support or container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Relation {
    /// Resting on top of the target.
    On,
    /// Contained by the target.
    In,
    /// Off the tabletop entirely.
    Out,
    /// Held by the manipulator (rendered as `(in)hand`).
    InHand,
}

impl Relation {
    /// Label written between the parentheses.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "on",
            Self::In | Self::InHand => "in",
            Self::Out => "out",
        }
    }
}

/// One labeled, directed fact `(object, relation, target)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Display name of the subject.
    pub object: String,
    /// The relation.
    pub relation: Relation,
    /// Display name of the target (`table`, `hand`, or an object).
    pub target: String,
}

impl Edge {
    /// Create an edge.
    #[must_use]
    pub fn new(object: impl Into<String>, relation: Relation, target: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            relation,
            target: target.into(),
        }
    }

    /// Create the `(in)hand` edge for a held object.
    #[must_use]
    pub fn in_hand(object: impl Into<String>) -> Self {
        Self::new(object, Relation::InHand, HAND)
    }

    /// Parse the wire form `<object>(<relation>)<target>`.
    ///
    /// # Example
    ///
    /// ```
    /// use desk_types::{Edge, Relation};
    ///
    /// let edge = Edge::parse("red_mug(in)red_box").unwrap();
    /// assert_eq!(edge.relation, Relation::In);
    /// assert_eq!(Edge::parse("cube(in)hand").unwrap().relation, Relation::InHand);
    /// assert!(Edge::parse("garbage").is_none());
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let open = text.find('(')?;
        let close = open + text[open..].find(')')?;
        let object = &text[..open];
        let label = &text[open + 1..close];
        let target = &text[close + 1..];
        if object.is_empty() || target.is_empty() {
            return None;
        }
        let relation = match (label, target) {
            ("in", HAND) => Relation::InHand,
            ("in", _) => Relation::In,
            ("on", _) => Relation::On,
            ("out", _) => Relation::Out,
            _ => return None,
        };
        Some(Self::new(object, relation, target))
    }
}

impl std::fmt::Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}){}", self.object, self.relation.label(), self.target)
    }
}

/// Scene graph snapshot, rebuilt from scratch on every query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SceneGraph {
    /// Display names, containers decorated with `(open)`/`(closed)`.
    pub nodes: Vec<String>,
    /// Edges in wire form.
    pub edges: Vec<String>,
}

impl SceneGraph {
    /// Create an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node.
    pub fn push_node(&mut self, node: impl Into<String>) {
        self.nodes.push(node.into());
    }

    /// Append an edge.
    pub fn push_edge(&mut self, edge: &Edge) {
        self.edges.push(edge.to_string());
    }

    /// Returns `true` if the exact edge is present.
    #[must_use]
    pub fn contains(&self, object: &str, relation: Relation, target: &str) -> bool {
        let wanted = Edge::new(object, relation, target).to_string();
        self.edges.iter().any(|e| *e == wanted)
    }

    /// Parsed edges whose subject is `object`.
    #[must_use]
    pub fn edges_of(&self, object: &str) -> Vec<Edge> {
        self.edges
            .iter()
            .filter_map(|e| Edge::parse(e))
            .filter(|e| e.object == object)
            .collect()
    }

    /// Returns `true` if any object is currently held.
    #[must_use]
    pub fn has_held_objects(&self) -> bool {
        self.edges
            .iter()
            .filter_map(|e| Edge::parse(e))
            .any(|e| e.relation == Relation::InHand)
    }
}

/// Decorate a toggleable container's node with its state suffix.
#[must_use]
pub fn decorated_node(name: &str, open: bool) -> String {
    format!("{name}({})", if open { "open" } else { "closed" })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_display() {
        assert_eq!(Edge::new("a", Relation::On, "b").to_string(), "a(on)b");
        assert_eq!(Edge::new("a", Relation::Out, TABLE).to_string(), "a(out)table");
        assert_eq!(Edge::in_hand("a").to_string(), "a(in)hand");
    }

    #[test]
    fn test_edge_parse_with_path_names() {
        let e = Edge::parse("red_cube(in)short_cabinet/drawer_low").unwrap();
        assert_eq!(e.object, "red_cube");
        assert_eq!(e.relation, Relation::In);
        assert_eq!(e.target, "short_cabinet/drawer_low");
    }

    #[test]
    fn test_edge_parse_rejects_unknown_label() {
        assert!(Edge::parse("a(under)b").is_none());
        assert!(Edge::parse("(on)b").is_none());
        assert!(Edge::parse("a(on)").is_none());
    }

    #[test]
    fn test_graph_queries() {
        let mut g = SceneGraph::new();
        g.push_node("red_box");
        g.push_node("red_mug");
        g.push_edge(&Edge::new("red_box", Relation::On, TABLE));
        g.push_edge(&Edge::new("red_mug", Relation::In, "red_box"));

        assert!(g.contains("red_mug", Relation::In, "red_box"));
        assert!(!g.contains("red_mug", Relation::On, "red_box"));
        assert_eq!(g.edges_of("red_box").len(), 1);
        assert!(!g.has_held_objects());

        g.push_edge(&Edge::in_hand("blue_cube"));
        assert!(g.has_held_objects());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_graph_wire_shape() {
        let mut g = SceneGraph::new();
        g.push_node("table");
        g.push_edge(&Edge::new("red_box", Relation::On, TABLE));
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, r#"{"nodes":["table"],"edges":["red_box(on)table"]}"#);
        let back: SceneGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_decorated_node() {
        assert_eq!(decorated_node("lid_box", true), "lid_box(open)");
        assert_eq!(decorated_node("c/d", false), "c/d(closed)");
    }
}
