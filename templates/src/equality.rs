//! Structural equality between concrete nodes.
//!
//! Two nodes are equal when they have the same kind, equal leaves and
//! pairwise equal children. Spans are never compared, so the same code at two
//! different places in a file compares equal.

use estree::{Edge, Node, NodeList};

pub fn nodes_equal(a: &Node, b: &Node) -> bool {
    a.kind_name() == b.kind_name() && leaves_equal(a, b) && edges_equal(a, b)
}

pub fn optional_nodes_equal(a: Option<&Node>, b: Option<&Node>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => nodes_equal(a, b),
        _ => false,
    }
}

/// Equal length and elementwise equal, holes aligning with holes.
pub fn lists_equal(a: NodeList<'_>, b: NodeList<'_>) -> bool {
    a.len() == b.len() && a.iter().zip(b.iter()).all(|(a, b)| optional_nodes_equal(a, b))
}

/// Compare the scalar properties of two nodes of the same kind.
pub(crate) fn leaves_equal(a: &Node, b: &Node) -> bool {
    let a_leaves = a.kind.leaves();
    let b_leaves = b.kind.leaves();
    a_leaves.len() == b_leaves.len()
        && a_leaves
            .iter()
            .zip(&b_leaves)
            .all(|((a_key, a_leaf), (b_key, b_leaf))| a_key == b_key && a_leaf == b_leaf)
}

fn edges_equal(a: &Node, b: &Node) -> bool {
    let a_edges = a.kind.edges();
    let b_edges = b.kind.edges();
    a_edges.len() == b_edges.len()
        && a_edges
            .iter()
            .zip(&b_edges)
            .all(|((_, a_edge), (_, b_edge))| match (a_edge, b_edge) {
                (Edge::Node(a), Edge::Node(b)) => optional_nodes_equal(*a, *b),
                (Edge::List(a), Edge::List(b)) => lists_equal(*a, *b),
                _ => false,
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use estree::{NodeKind, ParserOptions};

    fn expression(source: &str) -> Node {
        let program = estree::parse(source, &ParserOptions::default()).expect("parse failed");
        let NodeKind::Program { mut body, .. } = program.kind else {
            panic!("expected program");
        };
        match body.remove(0).kind {
            NodeKind::ExpressionStatement { expression } => *expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn spans_and_whitespace_are_ignored() {
        assert!(nodes_equal(&expression("a.b( c )"), &expression("a.b(c)")));
    }

    #[test]
    fn names_and_operators_are_compared() {
        assert!(!nodes_equal(&expression("a + b"), &expression("a + c")));
        assert!(!nodes_equal(&expression("a + b"), &expression("a - b")));
    }

    #[test]
    fn literals_compare_value_and_raw_text() {
        assert!(nodes_equal(&expression("1"), &expression("1")));
        assert!(nodes_equal(&expression("'a'"), &expression("'a'")));
        assert!(!nodes_equal(&expression("1"), &expression("1.0")));
        assert!(!nodes_equal(&expression("0"), &expression("0x0")));
        assert!(!nodes_equal(&expression("1"), &expression("1e0")));
        assert!(!nodes_equal(&expression("'a'"), &expression("\"a\"")));
        assert!(!nodes_equal(&expression("'a'"), &expression("'b'")));
        assert!(!nodes_equal(&expression("/a/"), &expression("/a/g")));
    }

    #[test]
    fn holes_only_match_holes() {
        assert!(nodes_equal(&expression("[a, , b]"), &expression("[a, , b]")));
        assert!(!nodes_equal(&expression("[a, , b]"), &expression("[a, c, b]")));
        assert!(!nodes_equal(&expression("[a, b]"), &expression("[a, b, c]")));
    }
}
