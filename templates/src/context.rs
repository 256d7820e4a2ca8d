use estree::{Node, NodeList};

use crate::variable::{Variable, VariableId};

/// A value bound to a variable during one match attempt.
#[derive(Debug, Clone, Copy)]
pub enum Capture<'n> {
    /// Bound by a simple or declaration-group variable.
    Node(&'n Node),
    /// Bound by a spread variable: the whole sibling list it stood for.
    Sequence(NodeList<'n>),
}

impl<'n> Capture<'n> {
    pub fn as_node(&self) -> Option<&'n Node> {
        match self {
            Capture::Node(node) => Some(*node),
            Capture::Sequence(_) => None,
        }
    }

    pub fn as_sequence(&self) -> Option<NodeList<'n>> {
        match self {
            Capture::Node(_) => None,
            Capture::Sequence(list) => Some(*list),
        }
    }

    /// The captured nodes, skipping holes.
    pub fn nodes(&self) -> Vec<&'n Node> {
        match self {
            Capture::Node(node) => vec![*node],
            Capture::Sequence(list) => list.iter().flatten().collect(),
        }
    }
}

/// Bindings recorded by a successful match, in the order they were made.
///
/// A variable used several times in a template has one capture per use.
#[derive(Debug, Clone, Default)]
pub struct MatchContext<'n> {
    bindings: Vec<(VariableId, Vec<Capture<'n>>)>,
}

impl<'n> MatchContext<'n> {
    pub fn new() -> Self {
        MatchContext {
            bindings: Vec::new(),
        }
    }

    /// Every capture of `variable`, empty when it was never bound.
    pub fn get_matches(&self, variable: &Variable) -> &[Capture<'n>] {
        self.captures(variable.id())
    }

    /// The first capture of `variable`.
    pub fn get_match(&self, variable: &Variable) -> Option<Capture<'n>> {
        self.get_matches(variable).first().copied()
    }

    /// The first node bound to a simple or declaration-group variable.
    pub fn node(&self, variable: &Variable) -> Option<&'n Node> {
        self.get_match(variable)?.as_node()
    }

    /// The first list bound to a spread variable.
    pub fn nodes(&self, variable: &Variable) -> Option<NodeList<'n>> {
        self.get_match(variable)?.as_sequence()
    }

    /// Bound variables in first-binding order.
    pub fn variables(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.bindings.iter().map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn captures(&self, id: VariableId) -> &[Capture<'n>] {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == id)
            .map(|(_, captures)| captures.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn push(&mut self, id: VariableId, capture: Capture<'n>) {
        match self.bindings.iter_mut().find(|(bound, _)| *bound == id) {
            Some((_, captures)) => captures.push(capture),
            None => self.bindings.push((id, vec![capture])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{VariableKind, VariableRegistry};
    use estree::NodeKind;

    fn identifier(name: &str) -> Node {
        Node::new(NodeKind::Identifier { name: name.to_string() }, 0..name.len())
    }

    #[test]
    fn captures_accumulate_per_variable() {
        let mut registry = VariableRegistry::new(1);
        let x = registry.create(VariableKind::Simple);
        let y = registry.create(VariableKind::Simple);
        let (a, b) = (identifier("a"), identifier("b"));

        let mut context = MatchContext::new();
        context.push(x.id(), Capture::Node(&a));
        context.push(y.id(), Capture::Node(&b));
        context.push(x.id(), Capture::Node(&b));

        assert_eq!(context.get_matches(&x).len(), 2);
        assert_eq!(context.node(&x).and_then(Node::as_identifier), Some("a"));
        assert_eq!(context.variables().collect::<Vec<_>>(), [x.id(), y.id()]);
    }

    #[test]
    fn unbound_variables_have_no_matches() {
        let mut registry = VariableRegistry::new(1);
        let x = registry.create(VariableKind::Spread);
        let context = MatchContext::new();
        assert!(context.get_matches(&x).is_empty());
        assert!(context.nodes(&x).is_none());
        assert!(context.is_empty());
    }
}
