use estree::node::DeclarationKind;
use estree::{Edge, Node, NodeKind, NodeList};
use tracing::trace;

use crate::context::{Capture, MatchContext};
use crate::equality::{leaves_equal, lists_equal, nodes_equal};
use crate::template::{Template, sole_spread};
use crate::variable::{Variable, VariableKind};

/// Attempt to match a concrete node against a template's pattern tree.
/// Returns Some(context) with the bindings if the match succeeds, None otherwise.
pub fn match_pattern<'n>(template: &Template, node: &'n Node) -> Option<MatchContext<'n>> {
    let mut context = MatchContext::new();
    let matched = match_inner(template, template.root(), node, &mut context);
    trace!(
        template = %template.id(),
        kind = node.kind_name(),
        start = node.span.start,
        matched,
        "match attempt"
    );
    matched.then_some(context)
}

fn match_inner<'n>(
    template: &Template,
    pattern: &Node,
    node: &'n Node,
    context: &mut MatchContext<'n>,
) -> bool {
    if let Some(variable) = variable_position(template, pattern) {
        return bind_node(variable, node, context);
    }
    if pattern.kind_name() != node.kind_name() || !leaves_equal(pattern, node) {
        return false;
    }

    let pattern_edges = pattern.kind.edges();
    let node_edges = node.kind.edges();
    pattern_edges.len() == node_edges.len()
        && pattern_edges
            .into_iter()
            .zip(node_edges)
            .all(|((_, pattern_edge), (_, node_edge))| match_edge(template, pattern_edge, node_edge, context))
}

fn match_edge<'n>(
    template: &Template,
    pattern: Edge<'_>,
    node: Edge<'n>,
    context: &mut MatchContext<'n>,
) -> bool {
    match (pattern, node) {
        (Edge::Node(pattern), Edge::Node(node)) => match_optional(template, pattern, node, context),
        (Edge::List(pattern), Edge::List(nodes)) => match_list(template, pattern, nodes, context),
        _ => false,
    }
}

fn match_optional<'n>(
    template: &Template,
    pattern: Option<&Node>,
    node: Option<&'n Node>,
    context: &mut MatchContext<'n>,
) -> bool {
    match (pattern, node) {
        (None, None) => true,
        (Some(pattern), Some(node)) => match_inner(template, pattern, node, context),
        _ => false,
    }
}

fn match_list<'n>(
    template: &Template,
    pattern: NodeList<'_>,
    nodes: NodeList<'n>,
    context: &mut MatchContext<'n>,
) -> bool {
    if let Some(variable) = sole_spread(template, pattern) {
        return bind_sequence(variable, nodes, context);
    }
    pattern.len() == nodes.len()
        && pattern
            .iter()
            .zip(nodes.iter())
            .all(|(pattern, node)| match_optional(template, pattern, node, context))
}

/// The variable a pattern node stands for, if it is a variable position.
///
/// Declaration groups appear in source as `var <placeholder>, ...`, so the
/// whole declaration is the position, keyed by its first declarator.
fn variable_position<'t>(template: &'t Template, pattern: &Node) -> Option<&'t Variable> {
    match &pattern.kind {
        NodeKind::Identifier { name } => template
            .variable_named(name)
            .filter(|variable| variable.kind() != VariableKind::Spread),
        NodeKind::VariableDeclaration {
            kind: DeclarationKind::Var,
            declarations,
        } => {
            let NodeKind::VariableDeclarator { id, .. } = &declarations.first()?.kind else {
                return None;
            };
            template
                .variable_named(id.as_identifier()?)
                .filter(|variable| variable.kind() == VariableKind::DeclarationGroup)
        }
        _ => None,
    }
}

fn bind_node<'n>(variable: &Variable, node: &'n Node, context: &mut MatchContext<'n>) -> bool {
    if !variable.accepts(node) {
        return false;
    }
    let consistent = context
        .captures(variable.id())
        .iter()
        .all(|previous| previous.as_node().is_some_and(|previous| nodes_equal(previous, node)));
    if consistent {
        context.push(variable.id(), Capture::Node(node));
    }
    consistent
}

fn bind_sequence<'n>(variable: &Variable, nodes: NodeList<'n>, context: &mut MatchContext<'n>) -> bool {
    let consistent = context
        .captures(variable.id())
        .iter()
        .all(|previous| previous.as_sequence().is_some_and(|previous| lists_equal(previous, nodes)));
    if consistent {
        context.push(variable.id(), Capture::Sequence(nodes));
    }
    consistent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::TemplateManager;

    fn first_expression(source: &str) -> Node {
        let program = estree::parse(source, &Default::default()).expect("parse failed");
        let NodeKind::Program { mut body, .. } = program.kind else {
            panic!("expected program");
        };
        match body.remove(0).kind {
            NodeKind::ExpressionStatement { expression } => *expression,
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn literal_templates_match_structurally() {
        let mut manager = TemplateManager::new();
        let template = manager.template("a.b(1)").expect("compile failed");
        assert!(template.matches(&first_expression("a.b(1)")).is_some());
        assert!(template.matches(&first_expression("a.b(2)")).is_none());
        assert!(template.matches(&first_expression("a.c(1)")).is_none());
    }

    #[test]
    fn simple_variables_bind_any_node() {
        let mut manager = TemplateManager::new();
        let x = manager.variable();
        let template = manager.template(&format!("{}.length", x)).expect("compile failed");
        let node = first_expression("foo(bar).length");
        let context = template.matches(&node).expect("should match");
        assert_eq!(context.node(&x).map(Node::kind_name), Some("CallExpression"));
    }

    #[test]
    fn repeated_spreads_must_agree() {
        let mut manager = TemplateManager::new();
        let args = manager.spread_variable();
        let template = manager
            .template(&format!("[f({args}), g({args})]"))
            .expect("compile failed");
        assert!(template.matches(&first_expression("[f(a, b), g(a, b)]")).is_some());
        assert!(template.matches(&first_expression("[f(a, b), g(a)]")).is_none());
        assert!(template.matches(&first_expression("[f(), g()]")).is_some());
    }

    #[test]
    fn holes_in_patterns_align_with_holes() {
        let mut manager = TemplateManager::new();
        let x = manager.variable();
        let template = manager.template(&format!("[{}, , c]", x)).expect("compile failed");
        assert!(template.matches(&first_expression("[a, , c]")).is_some());
        assert!(template.matches(&first_expression("[a, b, c]")).is_none());
    }
}
