use std::collections::HashMap;
use std::fmt;

use estree::{Edge, Node, NodeKind, NodeList, ParserOptions};

use crate::context::MatchContext;
use crate::error::TemplateError;
use crate::pattern;
use crate::variable::{Variable, VariableKind, VariableRegistry, is_placeholder};

/// Identity of a template within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId {
    pub session: u64,
    pub index: u64,
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "template#{}.{}", self.session, self.index)
    }
}

/// A compiled template: the pattern tree plus the variables it refers to.
///
/// Templates are immutable once compiled and can be shared between any
/// number of visitors.
#[derive(Debug, Clone)]
pub struct Template {
    id: TemplateId,
    source: String,
    root: Node,
    variables: HashMap<String, Variable>,
}

impl Template {
    pub fn id(&self) -> TemplateId {
        self.id
    }

    /// The source the template was compiled from, placeholders included.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The pattern tree: the first statement of the source, with an
    /// expression statement unwrapped to its expression.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The kind of node this template can match, and so its dispatch key.
    pub fn kind_name(&self) -> &'static str {
        self.root.kind_name()
    }

    /// The variable a placeholder identifier in the pattern refers to.
    pub fn variable_named(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Variables referenced by the pattern, in no particular order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Match `node` against this template, returning the bindings on success.
    pub fn matches<'n>(&self, node: &'n Node) -> Option<MatchContext<'n>> {
        pattern::match_pattern(self, node)
    }
}

/// Parse `source` and turn its first statement into a template.
pub(crate) fn compile(
    id: TemplateId,
    source: &str,
    registry: &VariableRegistry,
    options: &ParserOptions,
) -> Result<Template, TemplateError> {
    if source.trim().is_empty() {
        return Err(TemplateError::Empty);
    }
    let program = estree::parse(source, options)?;
    let NodeKind::Program { body, .. } = program.kind else {
        return Err(TemplateError::Empty);
    };
    let first = body.into_iter().next().ok_or(TemplateError::Empty)?;
    let root = match first.kind {
        NodeKind::ExpressionStatement { expression } => *expression,
        kind => Node::new(kind, first.span),
    };

    let mut variables = HashMap::new();
    collect_variables(&root, registry, &mut variables)?;
    let template = Template {
        id,
        source: source.to_string(),
        root,
        variables,
    };
    check_spreads(&template, template.root())?;
    Ok(template)
}

/// Record every placeholder identifier, rejecting ones the registry does not
/// know.
fn collect_variables(
    node: &Node,
    registry: &VariableRegistry,
    variables: &mut HashMap<String, Variable>,
) -> Result<(), TemplateError> {
    if let Some(name) = node.as_identifier() {
        if is_placeholder(name) {
            let variable = registry.get(name).ok_or_else(|| TemplateError::UnknownVariable {
                name: name.to_string(),
                span: node.span.clone(),
            })?;
            variables.insert(name.to_string(), *variable);
        }
        return Ok(());
    }
    for_each_child(node, |child| collect_variables(child, registry, variables))
}

/// Spread variables may only appear as the sole element of a list.
fn check_spreads(template: &Template, node: &Node) -> Result<(), TemplateError> {
    if let Some(name) = node.as_identifier() {
        return match template.variable_named(name) {
            Some(variable) if variable.kind() == VariableKind::Spread => Err(TemplateError::MisplacedSpread {
                name: name.to_string(),
                span: node.span.clone(),
            }),
            _ => Ok(()),
        };
    }
    for (_, edge) in node.kind.edges() {
        match edge {
            Edge::Node(Some(child)) => check_spreads(template, child)?,
            Edge::Node(None) => {}
            Edge::List(list) => {
                if sole_spread(template, list).is_some() {
                    continue;
                }
                for child in list.iter().flatten() {
                    check_spreads(template, child)?;
                }
            }
        }
    }
    Ok(())
}

/// The spread variable standing for the whole of `list`, if any. The sole
/// element may be wrapped in an expression statement, as in `{ ${body} }`.
pub(crate) fn sole_spread<'t>(template: &'t Template, list: NodeList<'_>) -> Option<&'t Variable> {
    let mut sole = list.sole()?;
    if let NodeKind::ExpressionStatement { expression } = &sole.kind {
        sole = &**expression;
    }
    template
        .variable_named(sole.as_identifier()?)
        .filter(|variable| variable.kind() == VariableKind::Spread)
}

fn for_each_child(
    node: &Node,
    mut f: impl FnMut(&Node) -> Result<(), TemplateError>,
) -> Result<(), TemplateError> {
    for (_, edge) in node.kind.edges() {
        match edge {
            Edge::Node(Some(child)) => f(child)?,
            Edge::Node(None) => {}
            Edge::List(list) => {
                for child in list.iter().flatten() {
                    f(child)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_with(registry: &VariableRegistry, source: &str) -> Result<Template, TemplateError> {
        let id = TemplateId {
            session: registry.session(),
            index: 0,
        };
        compile(id, source, registry, &ParserOptions::default())
    }

    #[test]
    fn expression_statements_are_unwrapped() {
        let registry = VariableRegistry::new(1);
        let template = compile_with(&registry, "foo.bar();").expect("compile failed");
        assert_eq!(template.kind_name(), "CallExpression");
    }

    #[test]
    fn other_statements_are_kept() {
        let registry = VariableRegistry::new(1);
        let template = compile_with(&registry, "if (a) b();").expect("compile failed");
        assert_eq!(template.kind_name(), "IfStatement");
    }

    #[test]
    fn only_the_first_statement_counts() {
        let registry = VariableRegistry::new(1);
        let template = compile_with(&registry, "a; b;").expect("compile failed");
        assert_eq!(template.root().as_identifier(), Some("a"));
    }

    #[test]
    fn empty_sources_are_rejected() {
        let registry = VariableRegistry::new(1);
        assert!(matches!(compile_with(&registry, "  "), Err(TemplateError::Empty)));
        assert!(matches!(compile_with(&registry, "// nothing"), Err(TemplateError::Empty)));
    }

    #[test]
    fn unknown_placeholders_are_rejected() {
        let registry = VariableRegistry::new(1);
        let err = compile_with(&registry, "__tmplvar_9_0 + 1").expect_err("should fail");
        assert!(matches!(err, TemplateError::UnknownVariable { span, .. } if span == (0..13)));
    }

    #[test]
    fn spread_must_be_the_sole_list_element() {
        let mut registry = VariableRegistry::new(1);
        let spread = registry.create(VariableKind::Spread);
        assert!(compile_with(&registry, &format!("f({})", spread)).is_ok());
        assert!(compile_with(&registry, &format!("() => {{ {} }}", spread)).is_ok());
        assert!(matches!(
            compile_with(&registry, &format!("f(a, {})", spread)),
            Err(TemplateError::MisplacedSpread { .. })
        ));
        assert!(matches!(
            compile_with(&registry, &format!("{} + 1", spread)),
            Err(TemplateError::MisplacedSpread { .. })
        ));
    }
}
