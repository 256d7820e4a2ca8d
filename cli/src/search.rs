use std::cell::RefCell;
use std::ops::Range;

use estree::Node;
use templates::{Capture, Template, TemplateError, TemplateManager, Variable, VariableKind, Visitor};

/// A command-line template with its `${name}` placeholders resolved.
pub struct Expanded {
    /// Template source with each placeholder replaced by its variable.
    pub source: String,
    /// Variables in order of first appearance.
    pub names: Vec<(String, Variable)>,
}

/// Replace `${name}` with fresh variables of `manager`. A name listed in
/// `spread` or `group` gets that kind, every other name a simple variable.
/// Repeated names share one variable. `${` not followed by an identifier and
/// `}` is kept as written.
pub fn expand(manager: &mut TemplateManager, template: &str, spread: &[String], group: &[String]) -> Expanded {
    let mut source = String::with_capacity(template.len());
    let mut names: Vec<(String, Variable)> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find("${") {
        source.push_str(&rest[..open]);
        let after = &rest[open + 2..];
        let Some(close) = after.find('}').filter(|&close| is_name(after[..close].trim())) else {
            source.push_str("${");
            rest = after;
            continue;
        };
        let name = after[..close].trim();
        let variable = match names.iter().find(|(known, _)| known == name) {
            Some((_, variable)) => *variable,
            None => {
                let kind = if spread.iter().any(|s| s == name) {
                    VariableKind::Spread
                } else if group.iter().any(|g| g == name) {
                    VariableKind::DeclarationGroup
                } else {
                    VariableKind::Simple
                };
                let variable = manager.new_variable(kind);
                names.push((name.to_string(), variable));
                variable
            }
        };
        source.push_str(&variable.to_string());
        rest = &after[close + 1..];
    }
    source.push_str(rest);

    Expanded { source, names }
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// One match of a template in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub span: Range<usize>,
    /// Each named variable with the span of its first capture. An empty
    /// spread capture has no span.
    pub captures: Vec<(String, Option<Range<usize>>)>,
}

impl Found {
    /// Captured source text for `name`, empty for an empty spread.
    pub fn capture_text<'s>(&self, name: &str, source: &'s str) -> Option<&'s str> {
        let (_, span) = self.captures.iter().find(|(known, _)| known == name)?;
        Some(span.clone().and_then(|span| source.get(span)).unwrap_or(""))
    }
}

/// Every match of `template` in `tree`, in traversal order.
pub fn find(template: &Template, names: &[(String, Variable)], tree: &Node) -> Result<Vec<Found>, TemplateError> {
    let found = RefCell::new(Vec::new());
    let mut table = Visitor::new()
        .on_template(template, |node, context, _| {
            let captures = names
                .iter()
                .map(|(name, variable)| {
                    let span = context.get_match(variable).and_then(capture_span);
                    (name.clone(), span)
                })
                .collect();
            found.borrow_mut().push(Found {
                span: node.span.clone(),
                captures,
            });
        })
        .compile()?;
    estree::visit(tree, &mut table);
    drop(table);
    Ok(found.into_inner())
}

fn capture_span(capture: Capture<'_>) -> Option<Range<usize>> {
    let nodes = capture.nodes();
    let first = nodes.first()?;
    let last = nodes.last()?;
    Some(first.span.start..last.span.end)
}
