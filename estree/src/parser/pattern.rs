//! Binding and assignment targets.

use tree_sitter::Node as SyntaxNode;

use super::expression::property;
use super::{Lower, ParseError, named};
use crate::node::{AssignmentOperator, Node, NodeKind, PropertyKind};
use crate::options::EcmaVersion;

impl Lower<'_> {
    pub(super) fn pattern(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let span = node.byte_range();
        let kind = match node.kind() {
            "identifier" | "undefined" | "shorthand_property_identifier_pattern" => return self.identifier(node),
            "parenthesized_expression" => return self.pattern(self.inner(node)?),
            "member_expression" | "subscript_expression" => return self.expression(node),
            "object_pattern" => {
                self.require_at(EcmaVersion::Es2015, "destructuring", node)?;
                NodeKind::ObjectPattern {
                    properties: self.object_pattern(node)?,
                }
            }
            "array_pattern" => {
                self.require_at(EcmaVersion::Es2015, "destructuring", node)?;
                NodeKind::ArrayPattern {
                    elements: self.elements(node, |this, element| this.pattern(element))?,
                }
            }
            "assignment_pattern" => {
                self.require_at(EcmaVersion::Es2015, "default values", node)?;
                NodeKind::AssignmentPattern {
                    left: Box::new(self.pattern(self.field(node, "left")?)?),
                    right: Box::new(self.expression(self.field(node, "right")?)?),
                }
            }
            "rest_pattern" => {
                self.require_at(EcmaVersion::Es2015, "rest elements", node)?;
                NodeKind::RestElement {
                    argument: Box::new(self.pattern(self.inner(node)?)?),
                }
            }
            "object" | "array" | "assignment_expression" => {
                let lowered = self.expression(node)?;
                return self.reinterpret(lowered, node);
            }
            _ => return Err(self.error("invalid assignment target", node)),
        };
        Ok(Node::new(kind, span))
    }

    fn object_pattern(&mut self, node: SyntaxNode<'_>) -> Result<Vec<Node>, ParseError> {
        let mut properties = Vec::new();
        for child in named(node) {
            let span = child.byte_range();
            let kind = match child.kind() {
                "pair_pattern" => {
                    let (key, computed) = self.property_key(self.field(child, "key")?)?;
                    let value = self.pattern(self.field(child, "value")?)?;
                    property(key, value, PropertyKind::Init, computed)
                }
                "shorthand_property_identifier_pattern" => {
                    let key = self.identifier(child)?;
                    shorthand(key.clone(), key)
                }
                "object_assignment_pattern" => {
                    let left = self.pattern(self.field(child, "left")?)?;
                    let right = Box::new(self.expression(self.field(child, "right")?)?);
                    if !matches!(left.kind, NodeKind::Identifier { .. }) {
                        return Err(self.error("invalid shorthand property", child));
                    }
                    let key = left.clone();
                    let value = Node::new(
                        NodeKind::AssignmentPattern { left: Box::new(left), right },
                        span.clone(),
                    );
                    shorthand(key, value)
                }
                "rest_pattern" => {
                    self.require_at(EcmaVersion::Es2018, "object rest properties", child)?;
                    NodeKind::RestElement {
                        argument: Box::new(self.pattern(self.inner(child)?)?),
                    }
                }
                other => return Err(self.error(format!("unexpected {} in pattern", other.replace('_', " ")), child)),
            };
            properties.push(Node::new(kind, span));
        }
        Ok(properties)
    }

    /// Turn an array or object literal on the left of `=` into the pattern
    /// it denotes.
    fn reinterpret(&self, node: Node, at: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let Node { kind, span } = node;
        let kind = match kind {
            NodeKind::Identifier { .. }
            | NodeKind::MemberExpression { .. }
            | NodeKind::ObjectPattern { .. }
            | NodeKind::ArrayPattern { .. }
            | NodeKind::AssignmentPattern { .. }
            | NodeKind::RestElement { .. } => kind,
            NodeKind::ArrayExpression { elements } => NodeKind::ArrayPattern {
                elements: elements
                    .into_iter()
                    .map(|element| element.map(|e| self.reinterpret(e, at)).transpose())
                    .collect::<Result<_, _>>()?,
            },
            NodeKind::ObjectExpression { properties } => NodeKind::ObjectPattern {
                properties: properties
                    .into_iter()
                    .map(|p| self.reinterpret_property(p, at))
                    .collect::<Result<_, _>>()?,
            },
            NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                left,
                right,
            } => NodeKind::AssignmentPattern { left, right },
            NodeKind::SpreadElement { argument } => NodeKind::RestElement {
                argument: Box::new(self.reinterpret(*argument, at)?),
            },
            _ => return Err(self.error("invalid assignment target", at)),
        };
        Ok(Node::new(kind, span))
    }

    fn reinterpret_property(&self, node: Node, at: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let Node { kind, span } = node;
        let kind = match kind {
            NodeKind::Property {
                key,
                value,
                kind: PropertyKind::Init,
                method: false,
                shorthand,
                computed,
            } => NodeKind::Property {
                key,
                value: Box::new(self.reinterpret(*value, at)?),
                kind: PropertyKind::Init,
                method: false,
                shorthand,
                computed,
            },
            NodeKind::SpreadElement { argument } => NodeKind::RestElement {
                argument: Box::new(self.reinterpret(*argument, at)?),
            },
            _ => return Err(self.error("invalid destructuring target", at)),
        };
        Ok(Node::new(kind, span))
    }
}

fn shorthand(key: Node, value: Node) -> NodeKind {
    NodeKind::Property {
        key: Box::new(key),
        value: Box::new(value),
        kind: PropertyKind::Init,
        method: false,
        shorthand: true,
        computed: false,
    }
}
