use tree_sitter::Node as SyntaxNode;

use super::literal::identifier_name;
use super::{Lower, ParseError, children, has_token, named};
use crate::node::{
    AssignmentOperator, BinaryOperator, LiteralValue, LogicalOperator, Node, NodeKind, PropertyKind,
    UnaryOperator, UpdateOperator,
};
use crate::options::EcmaVersion;

impl Lower<'_> {
    pub(super) fn expression(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let span = node.byte_range();
        let kind = match node.kind() {
            "parenthesized_expression" => return self.expression(self.inner(node)?),
            "identifier" | "undefined" => return self.identifier(node),
            "this" => NodeKind::ThisExpression,
            "super" => NodeKind::Super,
            "true" => return Ok(self.literal(node, LiteralValue::Boolean(true))),
            "false" => return Ok(self.literal(node, LiteralValue::Boolean(false))),
            "null" => return Ok(self.literal(node, LiteralValue::Null)),
            "number" => return self.number_literal(node),
            "string" => return self.string_literal(node),
            "regex" => return self.regex_literal(node),
            "template_string" => return self.template_literal(node, false),
            "array" => NodeKind::ArrayExpression {
                elements: self.elements(node, |this, element| this.list_element(element))?,
            },
            "object" => return self.object(node),
            "function_expression" | "function" | "generator_function" => return self.function(node, false),
            "arrow_function" => return self.arrow_function(node),
            "class" => return self.class(node, false),
            "call_expression" | "member_expression" | "subscript_expression" => {
                let (element, chained) = self.chain_element(node)?;
                if !chained {
                    return Ok(element);
                }
                NodeKind::ChainExpression {
                    expression: Box::new(element),
                }
            }
            "new_expression" => {
                let callee = Box::new(self.expression(self.field(node, "constructor")?)?);
                let arguments = match node.child_by_field_name("arguments") {
                    Some(arguments) => self.arguments(arguments)?,
                    None => Vec::new(),
                };
                NodeKind::NewExpression { callee, arguments }
            }
            "assignment_expression" => NodeKind::AssignmentExpression {
                operator: AssignmentOperator::Assign,
                left: Box::new(self.pattern(self.field(node, "left")?)?),
                right: Box::new(self.expression(self.field(node, "right")?)?),
            },
            "augmented_assignment_expression" => {
                let operator_node = self.field(node, "operator")?;
                let text = self.text(operator_node);
                let operator = AssignmentOperator::from_punct(text)
                    .ok_or_else(|| self.unsupported("logical assignment operators", operator_node))?;
                if operator == AssignmentOperator::ExpAssign {
                    self.require_at(EcmaVersion::Es2016, "the `**=` operator", operator_node)?;
                }
                NodeKind::AssignmentExpression {
                    operator,
                    left: Box::new(self.expression(self.field(node, "left")?)?),
                    right: Box::new(self.expression(self.field(node, "right")?)?),
                }
            }
            "await_expression" => {
                self.require_at(EcmaVersion::Es2017, "async functions", node)?;
                if !self.function.is_async {
                    return Err(self.error("`await` is only valid in async functions", node));
                }
                NodeKind::AwaitExpression {
                    argument: Box::new(self.expression(self.inner(node)?)?),
                }
            }
            "unary_expression" => {
                let operator_node = self.field(node, "operator")?;
                let operator = UnaryOperator::from_punct(self.text(operator_node))
                    .ok_or_else(|| self.error("unknown unary operator", operator_node))?;
                NodeKind::UnaryExpression {
                    operator,
                    argument: Box::new(self.expression(self.field(node, "argument")?)?),
                }
            }
            "update_expression" => {
                let operator_node = self.field(node, "operator")?;
                let argument_node = self.field(node, "argument")?;
                let operator = UpdateOperator::from_punct(self.text(operator_node))
                    .ok_or_else(|| self.error("unknown update operator", operator_node))?;
                NodeKind::UpdateExpression {
                    operator,
                    prefix: operator_node.start_byte() < argument_node.start_byte(),
                    argument: Box::new(self.expression(argument_node)?),
                }
            }
            "binary_expression" => self.binary(node)?,
            "ternary_expression" => NodeKind::ConditionalExpression {
                test: Box::new(self.expression(self.field(node, "condition")?)?),
                consequent: Box::new(self.expression(self.field(node, "consequence")?)?),
                alternate: Box::new(self.expression(self.field(node, "alternative")?)?),
            },
            "sequence_expression" => {
                let mut expressions = Vec::new();
                self.flatten_sequence(node, &mut expressions)?;
                NodeKind::SequenceExpression { expressions }
            }
            "yield_expression" => {
                if !self.function.is_generator {
                    return Err(self.error("`yield` is only valid in generators", node));
                }
                NodeKind::YieldExpression {
                    argument: self.optional_expression(named(node).first().copied())?,
                    delegate: has_token(node, "*"),
                }
            }
            "meta_property" => return self.meta_property(node),
            "jsx_element" | "jsx_self_closing_element" => return Err(self.unsupported("JSX elements", node)),
            other => return Err(self.error(format!("unexpected {}", other.replace('_', " ")), node)),
        };
        Ok(Node::new(kind, span))
    }

    pub(super) fn optional_expression(&mut self, node: Option<SyntaxNode<'_>>) -> Result<Option<Box<Node>>, ParseError> {
        match node {
            Some(node) => Ok(Some(Box::new(self.expression(node)?))),
            None => Ok(None),
        }
    }

    /// An identifier in any of the grammar's name positions: references,
    /// bindings, property names and labels.
    pub(super) fn identifier(&self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        match node.kind() {
            "identifier"
            | "undefined"
            | "property_identifier"
            | "shorthand_property_identifier"
            | "shorthand_property_identifier_pattern"
            | "statement_identifier" => {
                let name = identifier_name(self.text(node)).map_err(|msg| self.error(msg, node))?;
                Ok(Node::new(NodeKind::Identifier { name }, node.byte_range()))
            }
            "private_property_identifier" => Err(self.unsupported("private class members", node)),
            other => Err(self.error(format!("expected an identifier, found {}", other.replace('_', " ")), node)),
        }
    }

    /// One step of a member/call chain, plus whether the chain up to and
    /// including this step contains a `?.`.
    ///
    /// Only the outermost step of a chain is wrapped in a `ChainExpression`,
    /// so the object or callee of each step is lowered through here rather
    /// than through `expression`. Parentheses end a chain.
    fn chain_element(&mut self, node: SyntaxNode<'_>) -> Result<(Node, bool), ParseError> {
        let span = node.byte_range();
        let optional = node.child_by_field_name("optional_chain").is_some();
        if optional {
            self.require_at(EcmaVersion::Es2020, "optional chaining", node)?;
        }
        let parts = match node.kind() {
            "call_expression" => {
                let function = self.field(node, "function")?;
                let arguments = self.field(node, "arguments")?;
                if function.kind() == "import" {
                    return Ok((self.import_call(node, arguments)?, false));
                }
                if arguments.kind() == "template_string" {
                    let tag = Box::new(self.expression(function)?);
                    let quasi = Box::new(self.template_literal(arguments, true)?);
                    return Ok((Node::new(NodeKind::TaggedTemplateExpression { tag, quasi }, span), false));
                }
                let (callee, chained) = self.chain_object(function)?;
                let arguments = self.arguments(arguments)?;
                return Ok((
                    Node::new(
                        NodeKind::CallExpression {
                            callee: Box::new(callee),
                            arguments,
                            optional,
                        },
                        span,
                    ),
                    chained || optional,
                ));
            }
            "member_expression" => {
                let object_node = self.field(node, "object")?;
                let property_node = self.field(node, "property")?;
                if object_node.kind() == "import" {
                    return Ok((self.import_meta(node, object_node, property_node)?, false));
                }
                let (object, chained) = self.chain_object(object_node)?;
                let property = self.identifier(property_node)?;
                (object, property, false, chained)
            }
            _ => {
                let (object, chained) = self.chain_object(self.field(node, "object")?)?;
                let property = self.expression(self.field(node, "index")?)?;
                (object, property, true, chained)
            }
        };
        let (object, property, computed, chained) = parts;
        Ok((
            Node::new(
                NodeKind::MemberExpression {
                    object: Box::new(object),
                    property: Box::new(property),
                    computed,
                    optional,
                },
                span,
            ),
            chained || optional,
        ))
    }

    fn chain_object(&mut self, node: SyntaxNode<'_>) -> Result<(Node, bool), ParseError> {
        match node.kind() {
            "call_expression" | "member_expression" | "subscript_expression" => self.chain_element(node),
            _ => Ok((self.expression(node)?, false)),
        }
    }

    fn import_call(&mut self, node: SyntaxNode<'_>, arguments: SyntaxNode<'_>) -> Result<Node, ParseError> {
        self.require_at(EcmaVersion::Es2020, "dynamic `import()`", node)?;
        let list = named(arguments);
        let &[source] = list.as_slice() else {
            return Err(self.error("`import()` takes exactly one argument", arguments));
        };
        if source.kind() == "spread_element" {
            return Err(self.error("`import()` does not accept spread arguments", source));
        }
        let source = Box::new(self.expression(source)?);
        Ok(Node::new(NodeKind::ImportExpression { source }, node.byte_range()))
    }

    /// `import.meta`, which some grammar versions parse as a member access.
    fn import_meta(
        &mut self,
        node: SyntaxNode<'_>,
        meta: SyntaxNode<'_>,
        property: SyntaxNode<'_>,
    ) -> Result<Node, ParseError> {
        if self.text(property) != "meta" {
            return Err(self.error("unexpected `import`", meta));
        }
        self.require_module("`import.meta`", node)?;
        self.require_at(EcmaVersion::Es2020, "`import.meta`", node)?;
        let meta = Box::new(Node::new(NodeKind::Identifier { name: "import".into() }, meta.byte_range()));
        let property = Box::new(self.identifier(property)?);
        Ok(Node::new(NodeKind::MetaProperty { meta, property }, node.byte_range()))
    }

    fn meta_property(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let tokens = children(node);
        let (Some(first), Some(last)) = (tokens.first().copied(), tokens.last().copied()) else {
            return Err(self.error("empty meta property", node));
        };
        match (self.text(first), self.text(last)) {
            ("new", "target") if !self.function.in_function => {
                return Err(self.error("`new.target` outside of a function", node));
            }
            ("new", "target") => {}
            ("import", "meta") => {
                self.require_module("`import.meta`", node)?;
                self.require_at(EcmaVersion::Es2020, "`import.meta`", node)?;
            }
            _ => return Err(self.error("unknown meta property", node)),
        }
        let ident = |n: SyntaxNode<'_>| {
            Box::new(Node::new(
                NodeKind::Identifier { name: self.text(n).to_string() },
                n.byte_range(),
            ))
        };
        Ok(Node::new(
            NodeKind::MetaProperty { meta: ident(first), property: ident(last) },
            node.byte_range(),
        ))
    }

    fn binary(&mut self, node: SyntaxNode<'_>) -> Result<NodeKind, ParseError> {
        let operator_node = self.field(node, "operator")?;
        let text = self.text(operator_node);
        let left_node = self.field(node, "left")?;
        if left_node.kind() == "private_property_identifier" {
            return Err(self.unsupported("private `in` checks", left_node));
        }
        let left = Box::new(self.expression(left_node)?);
        let right = Box::new(self.expression(self.field(node, "right")?)?);

        if let Some(operator) = LogicalOperator::from_punct(text) {
            if operator == LogicalOperator::Nullish {
                self.require_at(EcmaVersion::Es2020, "the `??` operator", operator_node)?;
            }
            return Ok(NodeKind::LogicalExpression { operator, left, right });
        }
        let operator = BinaryOperator::from_punct(text)
            .ok_or_else(|| self.error(format!("unknown operator `{}`", text), operator_node))?;
        if operator == BinaryOperator::Exp {
            self.require_at(EcmaVersion::Es2016, "the `**` operator", operator_node)?;
        }
        Ok(NodeKind::BinaryExpression { operator, left, right })
    }

    fn flatten_sequence(&mut self, node: SyntaxNode<'_>, expressions: &mut Vec<Node>) -> Result<(), ParseError> {
        for child in named(node) {
            if child.kind() == "sequence_expression" {
                self.flatten_sequence(child, expressions)?;
            } else {
                expressions.push(self.expression(child)?);
            }
        }
        Ok(())
    }

    pub(super) fn arguments(&mut self, node: SyntaxNode<'_>) -> Result<Vec<Node>, ParseError> {
        named(node)
            .into_iter()
            .map(|argument| self.list_element(argument))
            .collect()
    }

    /// An array element or call argument, either of which may be spread.
    fn list_element(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        if node.kind() != "spread_element" {
            return self.expression(node);
        }
        self.require_at(EcmaVersion::Es2015, "spread elements", node)?;
        let argument = Box::new(self.expression(self.inner(node)?)?);
        Ok(Node::new(NodeKind::SpreadElement { argument }, node.byte_range()))
    }

    fn object(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let mut properties = Vec::new();
        for child in named(node) {
            let span = child.byte_range();
            let property = match child.kind() {
                "pair" => {
                    let (key, computed) = self.property_key(self.field(child, "key")?)?;
                    let value = self.expression(self.field(child, "value")?)?;
                    property(key, value, PropertyKind::Init, computed)
                }
                "shorthand_property_identifier" => {
                    self.require_at(EcmaVersion::Es2015, "shorthand properties", child)?;
                    let key = self.identifier(child)?;
                    NodeKind::Property {
                        key: Box::new(key.clone()),
                        value: Box::new(key),
                        kind: PropertyKind::Init,
                        method: false,
                        shorthand: true,
                        computed: false,
                    }
                }
                "spread_element" => {
                    self.require_at(EcmaVersion::Es2018, "object spread properties", child)?;
                    let argument = Box::new(self.expression(self.inner(child)?)?);
                    NodeKind::SpreadElement { argument }
                }
                "method_definition" => {
                    properties.push(self.object_method(child)?);
                    continue;
                }
                other => return Err(self.error(format!("unexpected {} in object", other.replace('_', " ")), child)),
            };
            properties.push(Node::new(property, span));
        }
        Ok(Node::new(NodeKind::ObjectExpression { properties }, node.byte_range()))
    }

    /// A property name and whether it is computed (`[expr]`).
    pub(super) fn property_key(&mut self, node: SyntaxNode<'_>) -> Result<(Node, bool), ParseError> {
        match node.kind() {
            "string" => Ok((self.string_literal(node)?, false)),
            "number" => Ok((self.number_literal(node)?, false)),
            "computed_property_name" => {
                self.require_at(EcmaVersion::Es2015, "computed property names", node)?;
                Ok((self.expression(self.inner(node)?)?, true))
            }
            _ => Ok((self.identifier(node)?, false)),
        }
    }
}

/// A plain `key: value` property.
pub(super) fn property(key: Node, value: Node, kind: PropertyKind, computed: bool) -> NodeKind {
    NodeKind::Property {
        key: Box::new(key),
        value: Box::new(value),
        kind,
        method: false,
        shorthand: false,
        computed,
    }
}
