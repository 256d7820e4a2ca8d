use tree_sitter::Node as SyntaxNode;

use super::{FunctionContext, Lower, ParseError, children, has_token, named};
use crate::node::{MethodKind, Node, NodeKind, PropertyKind};
use crate::options::EcmaVersion;

/// Modifiers written before a method name.
#[derive(Debug, Clone, Copy, Default)]
struct MethodModifiers {
    is_static: bool,
    is_async: bool,
    generator: bool,
    getter: bool,
    setter: bool,
}

impl Lower<'_> {
    /// A `function` declaration or expression, generators included.
    pub(super) fn function(&mut self, node: SyntaxNode<'_>, declaration: bool) -> Result<Node, ParseError> {
        let is_async = has_token(node, "async");
        let generator = node.kind().starts_with("generator") || has_token(node, "*");
        self.require_function_flavor(node, is_async, generator)?;

        let id = match node.child_by_field_name("name") {
            Some(name) => Some(Box::new(self.identifier(name)?)),
            None => None,
        };
        let context = FunctionContext {
            in_function: true,
            is_async,
            is_generator: generator,
        };
        let (params, body) = self.with_function(context, |this| {
            let params = this.parameters(this.field(node, "parameters")?)?;
            let body = this.block(this.field(node, "body")?)?;
            Ok((params, Box::new(body)))
        })?;

        let kind = if declaration {
            NodeKind::FunctionDeclaration { id, params, body, generator, is_async }
        } else {
            NodeKind::FunctionExpression { id, params, body, generator, is_async }
        };
        Ok(Node::new(kind, node.byte_range()))
    }

    pub(super) fn arrow_function(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        self.require_at(EcmaVersion::Es2015, "arrow functions", node)?;
        let is_async = has_token(node, "async");
        self.require_function_flavor(node, is_async, false)?;

        let context = FunctionContext {
            in_function: true,
            is_async,
            is_generator: false,
        };
        self.with_function(context, |this| {
            let params = match node.child_by_field_name("parameter") {
                Some(param) => vec![this.identifier(param)?],
                None => this.parameters(this.field(node, "parameters")?)?,
            };
            let body_node = this.field(node, "body")?;
            let (body, expression) = match body_node.kind() {
                "statement_block" => (this.block(body_node)?, false),
                _ => (this.expression(body_node)?, true),
            };
            Ok(Node::new(
                NodeKind::ArrowFunctionExpression {
                    params,
                    body: Box::new(body),
                    expression,
                    is_async,
                },
                node.byte_range(),
            ))
        })
    }

    fn require_function_flavor(&self, node: SyntaxNode<'_>, is_async: bool, generator: bool) -> Result<(), ParseError> {
        if generator {
            self.require_at(EcmaVersion::Es2015, "generators", node)?;
        }
        if is_async {
            self.require_at(EcmaVersion::Es2017, "async functions", node)?;
        }
        if is_async && generator {
            self.require_at(EcmaVersion::Es2018, "async generators", node)?;
        }
        Ok(())
    }

    fn parameters(&mut self, node: SyntaxNode<'_>) -> Result<Vec<Node>, ParseError> {
        named(node)
            .into_iter()
            .map(|param| self.pattern(param))
            .collect()
    }

    // ------------------------------------------------------------------
    // Classes and methods
    // ------------------------------------------------------------------

    pub(super) fn class(&mut self, node: SyntaxNode<'_>, declaration: bool) -> Result<Node, ParseError> {
        self.require_at(EcmaVersion::Es2015, "classes", node)?;
        if node.child_by_field_name("decorator").is_some() {
            return Err(self.unsupported("decorators", node));
        }
        let id = match node.child_by_field_name("name") {
            Some(name) => Some(Box::new(self.identifier(name)?)),
            None => None,
        };
        let super_class = match named(node).into_iter().find(|child| child.kind() == "class_heritage") {
            Some(heritage) => Some(Box::new(self.expression(self.inner(heritage)?)?)),
            None => None,
        };

        let body_node = self.field(node, "body")?;
        let mut members = Vec::new();
        for member in named(body_node) {
            match member.kind() {
                "method_definition" => members.push(self.class_method(member)?),
                "field_definition" => return Err(self.unsupported("class fields", member)),
                "class_static_block" => return Err(self.unsupported("class static blocks", member)),
                other => return Err(self.error(format!("unexpected {} in class body", other.replace('_', " ")), member)),
            }
        }
        let body = Box::new(Node::new(NodeKind::ClassBody { body: members }, body_node.byte_range()));

        let kind = if declaration {
            NodeKind::ClassDeclaration { id, super_class, body }
        } else {
            NodeKind::ClassExpression { id, super_class, body }
        };
        Ok(Node::new(kind, node.byte_range()))
    }

    fn class_method(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let modifiers = self.method_modifiers(node)?;
        let (key, computed) = self.property_key(self.field(node, "name")?)?;
        let kind = if modifiers.getter {
            MethodKind::Get
        } else if modifiers.setter {
            MethodKind::Set
        } else if !modifiers.is_static && !computed && is_constructor_key(&key) {
            MethodKind::Constructor
        } else {
            MethodKind::Method
        };
        let value = self.method_function(node, modifiers)?;
        Ok(Node::new(
            NodeKind::MethodDefinition {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                computed,
                is_static: modifiers.is_static,
            },
            node.byte_range(),
        ))
    }

    /// A method in an object literal, which ESTree models as a property
    /// whose value is a function.
    pub(super) fn object_method(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let modifiers = self.method_modifiers(node)?;
        if modifiers.is_static {
            return Err(self.error("`static` is only valid in classes", node));
        }
        let (key, computed) = self.property_key(self.field(node, "name")?)?;
        let kind = if modifiers.getter {
            PropertyKind::Get
        } else if modifiers.setter {
            PropertyKind::Set
        } else {
            self.require_at(EcmaVersion::Es2015, "method definitions", node)?;
            PropertyKind::Init
        };
        let value = self.method_function(node, modifiers)?;
        Ok(Node::new(
            NodeKind::Property {
                key: Box::new(key),
                value: Box::new(value),
                kind,
                method: kind == PropertyKind::Init,
                shorthand: false,
                computed,
            },
            node.byte_range(),
        ))
    }

    fn method_modifiers(&self, node: SyntaxNode<'_>) -> Result<MethodModifiers, ParseError> {
        if node.child_by_field_name("decorator").is_some() {
            return Err(self.unsupported("decorators", node));
        }
        let mut modifiers = MethodModifiers::default();
        for token in children(node).into_iter().filter(|child| !child.is_named()) {
            match token.kind() {
                "static" => modifiers.is_static = true,
                "static get" => {
                    modifiers.is_static = true;
                    modifiers.getter = true;
                }
                "async" => modifiers.is_async = true,
                "get" => modifiers.getter = true,
                "set" => modifiers.setter = true,
                "*" => modifiers.generator = true,
                _ => {}
            }
        }
        self.require_function_flavor(node, modifiers.is_async, modifiers.generator)?;
        Ok(modifiers)
    }

    /// The function a method definition evaluates to. Its span runs from the
    /// parameter list to the end of the body.
    fn method_function(&mut self, node: SyntaxNode<'_>, modifiers: MethodModifiers) -> Result<Node, ParseError> {
        let params_node = self.field(node, "parameters")?;
        let body_node = self.field(node, "body")?;
        let context = FunctionContext {
            in_function: true,
            is_async: modifiers.is_async,
            is_generator: modifiers.generator,
        };
        let (params, body) = self.with_function(context, |this| {
            Ok((this.parameters(params_node)?, this.block(body_node)?))
        })?;
        Ok(Node::new(
            NodeKind::FunctionExpression {
                id: None,
                params,
                body: Box::new(body),
                generator: modifiers.generator,
                is_async: modifiers.is_async,
            },
            params_node.start_byte()..body_node.end_byte(),
        ))
    }
}

fn is_constructor_key(key: &Node) -> bool {
    match &key.kind {
        NodeKind::Identifier { name } => name == "constructor",
        NodeKind::Literal { value, .. } => value.as_str() == Some("constructor"),
        _ => false,
    }
}
