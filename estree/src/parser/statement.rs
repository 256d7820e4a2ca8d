use tree_sitter::Node as SyntaxNode;

use super::{Lower, ParseError, has_token, named};
use crate::node::{DeclarationKind, Node, NodeKind};
use crate::options::EcmaVersion;

impl Lower<'_> {
    pub(super) fn statement(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let span = node.byte_range();
        let kind = match node.kind() {
            "expression_statement" => NodeKind::ExpressionStatement {
                expression: Box::new(self.expression(self.inner(node)?)?),
            },
            "statement_block" => return self.block(node),
            "empty_statement" => NodeKind::EmptyStatement,
            "debugger_statement" => NodeKind::DebuggerStatement,
            "variable_declaration" | "lexical_declaration" => return self.variable_declaration(node),
            "function_declaration" | "generator_function_declaration" => return self.function(node, true),
            "class_declaration" => return self.class(node, true),
            "if_statement" => {
                let alternate = match node.child_by_field_name("alternative") {
                    Some(clause) => Some(Box::new(self.statement(self.inner(clause)?)?)),
                    None => None,
                };
                NodeKind::IfStatement {
                    test: Box::new(self.parenthesized(self.field(node, "condition")?)?),
                    consequent: Box::new(self.statement(self.field(node, "consequence")?)?),
                    alternate,
                }
            }
            "switch_statement" => {
                let discriminant = Box::new(self.parenthesized(self.field(node, "value")?)?);
                let cases = named(self.field(node, "body")?)
                    .into_iter()
                    .map(|case| self.switch_case(case))
                    .collect::<Result<_, _>>()?;
                NodeKind::SwitchStatement { discriminant, cases }
            }
            "for_statement" => self.for_statement(node)?,
            "for_in_statement" => self.for_in_statement(node)?,
            "while_statement" => NodeKind::WhileStatement {
                test: Box::new(self.parenthesized(self.field(node, "condition")?)?),
                body: Box::new(self.statement(self.field(node, "body")?)?),
            },
            "do_statement" => NodeKind::DoWhileStatement {
                body: Box::new(self.statement(self.field(node, "body")?)?),
                test: Box::new(self.parenthesized(self.field(node, "condition")?)?),
            },
            "with_statement" => NodeKind::WithStatement {
                object: Box::new(self.parenthesized(self.field(node, "object")?)?),
                body: Box::new(self.statement(self.field(node, "body")?)?),
            },
            "try_statement" => self.try_statement(node)?,
            "return_statement" => {
                if !self.function.in_function {
                    return Err(self.error("`return` outside of a function", node));
                }
                NodeKind::ReturnStatement {
                    argument: self.optional_expression(named(node).first().copied())?,
                }
            }
            "throw_statement" => NodeKind::ThrowStatement {
                argument: Box::new(self.expression(self.inner(node)?)?),
            },
            "break_statement" => NodeKind::BreakStatement {
                label: self.label(node)?,
            },
            "continue_statement" => NodeKind::ContinueStatement {
                label: self.label(node)?,
            },
            "labeled_statement" => NodeKind::LabeledStatement {
                label: Box::new(self.identifier(self.field(node, "label")?)?),
                body: Box::new(self.statement(self.field(node, "body")?)?),
            },
            "import_statement" => return self.import(node),
            "export_statement" => return self.export(node),
            other => return Err(self.error(format!("unexpected {}", other.replace('_', " ")), node)),
        };
        Ok(Node::new(kind, span))
    }

    pub(super) fn block(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let body = named(node)
            .into_iter()
            .map(|child| self.statement(child))
            .collect::<Result<_, _>>()?;
        Ok(Node::new(NodeKind::BlockStatement { body }, node.byte_range()))
    }

    /// The expression inside a `( )` statement head.
    fn parenthesized(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        self.expression(node)
    }

    fn label(&mut self, node: SyntaxNode<'_>) -> Result<Option<Box<Node>>, ParseError> {
        match node.child_by_field_name("label") {
            Some(label) => Ok(Some(Box::new(self.identifier(label)?))),
            None => Ok(None),
        }
    }

    fn variable_declaration(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let kind = match node.child_by_field_name("kind") {
            Some(keyword) => {
                let text = self.text(keyword);
                let kind = DeclarationKind::from_punct(text)
                    .ok_or_else(|| self.unsupported(&format!("`{}` declarations", text), keyword))?;
                self.require_at(EcmaVersion::Es2015, "`let` and `const` declarations", keyword)?;
                kind
            }
            None => DeclarationKind::Var,
        };
        let mut declarations = Vec::new();
        for declarator in named(node) {
            let init = match declarator.child_by_field_name("value") {
                Some(value) => Some(Box::new(self.expression(value)?)),
                None => None,
            };
            let id = Box::new(self.pattern(self.field(declarator, "name")?)?);
            declarations.push(Node::new(
                NodeKind::VariableDeclarator { id, init },
                declarator.byte_range(),
            ));
        }
        Ok(Node::new(
            NodeKind::VariableDeclaration { kind, declarations },
            node.byte_range(),
        ))
    }

    fn switch_case(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let mut children = named(node).into_iter();
        let test = match node.kind() {
            "switch_case" => match children.next() {
                Some(value) => Some(Box::new(self.expression(value)?)),
                None => return Err(self.error("case without a value", node)),
            },
            _ => None,
        };
        let consequent = children
            .map(|child| self.statement(child))
            .collect::<Result<_, _>>()?;
        Ok(Node::new(NodeKind::SwitchCase { test, consequent }, node.byte_range()))
    }

    fn for_statement(&mut self, node: SyntaxNode<'_>) -> Result<NodeKind, ParseError> {
        let init = match node.child_by_field_name("initializer") {
            Some(init) if matches!(init.kind(), "variable_declaration" | "lexical_declaration") => {
                let mut declaration = self.variable_declaration(init)?;
                if let NodeKind::VariableDeclaration { declarations, .. } = &declaration.kind {
                    if let Some(last) = declarations.last() {
                        declaration.span.end = last.span.end;
                    }
                }
                Some(Box::new(declaration))
            }
            init => self.for_head_expression(init)?,
        };
        let test = self.for_head_expression(node.child_by_field_name("condition"))?;
        let update = self.optional_expression(node.child_by_field_name("increment"))?;
        Ok(NodeKind::ForStatement {
            init,
            test,
            update,
            body: Box::new(self.statement(self.field(node, "body")?)?),
        })
    }

    /// A `for (init; test; ...)` slot, which the grammar may wrap in an
    /// expression or empty statement.
    fn for_head_expression(&mut self, node: Option<SyntaxNode<'_>>) -> Result<Option<Box<Node>>, ParseError> {
        match node {
            Some(node) if node.kind() == "empty_statement" => Ok(None),
            Some(node) if node.kind() == "expression_statement" => {
                Ok(Some(Box::new(self.expression(self.inner(node)?)?)))
            }
            node => self.optional_expression(node),
        }
    }

    fn for_in_statement(&mut self, node: SyntaxNode<'_>) -> Result<NodeKind, ParseError> {
        let left_node = self.field(node, "left")?;
        let left = match node.child_by_field_name("kind") {
            Some(keyword) => {
                let text = self.text(keyword);
                let kind = DeclarationKind::from_punct(text)
                    .ok_or_else(|| self.unsupported(&format!("`{}` declarations", text), keyword))?;
                if kind != DeclarationKind::Var {
                    self.require_at(EcmaVersion::Es2015, "`let` and `const` declarations", keyword)?;
                }
                let id = self.pattern(left_node)?;
                let declarator = Node::new(
                    NodeKind::VariableDeclarator { id: Box::new(id), init: None },
                    left_node.byte_range(),
                );
                Node::new(
                    NodeKind::VariableDeclaration { kind, declarations: vec![declarator] },
                    keyword.start_byte()..left_node.end_byte(),
                )
            }
            None => self.pattern(left_node)?,
        };
        let right = Box::new(self.expression(self.field(node, "right")?)?);
        let body = Box::new(self.statement(self.field(node, "body")?)?);
        let left = Box::new(left);

        let operator = self.field(node, "operator")?;
        if self.text(operator) == "in" {
            return Ok(NodeKind::ForInStatement { left, right, body });
        }
        self.require_at(EcmaVersion::Es2015, "`for ... of` loops", node)?;
        let is_await = has_token(node, "await");
        if is_await {
            self.require_at(EcmaVersion::Es2018, "`for await` loops", node)?;
            if !self.function.is_async {
                return Err(self.error("`for await` is only valid in async functions", node));
            }
        }
        Ok(NodeKind::ForOfStatement { left, right, body, is_await })
    }

    fn try_statement(&mut self, node: SyntaxNode<'_>) -> Result<NodeKind, ParseError> {
        let block = Box::new(self.block(self.field(node, "body")?)?);
        let handler = match node.child_by_field_name("handler") {
            Some(clause) => {
                let param = match clause.child_by_field_name("parameter") {
                    Some(param) => Some(Box::new(self.pattern(param)?)),
                    None => {
                        self.require_at(EcmaVersion::Es2019, "`catch` without a binding", clause)?;
                        None
                    }
                };
                let body = Box::new(self.block(self.field(clause, "body")?)?);
                Some(Box::new(Node::new(NodeKind::CatchClause { param, body }, clause.byte_range())))
            }
            None => None,
        };
        let finalizer = match node.child_by_field_name("finalizer") {
            Some(clause) => Some(Box::new(self.block(self.field(clause, "body")?)?)),
            None => None,
        };
        Ok(NodeKind::TryStatement { block, handler, finalizer })
    }

    // ------------------------------------------------------------------
    // Modules
    // ------------------------------------------------------------------

    fn import(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        self.require_module("`import` declarations", node)?;
        let source = Box::new(self.string_literal(self.field(node, "source")?)?);
        let mut specifiers = Vec::new();
        for child in named(node) {
            match child.kind() {
                "import_clause" => {
                    for item in named(child) {
                        self.import_specifiers(item, &mut specifiers)?;
                    }
                }
                "import_attribute" => return Err(self.unsupported("import attributes", child)),
                _ => {}
            }
        }
        Ok(Node::new(
            NodeKind::ImportDeclaration { specifiers, source },
            node.byte_range(),
        ))
    }

    fn import_specifiers(&mut self, item: SyntaxNode<'_>, specifiers: &mut Vec<Node>) -> Result<(), ParseError> {
        let span = item.byte_range();
        match item.kind() {
            "identifier" => {
                let local = Box::new(self.identifier(item)?);
                specifiers.push(Node::new(NodeKind::ImportDefaultSpecifier { local }, span));
            }
            "namespace_import" => {
                let local = Box::new(self.identifier(self.inner(item)?)?);
                specifiers.push(Node::new(NodeKind::ImportNamespaceSpecifier { local }, span));
            }
            "named_imports" => {
                for specifier in named(item) {
                    let imported = self.module_export_name(self.field(specifier, "name")?)?;
                    let local = match specifier.child_by_field_name("alias") {
                        Some(alias) => self.identifier(alias)?,
                        None => imported.clone(),
                    };
                    specifiers.push(Node::new(
                        NodeKind::ImportSpecifier {
                            imported: Box::new(imported),
                            local: Box::new(local),
                        },
                        specifier.byte_range(),
                    ));
                }
            }
            other => return Err(self.error(format!("unexpected {} in import", other.replace('_', " ")), item)),
        }
        Ok(())
    }

    fn export(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        self.require_module("`export` declarations", node)?;
        let span = node.byte_range();
        if node.child_by_field_name("decorator").is_some() {
            return Err(self.unsupported("decorators", node));
        }
        let is_default = has_token(node, "default");

        if let Some(declaration) = node.child_by_field_name("declaration") {
            let declaration = Box::new(self.statement(declaration)?);
            let kind = if is_default {
                NodeKind::ExportDefaultDeclaration { declaration }
            } else {
                NodeKind::ExportNamedDeclaration {
                    declaration: Some(declaration),
                    specifiers: Vec::new(),
                    source: None,
                }
            };
            return Ok(Node::new(kind, span));
        }
        if let Some(value) = node.child_by_field_name("value") {
            let declaration = Box::new(self.default_export_value(value)?);
            return Ok(Node::new(NodeKind::ExportDefaultDeclaration { declaration }, span));
        }

        let source = match node.child_by_field_name("source") {
            Some(source) => Some(Box::new(self.string_literal(source)?)),
            None => None,
        };
        let mut specifiers = Vec::new();
        for child in named(node) {
            match child.kind() {
                "export_clause" => {
                    for specifier in named(child) {
                        let local = self.module_export_name(self.field(specifier, "name")?)?;
                        let exported = match specifier.child_by_field_name("alias") {
                            Some(alias) => self.module_export_name(alias)?,
                            None => local.clone(),
                        };
                        specifiers.push(Node::new(
                            NodeKind::ExportSpecifier {
                                local: Box::new(local),
                                exported: Box::new(exported),
                            },
                            specifier.byte_range(),
                        ));
                    }
                }
                "namespace_export" => {
                    self.require_at(EcmaVersion::Es2020, "`export * as` declarations", child)?;
                    let exported = Some(Box::new(self.module_export_name(self.inner(child)?)?));
                    let source = source.ok_or_else(|| self.error("`export *` needs a source", node))?;
                    return Ok(Node::new(NodeKind::ExportAllDeclaration { exported, source }, span));
                }
                _ => {}
            }
        }
        if has_token(node, "*") {
            let source = source.ok_or_else(|| self.error("`export *` needs a source", node))?;
            return Ok(Node::new(NodeKind::ExportAllDeclaration { exported: None, source }, span));
        }
        Ok(Node::new(
            NodeKind::ExportNamedDeclaration {
                declaration: None,
                specifiers,
                source,
            },
            span,
        ))
    }

    /// `export default function () {}` and `export default class {}` declare
    /// anonymous functions and classes rather than export expressions.
    fn default_export_value(&mut self, value: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let node = self.expression(value)?;
        let kind = match node.kind {
            NodeKind::FunctionExpression { id, params, body, generator, is_async } => {
                NodeKind::FunctionDeclaration { id, params, body, generator, is_async }
            }
            NodeKind::ClassExpression { id, super_class, body } => {
                NodeKind::ClassDeclaration { id, super_class, body }
            }
            kind => kind,
        };
        Ok(Node::new(kind, node.span))
    }

    /// An imported or exported name. String names are a later edition.
    fn module_export_name(&mut self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        match node.kind() {
            "string" => Err(self.unsupported("string module export names", node)),
            _ => self.identifier(node),
        }
    }
}
