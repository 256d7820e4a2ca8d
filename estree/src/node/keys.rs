//! Per-kind key tables.
//!
//! Every node kind exposes two ordered views of its properties:
//! - [`NodeKind::edges`]: the child positions (a single optional child or a
//!   list of children), in ESTree visitor-key order.
//! - [`NodeKind::leaves`]: the scalar properties (names, operators, flags,
//!   literal values) that structural comparison checks by value.
//!
//! Two nodes of the same kind always produce the same keys in the same order,
//! so consumers can zip them.

use super::{LiteralValue, Node, NodeKind};

/// A view over a list of child nodes.
///
/// Most lists are dense. Array literals and array patterns can contain holes
/// (`[a, , b]`), which show up as `None` when iterating a `Sparse` list.
#[derive(Debug, Clone, Copy)]
pub enum NodeList<'a> {
    Dense(&'a [Node]),
    Sparse(&'a [Option<Node>]),
}

impl<'a> NodeList<'a> {
    pub fn len(&self) -> usize {
        match self {
            NodeList::Dense(nodes) => nodes.len(),
            NodeList::Sparse(nodes) => nodes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `None` when out of range, `Some(None)` for a hole.
    pub fn get(&self, index: usize) -> Option<Option<&'a Node>> {
        match self {
            NodeList::Dense(nodes) => nodes.get(index).map(Some),
            NodeList::Sparse(nodes) => nodes.get(index).map(|n| n.as_ref()),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&'a Node>> + use<'a> {
        let (dense, sparse): (&'a [Node], &'a [Option<Node>]) = match *self {
            NodeList::Dense(nodes) => (nodes, &[]),
            NodeList::Sparse(nodes) => (&[], nodes),
        };
        dense.iter().map(Some).chain(sparse.iter().map(|n| n.as_ref()))
    }

    /// The underlying slice when the list cannot contain holes.
    pub fn as_dense(&self) -> Option<&'a [Node]> {
        match self {
            NodeList::Dense(nodes) => Some(nodes),
            NodeList::Sparse(_) => None,
        }
    }

    /// The first element, if the list has exactly one and it is not a hole.
    pub fn sole(&self) -> Option<&'a Node> {
        if self.len() == 1 { self.get(0).flatten() } else { None }
    }
}

/// A child position of a node.
#[derive(Debug, Clone, Copy)]
pub enum Edge<'a> {
    Node(Option<&'a Node>),
    List(NodeList<'a>),
}

/// A scalar property compared by value.
#[derive(Debug, Clone, Copy)]
pub enum Leaf<'a> {
    Str(&'a str),
    OptStr(Option<&'a str>),
    Flag(bool),
    Operator(&'static str),
    Value(&'a LiteralValue),
}

impl PartialEq for Leaf<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Leaf::Str(a), Leaf::Str(b)) => a == b,
            (Leaf::OptStr(a), Leaf::OptStr(b)) => a == b,
            (Leaf::Flag(a), Leaf::Flag(b)) => a == b,
            (Leaf::Operator(a), Leaf::Operator(b)) => a == b,
            (Leaf::Value(a), Leaf::Value(b)) => a.same_value(b),
            _ => false,
        }
    }
}

fn one(node: &Node) -> Edge<'_> {
    Edge::Node(Some(node))
}

fn opt(node: &Option<Box<Node>>) -> Edge<'_> {
    Edge::Node(node.as_deref())
}

fn list(nodes: &[Node]) -> Edge<'_> {
    Edge::List(NodeList::Dense(nodes))
}

fn holes(nodes: &[Option<Node>]) -> Edge<'_> {
    Edge::List(NodeList::Sparse(nodes))
}

impl NodeKind {
    /// Child positions in ESTree visitor-key order.
    pub fn edges(&self) -> Vec<(&'static str, Edge<'_>)> {
        use NodeKind::*;
        match self {
            Program { body, .. } => vec![("body", list(body))],
            ExpressionStatement { expression } => vec![("expression", one(expression))],
            BlockStatement { body } => vec![("body", list(body))],
            EmptyStatement | DebuggerStatement | ThisExpression | Super => Vec::new(),
            WithStatement { object, body } => vec![("object", one(object)), ("body", one(body))],
            ReturnStatement { argument } => vec![("argument", opt(argument))],
            LabeledStatement { label, body } => vec![("label", one(label)), ("body", one(body))],
            BreakStatement { label } | ContinueStatement { label } => vec![("label", opt(label))],
            IfStatement { test, consequent, alternate } => vec![
                ("test", one(test)),
                ("consequent", one(consequent)),
                ("alternate", opt(alternate)),
            ],
            SwitchStatement { discriminant, cases } => {
                vec![("discriminant", one(discriminant)), ("cases", list(cases))]
            }
            SwitchCase { test, consequent } => {
                vec![("test", opt(test)), ("consequent", list(consequent))]
            }
            ThrowStatement { argument } => vec![("argument", one(argument))],
            TryStatement { block, handler, finalizer } => vec![
                ("block", one(block)),
                ("handler", opt(handler)),
                ("finalizer", opt(finalizer)),
            ],
            CatchClause { param, body } => vec![("param", opt(param)), ("body", one(body))],
            WhileStatement { test, body } => vec![("test", one(test)), ("body", one(body))],
            DoWhileStatement { body, test } => vec![("body", one(body)), ("test", one(test))],
            ForStatement { init, test, update, body } => vec![
                ("init", opt(init)),
                ("test", opt(test)),
                ("update", opt(update)),
                ("body", one(body)),
            ],
            ForInStatement { left, right, body } | ForOfStatement { left, right, body, .. } => vec![
                ("left", one(left)),
                ("right", one(right)),
                ("body", one(body)),
            ],
            FunctionDeclaration { id, params, body, .. }
            | FunctionExpression { id, params, body, .. } => vec![
                ("id", opt(id)),
                ("params", list(params)),
                ("body", one(body)),
            ],
            VariableDeclaration { declarations, .. } => {
                vec![("declarations", list(declarations))]
            }
            VariableDeclarator { id, init } => vec![("id", one(id)), ("init", opt(init))],
            ClassDeclaration { id, super_class, body } | ClassExpression { id, super_class, body } => {
                vec![
                    ("id", opt(id)),
                    ("superClass", opt(super_class)),
                    ("body", one(body)),
                ]
            }
            ClassBody { body } => vec![("body", list(body))],
            MethodDefinition { key, value, .. } => vec![("key", one(key)), ("value", one(value))],
            Identifier { .. } | Literal { .. } | TemplateElement { .. } => Vec::new(),
            ArrayExpression { elements } | ArrayPattern { elements } => {
                vec![("elements", holes(elements))]
            }
            ObjectExpression { properties } | ObjectPattern { properties } => {
                vec![("properties", list(properties))]
            }
            Property { key, value, .. } => vec![("key", one(key)), ("value", one(value))],
            ArrowFunctionExpression { params, body, .. } => {
                vec![("params", list(params)), ("body", one(body))]
            }
            TemplateLiteral { quasis, expressions } => {
                vec![("quasis", list(quasis)), ("expressions", list(expressions))]
            }
            TaggedTemplateExpression { tag, quasi } => vec![("tag", one(tag)), ("quasi", one(quasi))],
            UnaryExpression { argument, .. }
            | UpdateExpression { argument, .. }
            | SpreadElement { argument }
            | AwaitExpression { argument }
            | RestElement { argument } => vec![("argument", one(argument))],
            BinaryExpression { left, right, .. }
            | LogicalExpression { left, right, .. }
            | AssignmentExpression { left, right, .. }
            | AssignmentPattern { left, right } => vec![("left", one(left)), ("right", one(right))],
            ConditionalExpression { test, consequent, alternate } => vec![
                ("test", one(test)),
                ("consequent", one(consequent)),
                ("alternate", one(alternate)),
            ],
            CallExpression { callee, arguments, .. } | NewExpression { callee, arguments } => {
                vec![("callee", one(callee)), ("arguments", list(arguments))]
            }
            MemberExpression { object, property, .. } => {
                vec![("object", one(object)), ("property", one(property))]
            }
            ChainExpression { expression } => vec![("expression", one(expression))],
            ImportExpression { source } => vec![("source", one(source))],
            SequenceExpression { expressions } => vec![("expressions", list(expressions))],
            YieldExpression { argument, .. } => vec![("argument", opt(argument))],
            MetaProperty { meta, property } => vec![("meta", one(meta)), ("property", one(property))],
            ImportDeclaration { specifiers, source } => {
                vec![("specifiers", list(specifiers)), ("source", one(source))]
            }
            ImportSpecifier { imported, local } => {
                vec![("imported", one(imported)), ("local", one(local))]
            }
            ImportDefaultSpecifier { local } | ImportNamespaceSpecifier { local } => {
                vec![("local", one(local))]
            }
            ExportNamedDeclaration { declaration, specifiers, source } => vec![
                ("declaration", opt(declaration)),
                ("specifiers", list(specifiers)),
                ("source", opt(source)),
            ],
            ExportSpecifier { local, exported } => {
                vec![("exported", one(exported)), ("local", one(local))]
            }
            ExportDefaultDeclaration { declaration } => vec![("declaration", one(declaration))],
            ExportAllDeclaration { exported, source } => {
                vec![("exported", opt(exported)), ("source", one(source))]
            }
        }
    }

    /// Scalar properties compared by value.
    pub fn leaves(&self) -> Vec<(&'static str, Leaf<'_>)> {
        use NodeKind::*;
        match self {
            Program { source_type, .. } => vec![("sourceType", Leaf::Operator(source_type.as_str()))],
            ForOfStatement { is_await, .. } => vec![("await", Leaf::Flag(*is_await))],
            FunctionDeclaration { generator, is_async, .. }
            | FunctionExpression { generator, is_async, .. } => vec![
                ("generator", Leaf::Flag(*generator)),
                ("async", Leaf::Flag(*is_async)),
            ],
            ArrowFunctionExpression { expression, is_async, .. } => vec![
                ("expression", Leaf::Flag(*expression)),
                ("async", Leaf::Flag(*is_async)),
            ],
            VariableDeclaration { kind, .. } => vec![("kind", Leaf::Operator(kind.as_str()))],
            MethodDefinition { kind, computed, is_static, .. } => vec![
                ("kind", Leaf::Operator(kind.as_str())),
                ("computed", Leaf::Flag(*computed)),
                ("static", Leaf::Flag(*is_static)),
            ],
            Identifier { name } => vec![("name", Leaf::Str(name))],
            Literal { value, raw } => vec![("value", Leaf::Value(value)), ("raw", Leaf::Str(raw))],
            Property { kind, method, shorthand, computed, .. } => vec![
                ("kind", Leaf::Operator(kind.as_str())),
                ("method", Leaf::Flag(*method)),
                ("shorthand", Leaf::Flag(*shorthand)),
                ("computed", Leaf::Flag(*computed)),
            ],
            TemplateElement { cooked, raw, tail } => vec![
                ("cooked", Leaf::OptStr(cooked.as_deref())),
                ("raw", Leaf::Str(raw)),
                ("tail", Leaf::Flag(*tail)),
            ],
            UnaryExpression { operator, .. } => vec![
                ("operator", Leaf::Operator(operator.as_str())),
                ("prefix", Leaf::Flag(true)),
            ],
            UpdateExpression { operator, prefix, .. } => vec![
                ("operator", Leaf::Operator(operator.as_str())),
                ("prefix", Leaf::Flag(*prefix)),
            ],
            BinaryExpression { operator, .. } => vec![("operator", Leaf::Operator(operator.as_str()))],
            LogicalExpression { operator, .. } => vec![("operator", Leaf::Operator(operator.as_str()))],
            AssignmentExpression { operator, .. } => {
                vec![("operator", Leaf::Operator(operator.as_str()))]
            }
            MemberExpression { computed, optional, .. } => vec![
                ("computed", Leaf::Flag(*computed)),
                ("optional", Leaf::Flag(*optional)),
            ],
            CallExpression { optional, .. } => vec![("optional", Leaf::Flag(*optional))],
            YieldExpression { delegate, .. } => vec![("delegate", Leaf::Flag(*delegate))],
            _ => Vec::new(),
        }
    }
}
