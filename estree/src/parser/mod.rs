pub mod error;
mod expression;
mod function;
mod literal;
mod pattern;
mod statement;

pub use error::ParseError;

use std::ops::Range;

use tracing::{debug, trace};
use tree_sitter::Node as SyntaxNode;

use crate::node::{Node, NodeKind};
use crate::options::{EcmaVersion, ParserOptions, SourceType};

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    options: ParserOptions,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            options: ParserOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the source into a `Program` node.
    ///
    /// tree-sitter recovers from syntax errors, so the first `ERROR` or
    /// missing node in its tree is reported instead of a partial program.
    pub fn parse(&self) -> Result<Node, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_javascript::LANGUAGE.into())
            .map_err(|e| ParseError::error(format!("cannot load the JavaScript grammar: {}", e), 0..0, self.file_id))?;
        let tree = parser
            .parse(&self.source, None)
            .ok_or_else(|| ParseError::error("the parser produced no tree", 0..0, self.file_id))?;

        let root = tree.root_node();
        if root.has_error() {
            let error = self.syntax_error(root);
            debug!(file_id = self.file_id, %error, "syntax error");
            return Err(error);
        }
        trace!(file_id = self.file_id, nodes = root.descendant_count(), "parsed source");

        let mut lower = Lower::new(&self.source, self.file_id, self.options);
        lower.program(root)
    }

    /// Describe the first erroneous node under `root`.
    fn syntax_error(&self, root: SyntaxNode<'_>) -> ParseError {
        let Some(node) = first_error(root) else {
            return ParseError::error("syntax error", 0..self.source.len(), self.file_id);
        };
        if node.is_missing() {
            let at = node.start_byte();
            return ParseError::error(format!("expected `{}`", node.kind()), at..at, self.file_id);
        }
        let span = node.byte_range();
        let text = self.source.get(span.clone()).unwrap_or("").trim();
        let message = match text.lines().next() {
            Some(line) if !line.is_empty() => format!("unexpected `{}`", line),
            _ => "unexpected end of input".to_string(),
        };
        ParseError::error(message, span, self.file_id)
    }
}

/// Parse `source` with `options`, reporting errors against file id 0.
pub fn parse(source: &str, options: &ParserOptions) -> Result<Node, ParseError> {
    Parser::new(source.to_string(), 0)
        .with_options(*options)
        .parse()
}

/// Depth-first search for the first `ERROR` or missing node.
fn first_error(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}

// ---------------------------------------------------------------------------
// Lowering state
// ---------------------------------------------------------------------------

/// What the innermost enclosing function allows.
#[derive(Debug, Clone, Copy, Default)]
struct FunctionContext {
    in_function: bool,
    is_async: bool,
    is_generator: bool,
}

/// Lowers a tree-sitter concrete syntax tree into ESTree nodes, enforcing the
/// configured edition and source type along the way.
struct Lower<'s> {
    source: &'s str,
    file_id: usize,
    options: ParserOptions,
    function: FunctionContext,
}

impl<'s> Lower<'s> {
    fn new(source: &'s str, file_id: usize, options: ParserOptions) -> Self {
        Lower {
            source,
            file_id,
            options,
            function: FunctionContext::default(),
        }
    }

    fn program(&mut self, root: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let source_type = self.options.source_type;
        if source_type == SourceType::Module {
            self.require(EcmaVersion::Es2015, "module source type", 0..0)?;
        }
        let mut body = Vec::new();
        for child in named(root) {
            if child.kind() == "hash_bang_line" {
                continue;
            }
            body.push(self.statement(child)?);
        }
        Ok(Node::new(
            NodeKind::Program { source_type, body },
            0..self.source.len(),
        ))
    }

    // ------------------------------------------------------------------
    // Syntax tree access
    // ------------------------------------------------------------------

    fn text(&self, node: SyntaxNode<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or("")
    }

    fn error(&self, msg: impl Into<String>, node: SyntaxNode<'_>) -> ParseError {
        ParseError::error(msg, node.byte_range(), self.file_id)
    }

    /// The child in `field`, which the grammar guarantees for `node`'s kind.
    fn field<'t>(&self, node: SyntaxNode<'t>, field: &str) -> Result<SyntaxNode<'t>, ParseError> {
        node.child_by_field_name(field)
            .ok_or_else(|| self.error(format!("{} has no {}", node.kind(), field), node))
    }

    /// The first named child that is not a comment.
    fn inner<'t>(&self, node: SyntaxNode<'t>) -> Result<SyntaxNode<'t>, ParseError> {
        named(node)
            .into_iter()
            .next()
            .ok_or_else(|| self.error(format!("empty {}", node.kind()), node))
    }

    fn unsupported(&self, feature: &str, node: SyntaxNode<'_>) -> ParseError {
        self.error(format!("{} are not supported", feature), node)
    }

    /// Fail when the configured edition predates `version`.
    fn require(&self, version: EcmaVersion, feature: &str, span: Range<usize>) -> Result<(), ParseError> {
        if self.options.ecma_version >= version {
            return Ok(());
        }
        Err(ParseError::error(
            format!("{} requires ecmaVersion {} or later", feature, version.year()),
            span,
            self.file_id,
        )
        .with_note(format!("the parser is configured for {}", self.options.ecma_version)))
    }

    fn require_at(&self, version: EcmaVersion, feature: &str, node: SyntaxNode<'_>) -> Result<(), ParseError> {
        self.require(version, feature, node.byte_range())
    }

    fn require_module(&self, feature: &str, node: SyntaxNode<'_>) -> Result<(), ParseError> {
        if self.options.source_type == SourceType::Module {
            return Ok(());
        }
        Err(self
            .error(format!("{} may only appear in a module", feature), node)
            .with_note("set the source type to `module` to parse imports and exports"))
    }

    /// Elements of an array literal or pattern. The grammar has no node for
    /// an elision, so holes are recovered from the commas.
    fn elements<'t>(
        &mut self,
        node: SyntaxNode<'t>,
        mut element: impl FnMut(&mut Self, SyntaxNode<'t>) -> Result<Node, ParseError>,
    ) -> Result<Vec<Option<Node>>, ParseError> {
        let mut elements = Vec::new();
        let mut after_separator = true;
        for child in children(node) {
            match child.kind() {
                "[" | "]" if !child.is_named() => {}
                "," if !child.is_named() => {
                    if after_separator {
                        elements.push(None);
                    }
                    after_separator = true;
                }
                _ => {
                    elements.push(Some(element(self, child)?));
                    after_separator = false;
                }
            }
        }
        Ok(elements)
    }

    /// Run `f` with a different function context, restoring it afterwards.
    fn with_function<T>(
        &mut self,
        context: FunctionContext,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        let saved = std::mem::replace(&mut self.function, context);
        let result = f(self);
        self.function = saved;
        result
    }
}

/// Named children, skipping comments and other extras.
fn named(node: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect();
    children
}

/// Every child, anonymous tokens included, skipping extras.
fn children(node: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut cursor = node.walk();
    let children = node
        .children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect();
    children
}

/// Whether `node` has the anonymous token `token` among its children.
fn has_token(node: SyntaxNode<'_>, token: &str) -> bool {
    children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_statement(source: &str) -> Node {
        let program = parse(source, &ParserOptions::default()).expect("parse failed");
        match program.kind {
            NodeKind::Program { mut body, .. } => body.remove(0),
            other => panic!("expected program, got {:?}", other),
        }
    }

    #[test]
    fn program_span_covers_source() {
        let program = parse("a;\nb;", &ParserOptions::default()).expect("parse failed");
        assert_eq!(program.span, 0..5);
    }

    #[test]
    fn asi_at_line_break() {
        let program = parse("a\nb", &ParserOptions::default()).expect("parse failed");
        match program.kind {
            NodeKind::Program { body, .. } => assert_eq!(body.len(), 2),
            other => panic!("expected program, got {:?}", other),
        }
    }

    #[test]
    fn missing_semicolon_on_one_line_fails() {
        assert!(parse("a b", &ParserOptions::default()).is_err());
    }

    #[test]
    fn version_gate_names_the_required_edition() {
        let options = ParserOptions::default().with_ecma_version(EcmaVersion::Es5);
        let err = parse("let x = 1;", &options).expect_err("let should need ES2015");
        assert!(err.message.contains("2015"), "message was: {}", err.message);
    }

    #[test]
    fn statement_spans_exclude_trailing_trivia() {
        let stmt = first_statement("foo(1);   ");
        assert_eq!(stmt.span, 0..7);
    }

    #[test]
    fn comments_are_skipped() {
        let program = parse("/* a */ f(/* b */ 1, // c\n 2);", &ParserOptions::default()).expect("parse failed");
        let NodeKind::Program { body, .. } = &program.kind else {
            panic!("expected program");
        };
        let NodeKind::ExpressionStatement { expression } = &body[0].kind else {
            panic!("expected expression statement");
        };
        let NodeKind::CallExpression { arguments, .. } = &expression.kind else {
            panic!("expected call");
        };
        assert_eq!(arguments.len(), 2);
    }

    #[test]
    fn imports_need_a_module() {
        let err = parse("import x from 'y';", &ParserOptions::default()).expect_err("script import");
        assert!(err.message.contains("module"), "message was: {}", err.message);
    }
}
