//! Literals: strings, numbers, regular expressions and template literals.

use tree_sitter::Node as SyntaxNode;

use super::{Lower, ParseError, named};
use crate::node::{LiteralValue, Node, NodeKind};
use crate::options::{EcmaVersion, SourceType};

impl Lower<'_> {
    pub(super) fn literal(&self, node: SyntaxNode<'_>, value: LiteralValue) -> Node {
        let raw = self.text(node).to_string();
        Node::new(NodeKind::Literal { value, raw }, node.byte_range())
    }

    pub(super) fn string_literal(&self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let raw = self.text(node);
        let body = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
        let value = cook(body).map_err(|msg| self.error(msg, node))?;
        Ok(self.literal(node, LiteralValue::String(value)))
    }

    pub(super) fn number_literal(&self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let raw = self.text(node);
        if raw.contains('_') {
            return Err(self.unsupported("numeric separators", node));
        }
        if let Some(digits) = raw.strip_suffix('n') {
            self.require_at(EcmaVersion::Es2020, "BigInt literals", node)?;
            return Ok(self.literal(node, LiteralValue::BigInt(digits.to_string())));
        }
        if is_legacy_octal(raw) && self.options.source_type == SourceType::Module {
            return Err(self.error("legacy octal literals are not allowed in modules", node));
        }
        if has_prefix(raw, 'o') || has_prefix(raw, 'b') {
            self.require_at(EcmaVersion::Es2015, "binary and octal literals", node)?;
        }
        let value = number_value(raw).ok_or_else(|| self.error(format!("invalid number `{}`", raw), node))?;
        Ok(self.literal(node, LiteralValue::Number(value)))
    }

    pub(super) fn regex_literal(&self, node: SyntaxNode<'_>) -> Result<Node, ParseError> {
        let pattern = self.text(self.field(node, "pattern")?).to_string();
        let flags = match node.child_by_field_name("flags") {
            Some(flags) => self.text(flags).to_string(),
            None => String::new(),
        };
        for flag in flags.chars() {
            match flag {
                'g' | 'i' | 'm' => {}
                'u' | 'y' => self.require_at(EcmaVersion::Es2015, "the `u` and `y` regular expression flags", node)?,
                's' => self.require_at(EcmaVersion::Es2018, "the `s` regular expression flag", node)?,
                other => return Err(self.error(format!("unknown regular expression flag `{}`", other), node)),
            }
        }
        Ok(self.literal(node, LiteralValue::RegExp { pattern, flags }))
    }

    /// A template string, split into its quasis and substituted expressions.
    ///
    /// Quasis are sliced from the source between the backticks and the
    /// `${ }` delimiters. A tagged template keeps an invalid escape as a quasi
    /// without a cooked value, an untagged one rejects it.
    pub(super) fn template_literal(&mut self, node: SyntaxNode<'_>, tagged: bool) -> Result<Node, ParseError> {
        self.require_at(EcmaVersion::Es2015, "template literals", node)?;
        let range = node.byte_range();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        let mut cursor = range.start + 1;

        for substitution in named(node)
            .into_iter()
            .filter(|child| child.kind() == "template_substitution")
        {
            quasis.push(self.template_element(cursor..substitution.start_byte(), false, tagged, node)?);
            expressions.push(self.expression(self.inner(substitution)?)?);
            cursor = substitution.end_byte();
        }
        let end = range.end.saturating_sub(1).max(cursor);
        quasis.push(self.template_element(cursor..end, true, tagged, node)?);

        Ok(Node::new(NodeKind::TemplateLiteral { quasis, expressions }, range))
    }

    fn template_element(
        &self,
        span: std::ops::Range<usize>,
        tail: bool,
        tagged: bool,
        template: SyntaxNode<'_>,
    ) -> Result<Node, ParseError> {
        let raw = self.source.get(span.clone()).unwrap_or("").replace("\r\n", "\n").replace('\r', "\n");
        let cooked = match cook(&raw) {
            Ok(cooked) => Some(cooked),
            Err(_) if tagged => None,
            Err(msg) => return Err(self.error(msg, template)),
        };
        Ok(Node::new(NodeKind::TemplateElement { cooked, raw, tail }, span))
    }
}

/// Identifier text with `\u` escapes resolved.
pub(super) fn identifier_name(text: &str) -> Result<String, String> {
    if text.contains('\\') { cook(text) } else { Ok(text.to_string()) }
}

/// Resolve the escape sequences in the body of a string or template.
fn cook(body: &str) -> Result<String, String> {
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            return Err("unterminated escape sequence".into());
        };
        match escaped {
            'n' => value.push('\n'),
            't' => value.push('\t'),
            'r' => value.push('\r'),
            'b' => value.push('\u{8}'),
            'f' => value.push('\u{c}'),
            'v' => value.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|d| d.is_ascii_digit()) => value.push('\0'),
            'x' => value.push(hex_char(&mut chars, 2)?),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut code = String::new();
                loop {
                    match chars.next() {
                        Some('}') if !code.is_empty() => break,
                        Some(d) if d.is_ascii_hexdigit() => code.push(d),
                        _ => return Err("malformed unicode escape".into()),
                    }
                }
                let code = u32::from_str_radix(&code, 16).map_err(|_| "malformed unicode escape".to_string())?;
                value.push(char::from_u32(code).ok_or_else(|| "invalid code point".to_string())?);
            }
            'u' => value.push(hex_char(&mut chars, 4)?),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '1'..='9' => return Err("octal escape sequences are not allowed".into()),
            other => value.push(other),
        }
    }
    Ok(value)
}

fn hex_char(chars: &mut impl Iterator<Item = char>, count: usize) -> Result<char, String> {
    let digits: String = chars.take(count).collect();
    if digits.len() != count || !digits.chars().all(|d| d.is_ascii_hexdigit()) {
        return Err("malformed hexadecimal escape".into());
    }
    let code = u32::from_str_radix(&digits, 16).map_err(|_| "malformed hexadecimal escape".to_string())?;
    Ok(char::from_u32(code).unwrap_or('\u{fffd}'))
}

fn has_prefix(raw: &str, letter: char) -> bool {
    let mut chars = raw.chars();
    chars.next() == Some('0') && chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&letter))
}

/// `0777`: a leading zero followed by more digits.
fn is_legacy_octal(raw: &str) -> bool {
    raw.len() > 1 && raw.starts_with('0') && raw.bytes().all(|b| b.is_ascii_digit())
}

/// The numeric value of a number literal's source text.
fn number_value(raw: &str) -> Option<f64> {
    for (letter, radix) in [('x', 16), ('o', 8), ('b', 2)] {
        if has_prefix(raw, letter) {
            return radix_value(&raw[2..], radix);
        }
    }
    if is_legacy_octal(raw) && raw.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        return radix_value(&raw[1..], 8);
    }
    raw.parse::<f64>().ok()
}

fn radix_value(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_are_cooked() {
        assert_eq!(cook(r"a\nb\x41B\u{43}\'").as_deref(), Ok("a\nbABC'"));
        assert_eq!(cook("line\\\ncontinued").as_deref(), Ok("linecontinued"));
        assert!(cook(r"\1").is_err());
        assert!(cook(r"\u{zz}").is_err());
    }

    #[test]
    fn number_forms() {
        assert_eq!(number_value("0x1F"), Some(31.0));
        assert_eq!(number_value("0b101"), Some(5.0));
        assert_eq!(number_value("0o17"), Some(15.0));
        assert_eq!(number_value("017"), Some(15.0));
        assert_eq!(number_value("089"), Some(89.0));
        assert_eq!(number_value("1e3"), Some(1000.0));
        assert_eq!(number_value(".5"), Some(0.5));
        assert_eq!(number_value("0x"), None);
    }

    #[test]
    fn escaped_identifiers_resolve() {
        assert_eq!(identifier_name(r"\u0061b").as_deref(), Ok("ab"));
        assert_eq!(identifier_name("plain").as_deref(), Ok("plain"));
    }
}
