use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use estree::ParseError;
use thiserror::Error;

/// Errors raised while building templates and visitors. Match failures are
/// not errors.
#[derive(Error, Debug, Clone)]
pub enum TemplateError {
    /// The template source does not parse.
    #[error("template does not parse: {0}")]
    Syntax(#[from] ParseError),

    /// The template source contains no statement.
    #[error("template source is empty")]
    Empty,

    /// A placeholder-shaped identifier that this session never created.
    #[error("`{name}` is not a variable of this session")]
    UnknownVariable { name: String, span: Range<usize> },

    /// A spread variable outside the sole element of a list position.
    #[error("spread variable `{name}` must be the only element of a list")]
    MisplacedSpread { name: String, span: Range<usize> },

    /// Tagged fragments must be exactly one more than the variables.
    #[error("{fragments} template fragments cannot surround {variables} variables")]
    FragmentMismatch { fragments: usize, variables: usize },

    /// A visitor key that is neither a template nor a node kind.
    #[error("`{kind}` is not a node kind")]
    UnknownNodeKind { kind: String },
}

impl TemplateError {
    /// Convert to a codespan-reporting Diagnostic labelled against `file_id`,
    /// the id under which the template source was registered.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        match self {
            TemplateError::Syntax(err) => Diagnostic::new(err.severity)
                .with_message(format!("template does not parse: {}", err.message))
                .with_labels(vec![Label::primary(file_id, err.span.clone())])
                .with_notes(err.notes.clone()),
            TemplateError::UnknownVariable { span, .. } => Diagnostic::error()
                .with_message(self.to_string())
                .with_labels(vec![Label::primary(file_id, span.clone())])
                .with_notes(vec!["variables can only be used by the session that created them".to_string()]),
            TemplateError::MisplacedSpread { span, .. } => Diagnostic::error()
                .with_message(self.to_string())
                .with_labels(vec![Label::primary(file_id, span.clone())]),
            TemplateError::Empty
            | TemplateError::FragmentMismatch { .. }
            | TemplateError::UnknownNodeKind { .. } => Diagnostic::error().with_message(self.to_string()),
        }
    }
}
