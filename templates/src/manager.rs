use std::sync::atomic::{AtomicU64, Ordering};

use estree::ParserOptions;
use serde::Deserialize;
use tracing::debug;

use crate::error::TemplateError;
use crate::template::{self, Template, TemplateId};
use crate::variable::{Variable, VariableKind, VariableRegistry};

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Settings shared by every template of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub parser: ParserOptions,
}

/// A template-authoring session: owns the variables it hands out and
/// compiles templates that refer to them.
///
/// Variables are only meaningful within the session that created them. A
/// template mentioning another session's variable fails to compile.
#[derive(Debug)]
pub struct TemplateManager {
    options: SessionOptions,
    registry: VariableRegistry,
    next_template: u64,
}

impl TemplateManager {
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        let session = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        TemplateManager {
            options,
            registry: VariableRegistry::new(session),
            next_template: 0,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.registry.session()
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn new_variable(&mut self, kind: VariableKind) -> Variable {
        self.registry.create(kind)
    }

    pub fn variable(&mut self) -> Variable {
        self.new_variable(VariableKind::Simple)
    }

    pub fn spread_variable(&mut self) -> Variable {
        self.new_variable(VariableKind::Spread)
    }

    pub fn declaration_group_variable(&mut self) -> Variable {
        self.new_variable(VariableKind::DeclarationGroup)
    }

    /// Compile a template from source in which variables appear as their
    /// placeholders, usually spliced in with `format!`.
    pub fn template(&mut self, source: &str) -> Result<Template, TemplateError> {
        let id = TemplateId {
            session: self.session_id(),
            index: self.next_template,
        };
        self.next_template += 1;
        let template = template::compile(id, source, &self.registry, &self.options.parser)?;
        debug!(
            template = %id,
            kind = template.kind_name(),
            variables = template.variables().count(),
            "compiled template"
        );
        Ok(template)
    }

    /// Compile a template from literal fragments interleaved with variables:
    /// `fragments[0] variables[0] fragments[1] ... fragments[n]`.
    ///
    /// A variable from another session is rejected before parsing, with the
    /// span of the text it would have been spliced in as.
    pub fn template_parts(&mut self, fragments: &[&str], variables: &[Variable]) -> Result<Template, TemplateError> {
        if fragments.len() != variables.len() + 1 {
            return Err(TemplateError::FragmentMismatch {
                fragments: fragments.len(),
                variables: variables.len(),
            });
        }
        let mut source = String::new();
        for (fragment, variable) in fragments.iter().zip(variables) {
            source.push_str(fragment);
            let start = source.len();
            source.push_str(&variable.to_string());
            if !self.registry.contains(variable) {
                return Err(TemplateError::UnknownVariable {
                    name: variable.placeholder(),
                    span: start..source.len(),
                });
            }
        }
        if let Some(last) = fragments.last() {
            source.push_str(last);
        }
        self.template(&source)
    }
}

impl Default for TemplateManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_are_distinct() {
        let a = TemplateManager::new();
        let b = TemplateManager::new();
        assert_ne!(a.session_id(), b.session_id());
    }

    #[test]
    fn template_ids_count_up() {
        let mut manager = TemplateManager::new();
        let first = manager.template("a").expect("compile failed");
        let second = manager.template("b").expect("compile failed");
        assert!(first.id() < second.id());
    }

    #[test]
    fn parts_are_spliced_in_order() {
        let mut manager = TemplateManager::new();
        let x = manager.variable();
        let template = manager.template_parts(&["", ".foo()"], &[x]).expect("compile failed");
        assert_eq!(template.source(), format!("{}.foo()", x.placeholder()));
    }

    #[test]
    fn fragment_count_must_fit_variables() {
        let mut manager = TemplateManager::new();
        let x = manager.variable();
        let err = manager.template_parts(&["", ""], &[x, x]).expect_err("should fail");
        assert!(matches!(err, TemplateError::FragmentMismatch { fragments: 2, variables: 2 }));
    }

    #[test]
    fn foreign_parts_are_rejected_before_parsing() {
        let mut other = TemplateManager::new();
        let foreign = other.variable();
        let mut manager = TemplateManager::new();
        let ours = manager.variable();
        let before = manager.next_template;
        let err = manager
            .template_parts(&["f(", ", ", ")"], &[ours, foreign])
            .expect_err("should fail");
        let expected_start = "f(".len() + ours.placeholder().len() + ", ".len();
        assert!(matches!(
            err,
            TemplateError::UnknownVariable { ref name, ref span }
                if *name == foreign.placeholder()
                    && *span == (expected_start..expected_start + foreign.placeholder().len())
        ));
        assert_eq!(manager.next_template, before);
    }
}
