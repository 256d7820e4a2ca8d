//! Compiling template-keyed visitors into kind-keyed dispatch tables.

use std::fmt;

use estree::{DispatchTable, Handler, Node, NodeKind};
use tracing::debug;

use crate::context::MatchContext;
use crate::error::TemplateError;
use crate::template::Template;

/// A handler for a template entry, called only when the template matches.
pub type TemplateHandler<'h> = Box<dyn FnMut(&Node, &MatchContext<'_>, &[&Node]) + 'h>;

enum Entry<'h> {
    Template {
        template: &'h Template,
        handler: TemplateHandler<'h>,
    },
    Kind {
        kind: String,
        handler: Handler<'h>,
    },
}

impl Entry<'_> {
    fn key(&self) -> &str {
        match self {
            Entry::Template { template, .. } => template.kind_name(),
            Entry::Kind { kind, .. } => kind,
        }
    }
}

/// An ordered set of handlers keyed by template or by node kind.
///
/// ```ignore
/// let table = Visitor::new()
///     .on_template(&call, |node, context, _| report(node, context))
///     .on_kind("Program", |_, _| reset())
///     .compile()?;
/// estree::visit(&tree, &mut table);
/// ```
#[derive(Default)]
pub struct Visitor<'h> {
    entries: Vec<Entry<'h>>,
}

impl<'h> Visitor<'h> {
    pub fn new() -> Self {
        Visitor { entries: Vec::new() }
    }

    /// Call `handler` for every node that matches `template`.
    pub fn on_template(
        mut self,
        template: &'h Template,
        handler: impl FnMut(&Node, &MatchContext<'_>, &[&Node]) + 'h,
    ) -> Self {
        self.entries.push(Entry::Template {
            template,
            handler: Box::new(handler),
        });
        self
    }

    /// Call `handler` for every node of kind `kind`.
    pub fn on_kind(mut self, kind: impl Into<String>, handler: impl FnMut(&Node, &[&Node]) + 'h) -> Self {
        self.entries.push(Entry::Kind {
            kind: kind.into(),
            handler: Box::new(handler),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce one handler per node kind. Entries sharing a kind are merged
    /// into a handler that runs each of them in registration order.
    #[tracing::instrument(level = "debug", skip_all, fields(entries = self.entries.len()))]
    pub fn compile(self) -> Result<DispatchTable<'h>, TemplateError> {
        let mut groups: Vec<(String, Vec<Handler<'h>>)> = Vec::new();
        for entry in self.entries {
            let key = entry.key().to_string();
            if !NodeKind::is_known_kind(&key) {
                return Err(TemplateError::UnknownNodeKind { kind: key });
            }
            let handler = match entry {
                Entry::Template { template, handler } => guarded(template, handler),
                Entry::Kind { handler, .. } => handler,
            };
            match groups.iter_mut().find(|(kind, _)| *kind == key) {
                Some((_, handlers)) => handlers.push(handler),
                None => groups.push((key, vec![handler])),
            }
        }

        let mut table = DispatchTable::new();
        for (kind, handlers) in groups {
            debug!(kind = %kind, handlers = handlers.len(), "dispatch entry");
            let handler = match <[Handler<'h>; 1]>::try_from(handlers) {
                Ok([only]) => only,
                Err(handlers) => merged(handlers),
            };
            table.insert(kind, handler);
        }
        Ok(table)
    }
}

impl fmt::Debug for Visitor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&str> = self.entries.iter().map(|entry| entry.key()).collect();
        f.debug_struct("Visitor").field("keys", &keys).finish()
    }
}

/// Run the match engine first and only call through on success. Each call
/// gets its own context.
fn guarded<'h>(template: &'h Template, mut handler: TemplateHandler<'h>) -> Handler<'h> {
    Box::new(move |node: &Node, ancestors: &[&Node]| {
        if let Some(context) = template.matches(node) {
            handler(node, &context, ancestors);
        }
    })
}

fn merged<'h>(mut handlers: Vec<Handler<'h>>) -> Handler<'h> {
    Box::new(move |node: &Node, ancestors: &[&Node]| {
        for handler in handlers.iter_mut() {
            handler(node, ancestors);
        }
    })
}
