//! Depth-first traversal with per-kind handlers.
//!
//! A [`DispatchTable`] maps ESTree kind names to handlers. [`visit`] walks a
//! tree in pre-order and calls the handler registered for each node's kind
//! before descending into its children, passing the node's ancestors
//! (root first, parent last).

use std::collections::HashMap;
use std::fmt;

use crate::node::{Edge, Node};

/// A handler invoked with the visited node and its ancestors.
pub type Handler<'h> = Box<dyn FnMut(&Node, &[&Node]) + 'h>;

/// Handlers keyed by node kind name.
#[derive(Default)]
pub struct DispatchTable<'h> {
    handlers: HashMap<String, Handler<'h>>,
}

impl<'h> DispatchTable<'h> {
    pub fn new() -> Self {
        DispatchTable {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `kind`, returning the handler it replaces.
    pub fn insert(&mut self, kind: impl Into<String>, handler: Handler<'h>) -> Option<Handler<'h>> {
        self.handlers.insert(kind.into(), handler)
    }

    pub fn get_mut(&mut self, kind: &str) -> Option<&mut Handler<'h>> {
        self.handlers.get_mut(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Registered kind names, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for DispatchTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable").field("kinds", &self.kinds()).finish()
    }
}

/// Walk `root` depth-first, invoking handlers from `table`.
pub fn visit(root: &Node, table: &mut DispatchTable<'_>) {
    let mut ancestors = Vec::new();
    walk(root, table, &mut ancestors);
}

fn walk<'n>(node: &'n Node, table: &mut DispatchTable<'_>, ancestors: &mut Vec<&'n Node>) {
    if let Some(handler) = table.get_mut(node.kind_name()) {
        handler(node, ancestors);
    }

    ancestors.push(node);
    for (_, edge) in node.kind.edges() {
        match edge {
            Edge::Node(Some(child)) => walk(child, table, ancestors),
            Edge::Node(None) => {}
            Edge::List(children) => {
                for child in children.iter().flatten() {
                    walk(child, table, ancestors);
                }
            }
        }
    }
    ancestors.pop();
}
