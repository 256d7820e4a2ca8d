use std::collections::HashMap;
use std::fmt;

use estree::node::DeclarationKind;
use estree::{Node, NodeKind};

/// Identifiers starting with this prefix are reserved for placeholders.
pub const PLACEHOLDER_PREFIX: &str = "__tmplvar_";

/// How a variable captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKind {
    /// Any single node.
    Simple,
    /// A run of zero or more siblings. Only valid as the sole element of a
    /// list position.
    Spread,
    /// A `var` declaration with more than one declarator.
    DeclarationGroup,
}

/// Identity of a variable: the session that created it plus a per-session
/// counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId {
    pub session: u64,
    pub index: u64,
}

impl VariableId {
    /// The identifier spelled into template source for this variable.
    pub fn placeholder(self) -> String {
        format!("{}{}_{}", PLACEHOLDER_PREFIX, self.session, self.index)
    }

    /// Recover an id from a placeholder identifier.
    pub fn from_placeholder(name: &str) -> Option<VariableId> {
        let rest = name.strip_prefix(PLACEHOLDER_PREFIX)?;
        let (session, index) = rest.split_once('_')?;
        Some(VariableId {
            session: session.parse().ok()?,
            index: index.parse().ok()?,
        })
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{}", self.session, self.index)
    }
}

/// A placeholder in a template.
///
/// Displaying a variable yields the text it contributes to template source:
/// the placeholder identifier, or `var <placeholder>, ` for a declaration
/// group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable {
    id: VariableId,
    kind: VariableKind,
}

impl Variable {
    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    pub fn placeholder(&self) -> String {
        self.id.placeholder()
    }

    /// Whether `node` may be bound to this variable at a node position.
    pub fn accepts(&self, node: &Node) -> bool {
        match self.kind {
            VariableKind::Simple => true,
            VariableKind::Spread => false,
            VariableKind::DeclarationGroup => matches!(
                &node.kind,
                NodeKind::VariableDeclaration {
                    kind: DeclarationKind::Var,
                    declarations,
                } if declarations.len() > 1
            ),
        }
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            VariableKind::DeclarationGroup => write!(f, "var {}, ", self.placeholder()),
            VariableKind::Simple | VariableKind::Spread => f.write_str(&self.placeholder()),
        }
    }
}

/// Session-scoped, append-only table of variables keyed by placeholder.
#[derive(Debug)]
pub struct VariableRegistry {
    session: u64,
    next_index: u64,
    variables: HashMap<String, Variable>,
}

impl VariableRegistry {
    pub fn new(session: u64) -> Self {
        VariableRegistry {
            session,
            next_index: 0,
            variables: HashMap::new(),
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Create a variable with a fresh id and record it.
    pub fn create(&mut self, kind: VariableKind) -> Variable {
        let id = VariableId {
            session: self.session,
            index: self.next_index,
        };
        self.next_index += 1;
        let variable = Variable { id, kind };
        self.variables.insert(id.placeholder(), variable);
        variable
    }

    /// Look up a variable by its placeholder identifier.
    pub fn get(&self, placeholder: &str) -> Option<&Variable> {
        self.variables.get(placeholder)
    }

    pub fn contains(&self, variable: &Variable) -> bool {
        self.variables.get(&variable.placeholder()) == Some(variable)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Whether `name` has the shape of a placeholder, registered or not.
pub fn is_placeholder(name: &str) -> bool {
    VariableId::from_placeholder(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_monotonic_within_a_session() {
        let mut registry = VariableRegistry::new(7);
        let a = registry.create(VariableKind::Simple);
        let b = registry.create(VariableKind::Spread);
        assert!(a.id() < b.id());
        assert_eq!(a.id().session, 7);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn placeholders_round_trip_through_ids() {
        let mut registry = VariableRegistry::new(3);
        let a = registry.create(VariableKind::Simple);
        assert_eq!(a.placeholder(), "__tmplvar_3_0");
        assert_eq!(VariableId::from_placeholder(&a.placeholder()), Some(a.id()));
        assert_eq!(registry.get("__tmplvar_3_0"), Some(&a));
        assert!(!is_placeholder("__tmplvar_x"));
    }

    #[test]
    fn declaration_group_stringifies_as_var_prefix() {
        let mut registry = VariableRegistry::new(1);
        let group = registry.create(VariableKind::DeclarationGroup);
        assert_eq!(group.to_string(), "var __tmplvar_1_0, ");
    }

    #[test]
    fn foreign_variables_are_not_contained() {
        let mut ours = VariableRegistry::new(1);
        let mut theirs = VariableRegistry::new(2);
        let _ = ours.create(VariableKind::Simple);
        let foreign = theirs.create(VariableKind::Simple);
        assert!(!ours.contains(&foreign));
    }
}
