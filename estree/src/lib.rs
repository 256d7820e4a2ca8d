//! ESTree-shaped syntax trees for JavaScript.
//!
//! `estree` parses ECMAScript source (ES5 through ES2020, script or module)
//! with the tree-sitter JavaScript grammar, lowers the concrete syntax tree
//! into [`Node`] trees whose kinds and child keys follow the ESTree
//! conventions, and walks them with per-kind handlers. Syntax newer than the
//! configured edition is rejected during lowering.

pub mod node;
pub mod options;
pub mod parser;
pub mod visit;

pub use node::{Edge, Leaf, LiteralValue, Node, NodeKind, NodeList};
pub use options::{EcmaVersion, ParserOptions, SourceType};
pub use parser::{ParseError, Parser, parse};
pub use visit::{DispatchTable, Handler, visit};
