//! Syntax templates for JavaScript.
//!
//! A [`TemplateManager`] hands out placeholder [`Variable`]s and compiles
//! source text mentioning them into [`Template`]s. A template matches a
//! concrete [`estree::Node`] when the two trees have the same shape, with
//! each variable standing for whatever node (or, for spreads, run of
//! sibling nodes) sits in its place. A variable used twice must bind
//! structurally equal nodes both times.
//!
//! ```ignore
//! let mut manager = TemplateManager::new();
//! let receiver = manager.variable();
//! let call = manager.template(&format!("{receiver}.substr(0)"))?;
//!
//! let mut table = Visitor::new()
//!     .on_template(&call, |node, context, _| {
//!         let receiver = context.node(&receiver);
//!         // ...
//!     })
//!     .compile()?;
//! estree::visit(&tree, &mut table);
//! ```

pub mod context;
pub mod equality;
pub mod error;
pub mod manager;
pub mod pattern;
pub mod template;
pub mod variable;
pub mod visitor;

pub use context::{Capture, MatchContext};
pub use equality::{lists_equal, nodes_equal};
pub use error::TemplateError;
pub use manager::{SessionOptions, TemplateManager};
pub use pattern::match_pattern;
pub use template::{Template, TemplateId};
pub use variable::{Variable, VariableId, VariableKind, VariableRegistry};
pub use visitor::{TemplateHandler, Visitor};
