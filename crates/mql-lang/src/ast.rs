pub mod error;
pub mod node;
pub mod parser;

use crate::Shared;

/// The stages of a pipeline, in order, one per `|`-separated expression.
pub type Program = Vec<Shared<node::Node>>;
