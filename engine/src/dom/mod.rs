pub mod node;

pub use node::{Descendants, Dom, ElementData, Node, NodeId, NodeType};
