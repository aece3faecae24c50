pub mod document;
pub mod error;
pub mod flow;
pub mod kind;
pub mod node;
pub mod registry;
pub mod session;
pub mod topology;

// Re-export commonly used types
pub use document::FlowDocument;
pub use error::{Advisory, FieldViolation, FlowError, NodeViolation};
pub use flow::Flow;
pub use kind::NodeKind;
pub use node::{Edge, Node, NodeData, Position};
pub use session::{EditorSession, Focus, InstanceRef};
