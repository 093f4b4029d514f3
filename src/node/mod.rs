//! Runtime node handles and the concurrent registry.

mod client;
mod registry;

pub use client::{BackendStats, NodeClient, NodeConnector, Versions};
pub use registry::NodeRegistry;
