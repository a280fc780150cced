//! Application layer module
//!
//! Use cases, per-widget controller state and the data transfer objects
//! exchanged with the host.

pub mod dto;
pub mod metadata_resolver;
pub mod shared_state;
pub mod state;
pub mod state_store;
pub mod validation_workflow;

pub use dto::{DynamicProperties, ExtensionContext, HostContext, WidgetView};
pub use metadata_resolver::MetadataResolver;
pub use shared_state::SharedState;
pub use state::WidgetController;
pub use state_store::ValidationStateStore;
pub use validation_workflow::{ValidationWorkflow, WorkflowAction, WorkflowPhase};
