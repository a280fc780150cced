//! Domain module - validation record, host metadata shapes and the seams
//! to external collaborators.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod errors;
pub mod page_metadata;
pub mod repositories;
pub mod services;
pub mod validation_record;

pub use errors::{RemoteLookupError, WidgetError, WidgetResult};
pub use page_metadata::{
    ContentDetail, NotificationPayload, PageDetail, PageMetadata, UserDetail, UserIdentity,
};
pub use repositories::KeyValueStore;
pub use services::{HostContentApi, ValidationNotifier};
pub use validation_record::ValidationRecord;
