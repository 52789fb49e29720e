//! Shared data model definitions for the Shoplens storefront checker.

pub mod events;
pub mod hostname;
pub mod status;

pub use events::{EventKind, StoredEvent};
pub use hostname::{Hostname, HostnameError};
pub use status::{CheckStatus, StatusReport};
