//! The date/time object as seen on the message bus.

pub mod handle;
pub mod identity;
pub mod interface;

pub use handle::ServiceHandle;
pub use identity::{ServiceIdentity, DATE_TIME_IDENTITY, DATE_TIME_SCHEMA};
pub use interface::DateTimeService;
