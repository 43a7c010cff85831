//! Resolve a screen coordinate on an Android device to the UI element the
//! operator meant, and derive a locator that finds it again later.
//!
//! A snapshot answers attribute queries ([`hierarchy::source::HierarchySource`]),
//! either frozen from a dump ([`hierarchy::dump::ViewHierarchyDump`]) or live
//! through the on-device server ([`device::live::LiveHierarchy`]). The
//! [`resolver::finder::ObjectResolver`] turns a point plus criteria into a
//! [`resolver::locator::Locator`].

pub mod cli;
pub mod device;
pub mod error;
pub mod hierarchy;
pub mod resolver;
pub mod trace;

pub use error::{LocatorError, LocatorResult};
pub use hierarchy::criteria::{Criteria, CriterionValue};
pub use hierarchy::dump::ViewHierarchyDump;
pub use hierarchy::element_model::{DisplaySize, ElementInfo, Rect};
pub use hierarchy::source::HierarchySource;
pub use resolver::finder::ObjectResolver;
pub use resolver::locator::Locator;
