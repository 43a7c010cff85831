use serde_json::{Value, json};

use crate::error::{LocatorError, LocatorResult};
use crate::device::rpc::RpcTransport;
use crate::device::selector::Selector;
use crate::hierarchy::criteria::Criteria;
use crate::hierarchy::dump::ViewHierarchyDump;
use crate::hierarchy::element_model::{DisplaySize, ElementInfo};
use crate::hierarchy::source::HierarchySource;

/// Live snapshot: every query goes to the device.
///
/// Answers the same criteria as a [`ViewHierarchyDump`], so a resolver can run
/// against either without knowing which one it has.
pub struct LiveHierarchy<T: RpcTransport> {
    transport: T,
}

impl<T: RpcTransport> LiveHierarchy<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of on-screen elements matching the selector.
    pub fn count(&self, selector: &Selector) -> LocatorResult<usize> {
        let result = self.transport.call("count", json!([selector.to_json()]))?;
        from_value(result, "count")
    }

    pub fn obj_info(&self, selector: &Selector) -> LocatorResult<ElementInfo> {
        let result = self.transport.call("objInfo", json!([selector.to_json()]))?;
        from_value(result, "objInfo")
    }

    pub fn display_size(&self) -> LocatorResult<DisplaySize> {
        let result = self.transport.call("deviceInfo", json!([]))?;
        from_value(result, "deviceInfo")
    }

    /// Raw window hierarchy XML.
    pub fn dump_xml(&self) -> LocatorResult<String> {
        let result = self
            .transport
            .call("dumpWindowHierarchy", json!([false, Value::Null]))?;
        from_value(result, "dumpWindowHierarchy")
    }

    /// Freeze the current screen into a dump-backed snapshot.
    pub fn freeze(&self) -> LocatorResult<ViewHierarchyDump> {
        let display = self.display_size()?;
        let xml = self.dump_xml()?;
        ViewHierarchyDump::parse(display, &xml)
    }
}

impl<T: RpcTransport> HierarchySource for LiveHierarchy<T> {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        let selector = Selector::from_criteria(criteria)?;
        let count = self.count(&selector)?;
        tracing::debug!(count, "live query");
        (0..count)
            .map(|i| self.obj_info(&selector.instance(i)))
            .collect()
    }
}

fn from_value<R: serde::de::DeserializeOwned>(value: Value, method: &str) -> LocatorResult<R> {
    serde_json::from_value(value).map_err(|e| LocatorError::JsonParse {
        context: format!("{} result", method),
        source: e,
    })
}
