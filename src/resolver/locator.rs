use serde::Serialize;

use crate::hierarchy::criteria::Criteria;
use crate::hierarchy::element_model::ElementInfo;

/// Durable reference to one element: filters, plus an index when the filters
/// alone match more than one element.
///
/// Built once by the resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    filters: Criteria,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    meta: ElementInfo,
}

impl Locator {
    /// Filters that match exactly one element.
    pub(crate) fn unique(filters: Criteria, meta: ElementInfo) -> Self {
        Self {
            filters,
            index: None,
            meta,
        }
    }

    /// Filters shared by several elements, narrowed by position in query order.
    pub(crate) fn indexed(filters: Criteria, index: usize, meta: ElementInfo) -> Self {
        Self {
            filters,
            index: Some(index),
            meta,
        }
    }

    pub fn filters(&self) -> &Criteria {
        &self.filters
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Attributes of the element as it was when resolved.
    pub fn meta(&self) -> &ElementInfo {
        &self.meta
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }
}
