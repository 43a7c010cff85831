use crate::error::LocatorResult;
use crate::hierarchy::criteria::Criteria;
use crate::hierarchy::element_model::ElementInfo;

/// Anything that can answer "which elements satisfy these criteria?".
///
/// Implemented by the frozen [`ViewHierarchyDump`](crate::hierarchy::dump::ViewHierarchyDump)
/// and the live [`LiveHierarchy`](crate::device::live::LiveHierarchy). Results must come back
/// in stable traversal order, since resolvers use positions in that order as locator indices.
pub trait HierarchySource {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>>;
}

impl<S: HierarchySource + ?Sized> HierarchySource for &S {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        (**self).query(criteria)
    }
}

impl<S: HierarchySource + ?Sized> HierarchySource for Box<S> {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        (**self).query(criteria)
    }
}
