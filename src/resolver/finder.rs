use crate::error::{LocatorError, LocatorResult};
use crate::hierarchy::criteria::Criteria;
use crate::hierarchy::element_model::ElementInfo;
use crate::hierarchy::source::HierarchySource;
use crate::resolver::locator::Locator;

/// Candidates whose center is this far or farther from the tap are dropped
/// when `ignore_distant` is set.
pub const DISTANCE_THRESHOLD: f64 = 200.0;

/// An element that contains the queried point, with its position in the
/// criteria query result.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub index: usize,
    pub info: ElementInfo,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub locator: Locator,
    /// How many elements contained the point before the smallest was picked
    pub candidate_count: usize,
}

/// Finds the element an operator meant at a screen coordinate and derives a
/// locator that re-finds it.
pub struct ObjectResolver<S> {
    source: S,
}

impl<S: HierarchySource> ObjectResolver<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Resolve `coord` to a locator, or fail with [`LocatorError::NotFound`].
    pub fn find_object_contains(
        &self,
        coord: (i32, i32),
        ignore_distant: bool,
        criteria: &Criteria,
    ) -> LocatorResult<Locator> {
        self.resolve(coord, ignore_distant, criteria)
            .map(|r| r.locator)
    }

    pub fn resolve(
        &self,
        coord: (i32, i32),
        ignore_distant: bool,
        criteria: &Criteria,
    ) -> LocatorResult<Resolution> {
        let (x, y) = coord;
        let candidates = self.candidates(coord, ignore_distant, criteria)?;
        let candidate_count = candidates.len();

        let smallest = select_smallest(candidates).ok_or(LocatorError::NotFound { x, y })?;

        tracing::debug!(
            x,
            y,
            candidates = candidate_count,
            index = smallest.index,
            class = %smallest.info.class_name,
            "selected smallest candidate"
        );

        let locator = match self.unique_filters(&smallest.info)? {
            Some(filters) => Locator::unique(filters, smallest.info),
            None => {
                tracing::warn!(
                    index = smallest.index,
                    "no unique attribute; falling back to criteria with index"
                );
                Locator::indexed(criteria.clone(), smallest.index, smallest.info)
            }
        };

        Ok(Resolution {
            locator,
            candidate_count,
        })
    }

    /// Elements matching `criteria` whose visible bounds contain `coord`.
    pub fn candidates(
        &self,
        coord: (i32, i32),
        ignore_distant: bool,
        criteria: &Criteria,
    ) -> LocatorResult<Vec<Candidate>> {
        let (x, y) = coord;
        let objects = self.source.query(criteria)?;
        Ok(objects
            .into_iter()
            .enumerate()
            .filter(|(_, info)| {
                let r = &info.visible_bounds;
                if !r.contains(x, y) {
                    return false;
                }
                !ignore_distant || r.distance_from_center(x, y) < DISTANCE_THRESHOLD
            })
            .map(|(index, info)| Candidate { index, info })
            .collect())
    }

    /// Re-find the element a locator refers to. The index defaults to 0.
    pub fn locate(&self, locator: &Locator) -> LocatorResult<ElementInfo> {
        let index = locator.index().unwrap_or(0);
        self.source
            .query(locator.filters())?
            .into_iter()
            .nth(index)
            .ok_or_else(|| {
                LocatorError::Inconsistent(format!(
                    "locator index {} not found on device screen",
                    index
                ))
            })
    }

    /// First of resource-id, description, text, class name that alone
    /// matches exactly one element.
    fn unique_filters(&self, info: &ElementInfo) -> LocatorResult<Option<Criteria>> {
        let identifying = [
            ("resourceId", &info.resource_name),
            ("description", &info.content_description),
            ("text", &info.text),
            ("className", &info.class_name),
        ];

        for (name, value) in identifying {
            if value.is_empty() {
                continue;
            }
            let filters = Criteria::single(name, value.as_str());
            if self.source.query(&filters)?.len() == 1 {
                tracing::debug!(attribute = name, "unique locator");
                return Ok(Some(filters));
            }
        }
        Ok(None)
    }
}

/// Smallest visible area wins; ties go to the earliest in traversal order.
fn select_smallest(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<(i64, Candidate)> = None;
    for candidate in candidates {
        let area = candidate.info.visible_bounds.area();
        match &best {
            Some((min_area, _)) if area >= *min_area => {}
            _ => best = Some((area, candidate)),
        }
    }
    best.map(|(_, c)| c)
}
