use droid_locator::resolver::finder::DISTANCE_THRESHOLD;
use droid_locator::{
    Criteria, CriterionValue, HierarchySource, LocatorError, ObjectResolver, Rect,
    ViewHierarchyDump,
};

use crate::common::utils::{DISPLAY, hierarchy, home_resolver, node, plain_node};

mod common;

const VOICE_HINT: &str = "com.google.android.googlequicksearchbox:id/search_widget_voice_hint";

fn clickable() -> Criteria {
    Criteria::new().with("clickable", true).with("enabled", true)
}

// =========================================================================
// End-to-end against the home screen dump
// =========================================================================

#[test]
fn clickable_icon_resolves_by_description() {
    let resolver = home_resolver();
    let locator = resolver
        .find_object_contains((150, 1280), false, &clickable())
        .unwrap();

    assert_eq!(locator.filters(), &Criteria::single("description", "Gmail"));
    assert_eq!(locator.index(), None);
    assert_eq!(locator.meta().visible_bounds, Rect::new(100, 1200, 400, 1400));
}

#[test]
fn text_criteria_families_reach_the_same_icon() {
    let resolver = home_resolver();
    for (name, value) in [
        ("textContains", "mai"),
        ("textStartsWith", "Gmai"),
        ("textMatches", ".+ail$"),
    ] {
        let criteria = Criteria::new().with(name, value).with("enabled", true);
        let locator = resolver
            .find_object_contains((150, 1280), false, &criteria)
            .unwrap();
        assert_eq!(
            locator.filters().get("description"),
            Some(&CriterionValue::Text("Gmail".into())),
            "Criterion {} should resolve to Gmail",
            name
        );
    }
}

#[test]
fn index_criterion_finds_camera() {
    let resolver = home_resolver();
    let criteria = Criteria::new().with("index", 5).with("enabled", true);
    let locator = resolver
        .find_object_contains((700, 1300), false, &criteria)
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("description", "Camera"));
}

#[test]
fn widget_resolves_by_class_or_description() {
    let resolver = home_resolver();

    let by_class = resolver
        .find_object_contains(
            (500, 900),
            false,
            &Criteria::single("className", "android.appwidget.AppWidgetHostView"),
        )
        .unwrap();
    assert_eq!(by_class.filters(), &Criteria::single("description", "Google App"));

    let by_desc = resolver
        .find_object_contains((500, 900), false, &Criteria::single("description", "Google App"))
        .unwrap();
    assert_eq!(by_desc.filters(), &Criteria::single("description", "Google App"));
}

#[test]
fn resource_id_is_preferred_when_unique() {
    let resolver = home_resolver();
    let locator = resolver
        .find_object_contains((500, 900), false, &Criteria::single("resourceId", VOICE_HINT))
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("resourceId", VOICE_HINT));
    assert!(!locator.is_indexed());
}

#[test]
fn innermost_element_wins_without_criteria() {
    // Root, launcher, drag layer, workspace, cell, widget, search bar and hint all contain the point
    let resolver = home_resolver();
    let resolution = resolver.resolve((500, 900), false, &Criteria::new()).unwrap();

    assert_eq!(resolution.candidate_count, 8);
    assert_eq!(resolution.locator.filters(), &Criteria::single("resourceId", VOICE_HINT));
}

#[test]
fn attribute_priority_is_resource_id_description_text_class() {
    // Each button overlaps the same point; only the attribute under test is unique
    let cases = [
        (
            node("android.widget.Button", "[0,0][100,100]", "OK", "Confirm", "app:id/ok"),
            Criteria::single("resourceId", "app:id/ok"),
        ),
        (
            node("android.widget.Button", "[0,0][100,100]", "OK", "Confirm", ""),
            Criteria::single("description", "Confirm"),
        ),
        (
            node("android.widget.Button", "[0,0][100,100]", "OK", "", ""),
            Criteria::single("text", "OK"),
        ),
        (
            node("android.widget.Button", "[0,0][100,100]", "", "", ""),
            Criteria::single("className", "android.widget.Button"),
        ),
    ];

    for (target, expected) in cases {
        let xml = hierarchy(&format!(
            "{}{}",
            node("android.view.View", "[0,0][1080,1920]", "", "", ""),
            target
        ));
        let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
        let locator = resolver
            .find_object_contains((50, 50), false, &Criteria::new())
            .unwrap();
        assert_eq!(locator.filters(), &expected);
        assert_eq!(locator.index(), None);
    }
}

#[test]
fn shared_attributes_are_skipped_for_the_next_one() {
    // Same resource id and description on both rows; texts differ
    let xml = hierarchy(&format!(
        "{}{}",
        node("android.widget.TextView", "[0,0][1080,100]", "Wi-Fi", "Setting", "android:id/title"),
        node("android.widget.TextView", "[0,100][1080,200]", "Bluetooth", "Setting", "android:id/title"),
    ));
    let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    let locator = resolver
        .find_object_contains((500, 150), false, &Criteria::new())
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("text", "Bluetooth"));
}

#[test]
fn clipped_element_resolves_by_resource_id() {
    let resolver = home_resolver();
    let locator = resolver
        .find_object_contains((5, 1850), true, &clickable())
        .unwrap();
    assert_eq!(
        locator.filters(),
        &Criteria::single("resourceId", "com.android.systemui:id/back")
    );
}

#[test]
fn point_outside_visible_bounds_is_not_found() {
    // The Back button starts at x=-40, but its visible bounds start at 0
    let resolver = home_resolver();
    let err = resolver
        .find_object_contains((-10, 1850), false, &clickable())
        .unwrap_err();
    assert!(matches!(err, LocatorError::NotFound { x: -10, y: 1850 }));
    assert!(err.is_not_found());
}

#[test]
fn right_and_bottom_edges_are_exclusive() {
    let resolver = home_resolver();
    // x=400 is Gmail's right edge and Play Store's left edge
    let locator = resolver
        .find_object_contains((400, 1300), false, &clickable())
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("description", "Play Store"));

    // y=1400 is below every icon in the row
    let err = resolver
        .find_object_contains((150, 1400), false, &clickable())
        .unwrap_err();
    assert!(err.is_not_found());
}

// =========================================================================
// Distance heuristic
// =========================================================================

#[test]
fn distant_center_is_excluded_when_requested() {
    let resolver = home_resolver();
    // Near the left end of the search bar: inside it, but ~485px from its center
    let near_edge = (62, 830);

    let kept = resolver
        .find_object_contains(near_edge, false, &clickable())
        .unwrap();
    assert_eq!(
        kept.filters(),
        &Criteria::single(
            "resourceId",
            "com.google.android.googlequicksearchbox:id/search_widget_background"
        )
    );

    let err = resolver
        .find_object_contains(near_edge, true, &clickable())
        .unwrap_err();
    assert!(matches!(err, LocatorError::NotFound { x: 62, y: 830 }));
}

#[test]
fn distance_threshold_is_strict() {
    // 400x400 box centered on (200, 200): a point exactly 200px away is dropped
    let xml = hierarchy(&plain_node("android.view.View", "[0,0][400,400]"));
    let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    assert_eq!(DISTANCE_THRESHOLD, 200.0);

    assert!(resolver.find_object_contains((0, 200), true, &Criteria::new()).is_err());
    assert!(resolver.find_object_contains((1, 200), true, &Criteria::new()).is_ok());
    assert!(resolver.find_object_contains((0, 200), false, &Criteria::new()).is_ok());
}

#[test]
fn distance_filter_lets_leaf_win_over_far_container() {
    let resolver = home_resolver();
    let resolution = resolver.resolve((150, 1280), true, &Criteria::new()).unwrap();

    // Only Gmail's center is within reach; every ancestor is centered far away
    assert_eq!(resolution.candidate_count, 1);
    assert_eq!(resolution.locator.filters(), &Criteria::single("description", "Gmail"));
}

// =========================================================================
// Smallest-area selection
// =========================================================================

#[test]
fn smaller_element_wins_over_screen_container() {
    let xml = hierarchy(&format!(
        "{}{}",
        plain_node("android.widget.FrameLayout", "[0,0][1080,1920]"),
        plain_node("android.widget.Button", "[480,880][520,920]"),
    ));
    let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    let locator = resolver
        .find_object_contains((500, 900), false, &Criteria::new())
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("className", "android.widget.Button"));
    assert_eq!(locator.meta().visible_bounds.area(), 40 * 40);
}

#[test]
fn area_uses_visible_bounds() {
    // The first node is huge but mostly off screen; visibly it is the smaller one
    let xml = hierarchy(&format!(
        "{}{}",
        plain_node("android.view.View", "[1000,-5000][1080,100]"),
        plain_node("android.widget.Button", "[900,0][1080,200]"),
    ));
    let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    let locator = resolver
        .find_object_contains((1050, 50), false, &Criteria::new())
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("className", "android.view.View"));
}

// =========================================================================
// Index fallback
// =========================================================================

fn twin_resolver() -> ObjectResolver<ViewHierarchyDump> {
    let xml = hierarchy(&format!(
        "{}{}",
        plain_node("android.widget.FrameLayout", "[0,0][540,1920]"),
        plain_node("android.widget.FrameLayout", "[540,0][1080,1920]"),
    ));
    ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap())
}

#[test]
fn identical_elements_fall_back_to_criteria_and_index() {
    let resolver = twin_resolver();
    let criteria = Criteria::single("className", "android.widget.FrameLayout");

    let left = resolver.find_object_contains((100, 900), false, &criteria).unwrap();
    let right = resolver.find_object_contains((900, 900), false, &criteria).unwrap();

    assert_eq!(left.filters(), &criteria);
    assert_eq!(right.filters(), &criteria);
    assert_eq!(left.index(), Some(0));
    assert_eq!(right.index(), Some(1));

    let left_el = resolver.locate(&left).unwrap();
    let right_el = resolver.locate(&right).unwrap();
    assert_ne!(left_el, right_el, "Indexed locators must reach different elements");
    assert_eq!(left_el.visible_bounds, Rect::new(0, 0, 540, 1920));
    assert_eq!(right_el.visible_bounds, Rect::new(540, 0, 1080, 1920));
}

#[test]
fn fallback_index_is_position_in_criteria_results() {
    let resolver = twin_resolver();
    // Empty criteria: the right twin is second in the unfiltered list too
    let locator = resolver.find_object_contains((900, 900), false, &Criteria::new()).unwrap();
    assert_eq!(locator.filters(), &Criteria::new());
    assert_eq!(locator.index(), Some(1));
}

#[test]
fn identical_full_screen_elements_pick_the_first() {
    let xml = hierarchy(&format!(
        "{}{}",
        plain_node("android.widget.FrameLayout", "[0,0][1080,1920]"),
        plain_node("android.widget.FrameLayout", "[0,0][1080,1920]"),
    ));
    let resolver = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    let locator = resolver
        .find_object_contains(
            (500, 900),
            false,
            &Criteria::single("className", "android.widget.FrameLayout"),
        )
        .unwrap();
    assert_eq!(locator.index(), Some(0));
}

// =========================================================================
// Locator invariants
// =========================================================================

#[test]
fn every_resolved_locator_refinds_the_element_under_the_point() {
    let resolver = home_resolver();
    let criteria_sets = [Criteria::new(), clickable(), Criteria::single("enabled", true)];

    let mut resolved = 0;
    for criteria in &criteria_sets {
        for x in (0..1080).step_by(45) {
            for y in (0..1920).step_by(60) {
                for ignore_distant in [false, true] {
                    let locator = match resolver.find_object_contains((x, y), ignore_distant, criteria) {
                        Ok(l) => l,
                        Err(e) => {
                            assert!(e.is_not_found(), "Unexpected error {:?}", e);
                            continue;
                        }
                    };
                    resolved += 1;

                    if !locator.is_indexed() {
                        let matches = resolver.source().query(locator.filters()).unwrap();
                        assert_eq!(matches.len(), 1, "Unindexed filters must be unique");
                    }

                    let element = resolver.locate(&locator).unwrap();
                    assert_eq!(&element, locator.meta());
                    assert!(
                        element.visible_bounds.contains(x, y),
                        "Locator {:?} re-found an element not under ({}, {})",
                        locator.filters(),
                        x,
                        y
                    );
                }
            }
        }
    }
    assert!(resolved > 500, "Grid should resolve most points, got {}", resolved);
}

#[test]
fn locate_reports_inconsistency_when_index_is_gone() {
    let resolver = twin_resolver();
    let criteria = Criteria::single("className", "android.widget.FrameLayout");
    let right = resolver.find_object_contains((900, 900), false, &criteria).unwrap();

    // The screen changed: only one frame is left
    let xml = hierarchy(&plain_node("android.widget.FrameLayout", "[0,0][1080,1920]"));
    let changed = ObjectResolver::new(ViewHierarchyDump::parse(DISPLAY, &xml).unwrap());
    let err = changed.locate(&right).unwrap_err();
    assert!(matches!(err, LocatorError::Inconsistent(_)));
}

// =========================================================================
// Errors propagate
// =========================================================================

#[test]
fn unknown_criterion_is_not_silently_dropped() {
    let resolver = home_resolver();
    let criteria = Criteria::new().with("nosuchkey", true).with("enabled", true);
    let err = resolver
        .find_object_contains((700, 1300), false, &criteria)
        .unwrap_err();
    assert!(matches!(err, LocatorError::UnsupportedCriterion(_)));
    assert!(!err.is_not_found());
}

#[test]
fn malformed_snapshot_never_reaches_the_resolver() {
    let xml = hierarchy(&plain_node("android.widget.FrameLayout", "invalid bounds value"));
    let err = ViewHierarchyDump::parse(DISPLAY, &xml).unwrap_err();
    assert!(matches!(err, LocatorError::MalformedSnapshot(_)));
}

#[test]
fn resolver_works_through_a_trait_object() {
    let dump = crate::common::utils::home_dump();
    let source: Box<dyn HierarchySource> = Box::new(dump);
    let resolver = ObjectResolver::new(source);
    let locator = resolver
        .find_object_contains((150, 1280), false, &clickable())
        .unwrap();
    assert_eq!(locator.filters(), &Criteria::single("description", "Gmail"));
}
