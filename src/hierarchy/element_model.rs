use serde::{Deserialize, Serialize};

/// Rectangle in device pixels, as reported by uiautomator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Half-open containment: left <= x < right, top <= y < bottom.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    pub fn area(&self) -> i64 {
        (self.bottom as i64 - self.top as i64).saturating_mul(self.right as i64 - self.left as i64)
    }

    pub fn center(&self) -> (f64, f64) {
        let cx = self.left as f64 + (self.right as f64 - self.left as f64) / 2.0;
        let cy = self.top as f64 + (self.bottom as f64 - self.top as f64) / 2.0;
        (cx, cy)
    }

    /// Euclidean distance from (x, y) to the rectangle center.
    pub fn distance_from_center(&self, x: i32, y: i32) -> f64 {
        let (cx, cy) = self.center();
        (x as f64 - cx).hypot(y as f64 - cy)
    }

    /// Clamp every edge into [0, width] x [0, height].
    pub fn clip_to(&self, display: &DisplaySize) -> Rect {
        let clamp_x = |v: i32| v.clamp(0, display.display_width.max(0));
        let clamp_y = |v: i32| v.clamp(0, display.display_height.max(0));
        Rect {
            left: clamp_x(self.left),
            top: clamp_y(self.top),
            right: clamp_x(self.right),
            bottom: clamp_y(self.bottom),
        }
    }
}

/// Display dimensions as returned by the device's `deviceInfo` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplaySize {
    pub display_width: i32,
    pub display_height: i32,
}

impl DisplaySize {
    pub fn new(display_width: i32, display_height: i32) -> Self {
        Self {
            display_width,
            display_height,
        }
    }
}

/// One UI node at query time.
///
/// The serde names follow the `objInfo` payload of the uiautomator server, so
/// live records deserialize straight into this type and frozen records parsed
/// from a dump serialize to the same shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementInfo {
    pub checkable: bool,
    pub checked: bool,
    pub clickable: bool,
    pub enabled: bool,
    pub focusable: bool,
    pub focused: bool,
    pub long_clickable: bool,
    pub scrollable: bool,
    pub selected: bool,

    pub text: String,
    pub content_description: String,
    pub class_name: String,
    pub package_name: String,
    pub resource_name: String,

    pub bounds: Rect,
    pub visible_bounds: Rect,
    pub child_count: usize,
}
