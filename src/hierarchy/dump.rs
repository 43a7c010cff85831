use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{LocatorError, LocatorResult};
use crate::hierarchy::criteria::{Criteria, compile};
use crate::hierarchy::element_model::{DisplaySize, ElementInfo, Rect};
use crate::hierarchy::source::HierarchySource;

static BOUNDS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\[([+-]?\d+),([+-]?\d+)\]\[([+-]?\d+),([+-]?\d+)\]")
        .expect("bounds pattern is valid")
});

#[derive(Debug, Clone)]
struct DumpNode {
    attrs: HashMap<String, String>,
    info: ElementInfo,
}

impl DumpNode {
    fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map(String::as_str).unwrap_or("")
    }
}

/// Frozen snapshot parsed once from a uiautomator XML dump.
#[derive(Debug, Clone)]
pub struct ViewHierarchyDump {
    display: DisplaySize,
    nodes: Vec<DumpNode>,
    fingerprint: String,
}

impl ViewHierarchyDump {
    /// Parse every `<node>` in document order. A node with unparsable bounds
    /// fails the whole snapshot.
    pub fn parse(display: DisplaySize, dump: &str) -> LocatorResult<Self> {
        let doc = roxmltree::Document::parse(dump)
            .map_err(|e| LocatorError::MalformedSnapshot(format!("invalid dump XML: {}", e)))?;

        let mut nodes = Vec::new();
        for node in doc.descendants().filter(|n| n.has_tag_name("node")) {
            let attrs: HashMap<String, String> = node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect();
            let child_count = node.children().filter(|c| c.is_element()).count();
            let info = element_info(&attrs, &display, child_count)?;
            nodes.push(DumpNode { attrs, info });
        }

        tracing::debug!(nodes = nodes.len(), "parsed hierarchy dump");

        Ok(Self {
            display,
            nodes,
            fingerprint: text_fingerprint(dump),
        })
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// SHA-1 of the dump text this snapshot was built from.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Elements matching every criterion, in document order.
    pub fn find_objects(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        let matchers = compile(criteria)?;
        Ok(self
            .nodes
            .iter()
            .filter(|node| {
                matchers
                    .iter()
                    .all(|m| m.is_match(node.attr(m.attribute.dump_attr)))
            })
            .map(|node| node.info.clone())
            .collect())
    }
}

impl HierarchySource for ViewHierarchyDump {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        self.find_objects(criteria)
    }
}

fn element_info(
    attrs: &HashMap<String, String>,
    display: &DisplaySize,
    child_count: usize,
) -> LocatorResult<ElementInfo> {
    let flag = |name: &str| attrs.get(name).is_some_and(|v| v == "true");
    let text = |name: &str| attrs.get(name).cloned().unwrap_or_default();

    let bounds = parse_bounds(attrs.get("bounds").map(String::as_str).unwrap_or(""))?;

    Ok(ElementInfo {
        checkable: flag("checkable"),
        checked: flag("checked"),
        clickable: flag("clickable"),
        enabled: flag("enabled"),
        focusable: flag("focusable"),
        focused: flag("focused"),
        long_clickable: flag("long-clickable"),
        scrollable: flag("scrollable"),
        selected: flag("selected"),
        text: text("text"),
        content_description: text("content-desc"),
        class_name: text("class"),
        package_name: text("package"),
        resource_name: text("resource-id"),
        bounds,
        visible_bounds: bounds.clip_to(display),
        child_count,
    })
}

/// Parse `[L,T][R,B]`.
pub fn parse_bounds(raw: &str) -> LocatorResult<Rect> {
    let invalid = || {
        LocatorError::MalformedSnapshot(format!("dump contained invalid bounds value '{}'", raw))
    };
    let caps = BOUNDS_RE.captures(raw).ok_or_else(invalid)?;
    let mut edges = [0i32; 4];
    for (i, edge) in edges.iter_mut().enumerate() {
        *edge = caps[i + 1].parse().map_err(|_| invalid())?;
    }
    Ok(Rect::new(edges[0], edges[1], edges[2], edges[3]))
}

pub fn text_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
