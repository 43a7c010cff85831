use droid_locator::{DisplaySize, ObjectResolver, ViewHierarchyDump};

pub const DISPLAY: DisplaySize = DisplaySize {
    display_width: 1080,
    display_height: 1920,
};

pub fn fixture_path(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn read_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).unwrap()
}

pub fn home_dump() -> ViewHierarchyDump {
    ViewHierarchyDump::parse(DISPLAY, &read_fixture("dump_home.xml")).unwrap()
}

pub fn home_resolver() -> ObjectResolver<ViewHierarchyDump> {
    ObjectResolver::new(home_dump())
}

/// Wrap `<node>` elements in a hierarchy document.
pub fn hierarchy(nodes: &str) -> String {
    format!(
        "<?xml version='1.0' encoding='UTF-8' standalone='yes' ?>\n<hierarchy rotation=\"0\">\n{}</hierarchy>\n",
        nodes
    )
}

/// A non-clickable node with the identifying attributes given.
pub fn node(class: &str, bounds: &str, text: &str, desc: &str, resource_id: &str) -> String {
    format!(
        r#"  <node index="0" text="{}" resource-id="{}" class="{}" package="com.sec.android.app.launcher"
    content-desc="{}" checkable="false" checked="false" clickable="false"
    enabled="true" focusable="false" focused="false" scrollable="false"
    long-clickable="false" password="false" selected="false"
    bounds="{}" />
"#,
        text, resource_id, class, desc, bounds
    )
}

/// A node with only class and bounds set.
pub fn plain_node(class: &str, bounds: &str) -> String {
    node(class, bounds, "", "", "")
}

/// Unique temp file path for tests that write to disk.
pub fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("droid_locator_tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(format!("{}_{}", std::process::id(), name))
}
