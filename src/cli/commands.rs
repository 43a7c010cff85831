use serde::Serialize;

use crate::cli::config::{PointArgs, Settings, SnapshotArgs};
use crate::device::live::LiveHierarchy;
use crate::device::rpc::HttpTransport;
use crate::error::LocatorResult;
use crate::hierarchy::criteria::Criteria;
use crate::hierarchy::dump::ViewHierarchyDump;
use crate::hierarchy::element_model::{DisplaySize, ElementInfo};
use crate::hierarchy::source::HierarchySource;
use crate::resolver::finder::ObjectResolver;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

type CmdResult<T> = Result<T, Box<dyn std::error::Error>>;

// ============================================================================
// Snapshot selection
// ============================================================================

/// Either backing store, chosen per invocation.
pub enum Snapshot {
    Frozen(ViewHierarchyDump),
    Live(LiveHierarchy<HttpTransport>),
}

impl Snapshot {
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            Snapshot::Frozen(dump) => Some(dump.fingerprint()),
            Snapshot::Live(_) => None,
        }
    }
}

impl HierarchySource for Snapshot {
    fn query(&self, criteria: &Criteria) -> LocatorResult<Vec<ElementInfo>> {
        match self {
            Snapshot::Frozen(dump) => dump.query(criteria),
            Snapshot::Live(live) => live.query(criteria),
        }
    }
}

fn connect(settings: &Settings) -> CmdResult<LiveHierarchy<HttpTransport>> {
    let transport = HttpTransport::new(&settings.endpoint, settings.timeout)?;
    tracing::debug!(url = transport.url(), "using live device");
    Ok(LiveHierarchy::new(transport))
}

/// Parse the dump file if one was given, otherwise talk to the device.
pub fn open_snapshot(args: &SnapshotArgs, settings: &Settings) -> CmdResult<Snapshot> {
    let Some(path) = &args.dump else {
        return Ok(Snapshot::Live(connect(settings)?));
    };

    let xml = std::fs::read_to_string(path)?;
    let display = match settings.display_for(args) {
        Some(display) => display,
        None => {
            tracing::debug!("no display size given; asking the device");
            connect(settings)?.display_size()?
        }
    };
    Ok(Snapshot::Frozen(load_dump(display, &xml)?))
}

pub fn load_dump(display: DisplaySize, xml: &str) -> LocatorResult<ViewHierarchyDump> {
    ViewHierarchyDump::parse(display, xml)
}

// ============================================================================
// resolve / inspect / query / dump subcommands
// ============================================================================

pub fn cmd_resolve(
    point: &PointArgs,
    snapshot_args: &SnapshotArgs,
    format: &str,
    settings: &Settings,
) -> CmdResult<String> {
    let criteria = Criteria::from_pairs(point.criteria.iter().map(String::as_str))?;
    let snapshot = open_snapshot(snapshot_args, settings)?;
    let tracer = open_tracer(settings);
    let coord = (point.x, point.y);

    let resolver = ObjectResolver::new(&snapshot);
    let outcome = resolver.resolve(coord, point.ignore_distant, &criteria);

    let mut event = TraceEvent::now(coord, point.ignore_distant, &criteria);
    if let Some(fp) = snapshot.fingerprint() {
        event = event.with_snapshot(fp);
    }
    event = match &outcome {
        Ok(resolution) => event.with_resolution(resolution),
        Err(e) => event.with_error(e),
    };
    tracer.log(&event);

    let resolution = outcome?;
    format_output(&resolution.locator, format)
}

/// Attributes of the element at a point, or `null` when nothing is there.
pub fn cmd_inspect(
    point: &PointArgs,
    snapshot_args: &SnapshotArgs,
    settings: &Settings,
) -> CmdResult<String> {
    let criteria = Criteria::from_pairs(point.criteria.iter().map(String::as_str))?;
    let snapshot = open_snapshot(snapshot_args, settings)?;
    let resolver = ObjectResolver::new(&snapshot);

    match resolver.find_object_contains((point.x, point.y), true, &criteria) {
        Ok(locator) => format_output(locator.meta(), "json"),
        Err(e) if e.is_not_found() => Ok("null".to_string()),
        Err(e) => Err(e.into()),
    }
}

pub fn cmd_query(
    criteria: &[String],
    snapshot_args: &SnapshotArgs,
    format: &str,
    settings: &Settings,
) -> CmdResult<String> {
    let criteria = Criteria::from_pairs(criteria.iter().map(String::as_str))?;
    let snapshot = open_snapshot(snapshot_args, settings)?;
    let elements = snapshot.query(&criteria)?;
    format_output(&elements, format)
}

pub fn cmd_dump(output: Option<&str>, settings: &Settings) -> CmdResult<Option<String>> {
    let xml = connect(settings)?.dump_xml()?;
    match output {
        Some(path) => {
            std::fs::write(path, &xml)?;
            Ok(None)
        }
        None => Ok(Some(xml)),
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn open_tracer(settings: &Settings) -> TraceLogger {
    match &settings.trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    }
}

/// Render a value as pretty JSON or YAML.
pub fn format_output<T: Serialize + ?Sized>(value: &T, format: &str) -> CmdResult<String> {
    match format {
        "yaml" => Ok(serde_yaml::to_string(value)?),
        "json" => Ok(serde_json::to_string_pretty(value)?),
        other => Err(format!("unknown output format '{}'", other).into()),
    }
}
