//! Scan command - one detect-and-fetch pass, printed and done.

use facilitymap::app::{scan, AppError};
use facilitymap::fetch::ReqwestTransport;
use facilitymap::geo::BoundingBox;
use facilitymap::sync::RenderEvent;

use super::common::{build_runtime, load_config_and_logging, SessionArgs};
use crate::error::CliError;
use crate::output::EventPrinter;

/// Arguments for the scan command.
pub struct ScanArgs {
    pub session: SessionArgs,
    pub bbox: Option<BoundingBox>,
    pub limit: usize,
}

/// Run the scan command.
pub fn run(args: ScanArgs) -> Result<(), CliError> {
    let (config, _logging) = load_config_and_logging(args.session.verbose)?;
    let app_config = args.session.app_config(&config)?;
    let location = args.session.location_source(&app_config)?;
    let transport =
        ReqwestTransport::new(&app_config.overpass_endpoint, app_config.overpass_timeout)
            .map_err(AppError::from)?;

    tracing::info!(
        location = %location.describe(),
        bbox = ?args.bbox,
        layers = ?app_config.sync.enabled_layers,
        "Running scan"
    );

    let runtime = build_runtime()?;
    let events = runtime.block_on(scan(&app_config, transport, location, args.bbox));

    let printer = EventPrinter::new(args.limit);
    for event in &events {
        printer.print(event);
    }

    first_failure(events)
}

/// The first failed layer, so scripts see a non-zero exit.
fn first_failure(events: Vec<RenderEvent>) -> Result<(), CliError> {
    match events.into_iter().find_map(|event| match event {
        RenderEvent::FetchFailed { layer, error } => Some(CliError::Fetch { layer, error }),
        _ => None,
    }) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
