//! Watch command - a live session driven by lines on stdin.
//!
//! Each input line is one of:
//!
//! - `south,west,north,east` - the map now shows this area
//! - `locate` - re-run location detection
//! - `<layer> on` / `<layer> off` - toggle a layer (`water`, `toilets`)
//! - `quit` - end the session
//!
//! Events are printed as the session emits them. The session keeps running
//! after stdin closes until Ctrl+C.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;

use facilitymap::app::{AppConfig, FacilityMapApp};
use facilitymap::facility::Layer;
use facilitymap::geo::BoundingBox;
use facilitymap::location::LocationSource;

use super::common::{build_runtime, load_config_and_logging, SessionArgs};
use crate::error::CliError;
use crate::output::EventPrinter;

/// Arguments for the watch command.
pub struct WatchArgs {
    pub session: SessionArgs,
    pub limit: usize,
}

/// One parsed line of watch input.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchInput {
    Viewport(BoundingBox),
    Locate,
    Layer { layer: Layer, enabled: bool },
    Quit,
}

impl WatchInput {
    /// Parse a line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        match line.to_ascii_lowercase().as_str() {
            "locate" | "relocate" => return Ok(Some(WatchInput::Locate)),
            "quit" | "exit" => return Ok(Some(WatchInput::Quit)),
            _ => {}
        }

        if line.contains(',') {
            return line
                .parse::<BoundingBox>()
                .map(|bounds| Some(WatchInput::Viewport(bounds)))
                .map_err(|e| format!("invalid viewport '{}': {}", line, e));
        }

        let mut words = line.split_whitespace();
        let (Some(name), Some(state), None) = (words.next(), words.next(), words.next()) else {
            return Err(format!("unrecognized input '{}'", line));
        };
        let layer: Layer = name.parse().map_err(|e| format!("{}", e))?;
        let enabled = match state.to_ascii_lowercase().as_str() {
            "on" | "show" => true,
            "off" | "hide" => false,
            other => return Err(format!("expected 'on' or 'off', got '{}'", other)),
        };

        Ok(Some(WatchInput::Layer { layer, enabled }))
    }
}

/// Run the watch command.
pub fn run(args: WatchArgs) -> Result<(), CliError> {
    let (config, _logging) = load_config_and_logging(args.session.verbose)?;
    let app_config = args.session.app_config(&config)?;
    let location = args.session.location_source(&app_config)?;

    println!("FacilityMap v{}", facilitymap::VERSION);
    println!("====================");
    println!();
    println!("Location:  {}", location.describe());
    println!("Overpass:  {}", app_config.overpass_endpoint);
    println!();
    println!("Enter viewports as south,west,north,east; 'locate'; '<layer> on|off'.");
    println!("Press Ctrl+C to exit");
    println!();

    // Set up signal handler for graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();
    ctrlc::set_handler(move || {
        shutdown_clone.cancel();
    })
    .map_err(|e| CliError::Signal(e.to_string()))?;

    let runtime = build_runtime()?;
    let result = runtime.block_on(watch(
        app_config,
        location,
        shutdown,
        EventPrinter::new(args.limit),
    ));
    // A pending stdin read would otherwise block runtime drop.
    runtime.shutdown_background();
    result?;

    println!();
    println!("Session ended.");
    Ok(())
}

async fn watch(
    app_config: AppConfig,
    location: LocationSource,
    shutdown: CancellationToken,
    printer: EventPrinter,
) -> Result<(), CliError> {
    let mut app = FacilityMapApp::start(app_config, location)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let result = loop {
        tokio::select! {
            _ = shutdown.cancelled() => break Ok(()),

            event = app.next_event() => match event {
                Some(event) => printer.print(&event),
                None => break Ok(()),
            },

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match WatchInput::parse(&line) {
                    Ok(Some(WatchInput::Quit)) => break Ok(()),
                    Ok(Some(input)) => forward(&app, input),
                    Ok(None) => {}
                    Err(msg) => eprintln!("{}", msg),
                },
                Ok(None) => {
                    tracing::debug!("stdin closed, watching until interrupted");
                    stdin_open = false;
                }
                Err(e) => break Err(CliError::Stdin(e)),
            },
        }
    };

    app.shutdown().await;
    result
}

fn forward(app: &FacilityMapApp, input: WatchInput) {
    let handle = app.handle();
    let accepted = match input {
        WatchInput::Viewport(bounds) => handle.viewport_changed(bounds),
        WatchInput::Locate => handle.relocate(),
        WatchInput::Layer { layer, enabled } => handle.set_layer_enabled(layer, enabled),
        WatchInput::Quit => true,
    };

    if !accepted {
        tracing::warn!("Session is no longer accepting commands");
    }
}
