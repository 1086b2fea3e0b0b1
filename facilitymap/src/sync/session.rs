//! Session actor driving a [`SyncCoordinator`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::coordinator::{CycleTicket, SyncCoordinator};
use super::events::RenderSink;
use crate::facility::Layer;
use crate::fetch::{FacilityFetcher, FetchOutcome, OverpassTransport};
use crate::geo::BoundingBox;
use crate::location::{GeolocationPlatform, LocationDetector, LocationOutcome};
use crate::movement::Debouncer;

/// Input accepted by a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// The visible map area changed.
    ViewportChanged(BoundingBox),
    /// Toggle a facility layer.
    SetLayer { layer: Layer, enabled: bool },
    /// Re-detect the user's location ("locate me").
    Relocate,
}

/// Handle to a spawned [`MapSession`].
///
/// Sending returns `false` once the session has stopped.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn viewport_changed(&self, bounds: BoundingBox) -> bool {
        self.send(SessionCommand::ViewportChanged(bounds))
    }

    pub fn set_layer_enabled(&self, layer: Layer, enabled: bool) -> bool {
        self.send(SessionCommand::SetLayer { layer, enabled })
    }

    pub fn relocate(&self) -> bool {
        self.send(SessionCommand::Relocate)
    }

    /// Token that stops the session when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the session and wait for it to stop.
    ///
    /// Pending debounced viewports are dropped and in-flight fetches aborted.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Session task ended abnormally");
        }
    }

    fn send(&self, command: SessionCommand) -> bool {
        self.commands.send(command).is_ok()
    }
}

type InFlight = JoinSet<(CycleTicket, FetchOutcome)>;

/// A running relocate. Owns the detector until detection finishes.
type Relocation<P> = Pin<Box<dyn Future<Output = (LocationDetector<P>, LocationOutcome)> + Send>>;

/// One map session: a coordinator, its location detector, and a viewport debouncer.
///
/// All state is owned by the task running [`run`](Self::run). Fetches run in
/// background tasks so the session keeps accepting viewport changes while
/// they are in flight; their results are applied in completion order and
/// stale ones are discarded by the coordinator.
pub struct MapSession<T, P, S>
where
    T: OverpassTransport,
    P: GeolocationPlatform,
    S: RenderSink,
{
    coordinator: SyncCoordinator<T, S>,
    detector: LocationDetector<P>,
    debouncer: Debouncer<BoundingBox>,
}

impl<T, P, S> MapSession<T, P, S>
where
    T: OverpassTransport + 'static,
    P: GeolocationPlatform + 'static,
    S: RenderSink + 'static,
{
    pub fn new(
        coordinator: SyncCoordinator<T, S>,
        detector: LocationDetector<P>,
        debounce_delay: Duration,
    ) -> Self {
        Self {
            coordinator,
            detector,
            debouncer: Debouncer::new(debounce_delay),
        }
    }

    pub fn coordinator(&self) -> &SyncCoordinator<T, S> {
        &self.coordinator
    }

    /// Run the session on the tokio runtime.
    pub fn spawn(self) -> SessionHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(rx, cancel.clone()));

        SessionHandle {
            commands: tx,
            cancel,
            task,
        }
    }

    /// Initialize, then process commands until cancelled or every sender is dropped.
    pub async fn run(
        self,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
        cancel: CancellationToken,
    ) {
        let MapSession {
            mut coordinator,
            mut detector,
            mut debouncer,
        } = self;

        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Session cancelled during initialization");
                return;
            }
            origin = coordinator.initialize(&mut detector) => {
                info!(origin = %origin, "Session initialized");
            }
        }

        let mut in_flight = InFlight::new();
        let mut detector = Some(detector);
        let mut relocation: Option<Relocation<P>> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Session cancelled");
                    break;
                }
                command = commands.recv() => match command {
                    Some(SessionCommand::ViewportChanged(bounds)) => debouncer.push(bounds),
                    Some(SessionCommand::SetLayer { layer, enabled }) => {
                        if let Some(ticket) = coordinator.set_layer_enabled(layer, enabled) {
                            spawn_fetch(&mut in_flight, coordinator.fetcher(), ticket);
                        }
                    }
                    Some(SessionCommand::Relocate) => match detector.take() {
                        Some(mut idle) => {
                            debug!("Relocating");
                            relocation = Some(Box::pin(async move {
                                let outcome = idle.detect_location().await;
                                (idle, outcome)
                            }));
                        }
                        None => debug!("Relocate already in progress"),
                    },
                    None => {
                        debug!("All session handles dropped");
                        break;
                    }
                },
                (idle, outcome) = located(&mut relocation) => {
                    relocation = None;
                    detector = Some(idle);
                    for ticket in coordinator.apply_relocation(outcome) {
                        spawn_fetch(&mut in_flight, coordinator.fetcher(), ticket);
                    }
                }
                bounds = debouncer.fired() => {
                    for ticket in coordinator.viewport_settled(bounds) {
                        spawn_fetch(&mut in_flight, coordinator.fetcher(), ticket);
                    }
                }
                Some(joined) = in_flight.join_next() => match joined {
                    Ok((ticket, outcome)) => {
                        coordinator.complete_cycle(ticket, outcome);
                    }
                    Err(e) => warn!(error = %e, "Fetch task failed"),
                },
            }
        }

        debouncer.cancel();
        in_flight.abort_all();
        info!(pending_fetches = in_flight.len(), "Session stopped");
    }
}

/// Resolves once the running relocate finishes; never while none is running.
async fn located<P: GeolocationPlatform + 'static>(
    relocation: &mut Option<Relocation<P>>,
) -> (LocationDetector<P>, LocationOutcome) {
    match relocation {
        Some(running) => running.await,
        None => std::future::pending().await,
    }
}

fn spawn_fetch<T: OverpassTransport + 'static>(
    in_flight: &mut InFlight,
    fetcher: &Arc<FacilityFetcher<T>>,
    ticket: CycleTicket,
) {
    let fetcher = Arc::clone(fetcher);
    in_flight.spawn(async move {
        let outcome = ticket.execute(&fetcher).await;
        (ticket, outcome)
    });
}
