//! Booking session state machine.
//!
//! One [`BookingWorkflow`] owns the draft, the workflow state and the catalog
//! for a single session. Views subscribe to [`WorkflowEvent`]s and read
//! [`WorkflowSnapshot`]s; they never mutate state directly.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::{BookingDraft, Catalog, FieldUpdate, VehicleId},
    protocol::ReservationRequest,
};
use tokio::{
    sync::{broadcast, Mutex},
    task::{AbortHandle, JoinHandle},
};
use tracing::{debug, info, warn};

use crate::{
    api::{CatalogSource, HttpBookingApi, ReservationSink},
    error::{SessionError, WorkflowError},
    validation::{validated_request, ValidationError},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Editing {
        draft: BookingDraft,
        error: Option<WorkflowError>,
    },
    /// Terminal for the session.
    Confirmed { reservation: ReservationRequest },
}

impl WorkflowState {
    pub fn draft(&self) -> Option<&BookingDraft> {
        match self {
            Self::Editing { draft, .. } => Some(draft),
            Self::Confirmed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        match self {
            Self::Editing { error, .. } => error.as_ref(),
            Self::Confirmed { .. } => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSnapshot {
    pub state: WorkflowState,
    pub catalog: Catalog,
    pub catalog_notice: Option<WorkflowError>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    CatalogLoaded { vehicles: usize },
    CatalogFailed(WorkflowError),
    CatalogNoticeDismissed,
    DraftChanged(BookingDraft),
    SubmissionRejected(ValidationError),
    SubmissionStarted,
    SubmissionFailed(WorkflowError),
    Confirmed(ReservationRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOutcome {
    Loaded(usize),
    Failed,
    /// A newer fetch was started while this one was pending; its result was
    /// dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Draft failed validation; nothing was sent.
    Rejected(ValidationError),
    /// The service did not acknowledge the reservation; the draft is kept.
    Failed,
    Confirmed,
}

struct WorkflowInner {
    state: WorkflowState,
    catalog: Catalog,
    catalog_notice: Option<WorkflowError>,
    catalog_task: Option<AbortHandle>,
    catalog_generation: u64,
    started: bool,
    torn_down: bool,
}

impl WorkflowInner {
    fn editing_mut(
        &mut self,
    ) -> Result<(&mut BookingDraft, &mut Option<WorkflowError>), SessionError> {
        if self.torn_down {
            return Err(SessionError::TornDown);
        }
        match &mut self.state {
            WorkflowState::Editing { draft, error } => Ok((draft, error)),
            WorkflowState::Confirmed { .. } => Err(SessionError::Confirmed),
        }
    }
}

/// Clears the in-flight flag when dropped, whether the submission completed,
/// failed, or its future was dropped mid-request.
struct SubmissionGuard<'a>(&'a AtomicBool);

impl<'a> SubmissionGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BookingWorkflow {
    catalog_source: Arc<dyn CatalogSource>,
    reservation_sink: Arc<dyn ReservationSink>,
    inner: Mutex<WorkflowInner>,
    submitting: AtomicBool,
    events: broadcast::Sender<WorkflowEvent>,
}

impl BookingWorkflow {
    /// Builds a session whose draft starts with `seed` as the selected
    /// vehicle, e.g. when arriving from a vehicle detail page.
    pub fn new(api: Arc<HttpBookingApi>, seed: Option<VehicleId>) -> Arc<Self> {
        Self::new_with_dependencies(api.clone(), api, seed)
    }

    pub fn new_with_dependencies(
        catalog_source: Arc<dyn CatalogSource>,
        reservation_sink: Arc<dyn ReservationSink>,
        seed: Option<VehicleId>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            catalog_source,
            reservation_sink,
            inner: Mutex::new(WorkflowInner {
                state: WorkflowState::Editing {
                    draft: BookingDraft::seeded(seed),
                    error: None,
                },
                catalog: Catalog::default(),
                catalog_notice: None,
                catalog_task: None,
                catalog_generation: 0,
                started: false,
                torn_down: false,
            }),
            submitting: AtomicBool::new(false),
            events,
        })
    }

    /// Kicks off the session's catalog fetch in the background.
    ///
    /// Returns `None` if the session was already started or torn down.
    pub async fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let mut inner = self.inner.lock().await;
        if inner.started || inner.torn_down {
            warn!("booking workflow start ignored; session already started or torn down");
            return None;
        }
        inner.started = true;

        let workflow = Arc::clone(self);
        let handle = tokio::spawn(async move {
            // Failures are already projected into the catalog notice.
            let _ = workflow.refresh_catalog().await;
        });
        inner.catalog_task = Some(handle.abort_handle());
        Some(handle)
    }

    /// Fetches the catalog once. Callers re-invoke this to retry; there is no
    /// built-in retry policy.
    ///
    /// Only the most recently started fetch may update the catalog.
    pub async fn refresh_catalog(&self) -> Result<CatalogOutcome, SessionError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.torn_down {
                return Err(SessionError::TornDown);
            }
            inner.catalog_generation += 1;
            inner.catalog_generation
        };

        let result = self.catalog_source.fetch_catalog().await;

        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            debug!("discarding catalog result for torn down workflow");
            return Err(SessionError::TornDown);
        }
        if inner.catalog_generation != generation {
            debug!(
                generation,
                latest = inner.catalog_generation,
                "discarding superseded catalog result"
            );
            return Ok(CatalogOutcome::Superseded);
        }

        match result {
            Ok(vehicles) => {
                let count = vehicles.len();
                inner.catalog = Catalog::new(vehicles);
                inner.catalog_notice = None;
                info!(vehicles = count, "vehicle catalog loaded");
                self.emit(WorkflowEvent::CatalogLoaded { vehicles: count });
                Ok(CatalogOutcome::Loaded(count))
            }
            Err(err) => {
                warn!(error = %err, "vehicle catalog fetch failed");
                let notice = WorkflowError::catalog();
                inner.catalog_notice = Some(notice.clone());
                self.emit(WorkflowEvent::CatalogFailed(notice));
                Ok(CatalogOutcome::Failed)
            }
        }
    }

    pub async fn dismiss_catalog_notice(&self) {
        let mut inner = self.inner.lock().await;
        if inner.catalog_notice.take().is_some() {
            self.emit(WorkflowEvent::CatalogNoticeDismissed);
        }
    }

    /// Replaces one draft field and clears any error from a previous attempt.
    ///
    /// Allowed while a submission is in flight.
    pub async fn update_field(&self, update: FieldUpdate) -> Result<(), SessionError> {
        let field = update.field_name();
        let mut inner = self.inner.lock().await;
        let (draft, error) = inner.editing_mut()?;
        draft.apply(update);
        *error = None;
        let draft = draft.clone();
        debug!(field, "booking draft field updated");
        self.emit(WorkflowEvent::DraftChanged(draft));
        Ok(())
    }

    /// Validates the current draft and, if it passes, sends exactly one
    /// reservation request.
    ///
    /// Session state is checked before the in-flight guard, so a torn down or
    /// confirmed session reports that even while a request is pending.
    pub async fn submit(&self) -> Result<SubmitOutcome, SessionError> {
        let (_in_flight, request) = {
            let mut inner = self.inner.lock().await;
            let (draft, error) = inner.editing_mut()?;
            let Some(in_flight) = SubmissionGuard::acquire(&self.submitting) else {
                debug!("submit ignored; reservation already in flight");
                return Err(SessionError::SubmissionInFlight);
            };
            match validated_request(draft) {
                Ok(request) => {
                    *error = None;
                    (in_flight, request)
                }
                Err(cause) => {
                    *error = Some(WorkflowError::validation(cause));
                    info!(cause = ?cause, "booking draft rejected by validation");
                    self.emit(WorkflowEvent::SubmissionRejected(cause));
                    return Ok(SubmitOutcome::Rejected(cause));
                }
            }
        };

        info!(
            vehicle_id = %request.vehicle_id,
            pickup_date = %request.pickup_date,
            return_date = %request.return_date,
            "submitting reservation"
        );
        self.emit(WorkflowEvent::SubmissionStarted);

        let result = self.reservation_sink.submit_reservation(&request).await;

        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            debug!("discarding reservation result for torn down workflow");
            return Err(SessionError::TornDown);
        }

        match result {
            Ok(()) => {
                info!(vehicle_id = %request.vehicle_id, "reservation confirmed");
                inner.state = WorkflowState::Confirmed {
                    reservation: request.clone(),
                };
                self.emit(WorkflowEvent::Confirmed(request));
                Ok(SubmitOutcome::Confirmed)
            }
            Err(err) => {
                warn!(error = %err, "reservation submission failed");
                let notice = WorkflowError::submission();
                if let WorkflowState::Editing { error, .. } = &mut inner.state {
                    *error = Some(notice.clone());
                }
                self.emit(WorkflowEvent::SubmissionFailed(notice));
                Ok(SubmitOutcome::Failed)
            }
        }
    }

    /// Ends the session. Pending fetch or submission results are discarded
    /// once they arrive.
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        if inner.torn_down {
            return;
        }
        inner.torn_down = true;
        if let Some(task) = inner.catalog_task.take() {
            task.abort();
        }
        info!("booking workflow torn down");
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.lock().await;
        WorkflowSnapshot {
            state: inner.state.clone(),
            catalog: inner.catalog.clone(),
            catalog_notice: inner.catalog_notice.clone(),
            submitting: self.is_submitting(),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: WorkflowEvent) {
        // No subscribers is fine; views may attach late or not at all.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/workflow_tests.rs"]
mod tests;
