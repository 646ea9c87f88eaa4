use std::sync::Arc;

use anyhow::Result;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use crate::{
    catalog::TreatmentCatalog,
    diagnosis::{Diagnose, Generation},
    error::{DiagnoseError, WorkflowError},
    models::{Diagnosis, ImageHandle, ScheduledTreatment},
    settings::{ProcessingMode, SettingsStore},
    snapshot::SessionSnapshot,
};

use super::{
    clock::Clock,
    state::{parse_start_date, Page, Transition, WorkflowSnapshot, WorkflowState},
    views::PageView,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

type AnalysisResult = Result<Arc<Diagnosis>, WorkflowError>;

struct AnalysisTask {
    generation: Generation,
    cancel: CancellationToken,
    /// Taken by whoever waits on the result.
    handle: Option<JoinHandle<AnalysisResult>>,
}

/// Async host around [`WorkflowState`]. Owns the single in-flight analysis
/// task and republishes a [`WorkflowSnapshot`] after every mutation.
///
/// Locks are always taken state first, then analysis.
pub struct WorkflowController<D, C> {
    state: Arc<Mutex<WorkflowState>>,
    diagnoser: Arc<D>,
    catalog: Arc<C>,
    settings: Arc<SettingsStore>,
    clock: Arc<dyn Clock>,
    analysis: Arc<Mutex<Option<AnalysisTask>>>,
    snapshots: Arc<watch::Sender<WorkflowSnapshot>>,
}

impl<D, C> Clone for WorkflowController<D, C> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            diagnoser: self.diagnoser.clone(),
            catalog: self.catalog.clone(),
            settings: self.settings.clone(),
            clock: self.clock.clone(),
            analysis: self.analysis.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<D, C> WorkflowController<D, C>
where
    D: Diagnose + 'static,
    C: TreatmentCatalog + 'static,
{
    pub fn new(
        diagnoser: Arc<D>,
        catalog: Arc<C>,
        settings: Arc<SettingsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let state = WorkflowState::new(settings.current().default_field_size);
        let (snapshots, _) = watch::channel(state.snapshot());

        Self {
            state: Arc::new(Mutex::new(state)),
            diagnoser,
            catalog,
            settings,
            clock,
            analysis: Arc::new(Mutex::new(None)),
            snapshots: Arc::new(snapshots),
        }
    }

    /// Start analysing `image`. Any analysis still running is cancelled and
    /// will resolve as [`WorkflowError::Superseded`].
    pub async fn capture(&self, image: ImageHandle) -> Result<Generation, WorkflowError> {
        let mode = self.settings.mode();
        let mut state = self.state.lock().await;
        let generation = state.capture(image.clone())?;
        log_info!("capture {:?} started for {} ({:?})", generation, image.source, mode);

        let mut analysis = self.analysis.lock().await;
        if let Some(previous) = analysis.take() {
            log_debug!("cancelling superseded analysis {:?}", previous.generation);
            previous.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = self.spawn_analysis(generation, image, mode, cancel.clone());
        *analysis = Some(AnalysisTask {
            generation,
            cancel,
            handle: Some(handle),
        });
        drop(analysis);

        self.publish(&state);
        Ok(generation)
    }

    fn spawn_analysis(
        &self,
        generation: Generation,
        image: ImageHandle,
        mode: ProcessingMode,
        cancel: CancellationToken,
    ) -> JoinHandle<AnalysisResult> {
        let state = self.state.clone();
        let diagnoser = self.diagnoser.clone();
        let snapshots = self.snapshots.clone();

        tokio::spawn(async move {
            // a panicking backend surfaces as a JoinError and fails the capture
            let mut work = tokio::spawn(async move { diagnoser.diagnose(image, mode).await });
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    work.abort();
                    None
                }
                joined = &mut work => Some(joined.unwrap_or_else(|err| {
                    Err(DiagnoseError::Backend(format!("analysis task failed: {err}")))
                })),
            };

            let Some(result) = outcome else {
                log_debug!("analysis {:?} cancelled", generation);
                return Err(WorkflowError::Superseded);
            };

            let mut guard = state.lock().await;
            let resolved = match result {
                Ok(diagnosis) => {
                    if guard.on_diagnosis_ready(generation, diagnosis.clone()) {
                        log_info!("analysis {:?} resolved to {}", generation, diagnosis.id);
                        Ok(diagnosis)
                    } else {
                        log_warn!("discarding stale diagnosis for {:?}", generation);
                        Err(WorkflowError::Superseded)
                    }
                }
                Err(err) => match guard.on_diagnosis_failed(generation, err) {
                    Some(err) => {
                        log_error!("analysis {:?} failed: {}", generation, err);
                        Err(err)
                    }
                    None => {
                        log_warn!("discarding stale failure for {:?}", generation);
                        Err(WorkflowError::Superseded)
                    }
                },
            };
            snapshots.send_replace(guard.snapshot());
            resolved
        })
    }

    /// Wait for the most recent capture to resolve.
    pub async fn wait_for_analysis(&self) -> Result<Arc<Diagnosis>, WorkflowError> {
        let taken = {
            let mut analysis = self.analysis.lock().await;
            analysis
                .as_mut()
                .and_then(|task| task.handle.take().map(|handle| (task.generation, handle)))
        };

        let Some((generation, handle)) = taken else {
            return self.await_settled().await;
        };

        match handle.await {
            Ok(resolved) => resolved,
            Err(err) => {
                let mut state = self.state.lock().await;
                let failure = state
                    .on_diagnosis_failed(generation, DiagnoseError::Backend(err.to_string()));
                log_error!("analysis {:?} task died: {}", generation, err);
                self.publish(&state);
                Err(failure.unwrap_or(WorkflowError::TaskFailed(err.to_string())))
            }
        }
    }

    /// Another caller holds the task handle: wait until nothing is analysing,
    /// then report what the state holds.
    async fn await_settled(&self) -> Result<Arc<Diagnosis>, WorkflowError> {
        let mut updates = self.snapshots.subscribe();
        let settled = updates
            .wait_for(|snapshot| !snapshot.analyzing)
            .await
            .map(|_| ());
        settled.map_err(|err| WorkflowError::TaskFailed(err.to_string()))?;

        let state = self.state.lock().await;
        match (state.session().diagnosis(), state.last_error()) {
            (_, Some(err)) => Err(err.clone()),
            (Some(diagnosis), None) => Ok(diagnosis.clone()),
            (None, None) => Err(WorkflowError::Superseded),
        }
    }

    pub async fn navigate(&self, page: Page) -> Result<Transition, WorkflowError> {
        let mut state = self.state.lock().await;
        let transition = state.navigate(page)?;

        if let Some(cancelled) = transition.cancelled {
            let analysis = self.analysis.lock().await;
            if let Some(task) = analysis.as_ref().filter(|t| t.generation == cancelled) {
                task.cancel.cancel();
            }
            log_info!("left analysis {:?} for {:?}", cancelled, page);
        }

        self.publish(&state);
        Ok(transition)
    }

    /// Schedule a treatment of the active diagnosis. `start_input` must be a
    /// `YYYY-MM-DD` date no earlier than today.
    pub async fn schedule_treatment(
        &self,
        treatment_id: &str,
        start_input: &str,
    ) -> Result<ScheduledTreatment, WorkflowError> {
        let start_date = parse_start_date(start_input)?;
        let today = self.clock.today();

        let mut state = self.state.lock().await;
        let entry = state.schedule_by_id(treatment_id, start_date, today)?;
        log_info!(
            "scheduled {} from {}, next application {}",
            entry.treatment_id,
            entry.start_date,
            entry.next_application_date
        );

        self.publish(&state);
        Ok(entry)
    }

    pub async fn set_field_size(&self, input: &str) {
        let mut state = self.state.lock().await;
        state.set_field_size(input);
        self.publish(&state);
    }

    pub async fn select_treatment(&self, treatment_id: &str) -> Result<(), WorkflowError> {
        let mut state = self.state.lock().await;
        state.select_treatment(treatment_id)?;
        self.publish(&state);
        Ok(())
    }

    pub async fn toggle_compare(&self, treatment_id: &str) -> Result<bool, WorkflowError> {
        let mut state = self.state.lock().await;
        let compared = state.toggle_compare(treatment_id)?;
        self.publish(&state);
        Ok(compared)
    }

    pub async fn record_progress_photo(&self, photo: ImageHandle) -> usize {
        let mut state = self.state.lock().await;
        if state.progress().is_empty() {
            log_info!("monitoring started with {}", photo.source);
        }
        let count = state.record_progress_photo(photo);
        self.publish(&state);
        count
    }

    /// Flip and persist the processing mode. Analyses already running keep
    /// the mode they started with.
    pub fn toggle_mode(&self) -> Result<ProcessingMode> {
        let mode = self.settings.mode().toggled();
        self.settings.set_mode(mode)?;
        log_info!("processing mode set to {:?}", mode);
        Ok(mode)
    }

    pub async fn current_view(&self) -> PageView {
        let today = self.clock.today();
        let settings = self.settings.current();
        self.state.lock().await.view(today, &settings)
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkflowSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn today(&self) -> chrono::NaiveDate {
        self.clock.today()
    }

    pub async fn export_snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock().await;
        SessionSnapshot {
            active_diagnosis_id: state.session().diagnosis().map(|d| d.id.clone()),
            scheduled: state.schedule().entries().to_vec(),
        }
    }

    /// Reinstate a saved session. An unknown diagnosis id is dropped; the
    /// schedule is kept as saved.
    pub async fn restore_snapshot(&self, snapshot: SessionSnapshot) {
        let diagnosis = snapshot.active_diagnosis_id.as_deref().and_then(|id| {
            let found = self.catalog.lookup(id);
            if found.is_none() {
                log_warn!("saved diagnosis '{}' is not in the catalog; dropping it", id);
            }
            found
        });

        let mut state = self.state.lock().await;
        state.restore(diagnosis, snapshot.scheduled);
        log_info!("restored session with {} scheduled treatment(s)", state.schedule().len());
        self.publish(&state);
    }

    fn publish(&self, state: &WorkflowState) {
        self.snapshots.send_replace(state.snapshot());
    }
}
