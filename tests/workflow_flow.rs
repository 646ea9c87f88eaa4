use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use cropdoc_lib::{
    catalog::{StaticCatalog, TreatmentCatalog},
    diagnosis::Diagnose,
    error::{DiagnoseError, WorkflowError},
    models::{Diagnosis, ImageHandle},
    settings::{ProcessingMode, Settings, SettingsStore},
    snapshot::SessionSnapshot,
    workflow::{FixedClock, Page, PageView, WorkflowController},
};
use tokio::sync::oneshot;

type Outcome = Result<Arc<Diagnosis>, DiagnoseError>;

/// Resolves each capture only when the test releases it, keyed by image
/// source.
#[derive(Default)]
struct GatedDiagnoser {
    pending: Mutex<HashMap<String, oneshot::Receiver<Outcome>>>,
    modes: Mutex<Vec<ProcessingMode>>,
}

impl GatedDiagnoser {
    fn gate(&self, source: &str) -> oneshot::Sender<Outcome> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(source.to_string(), rx);
        tx
    }
}

impl Diagnose for GatedDiagnoser {
    async fn diagnose(&self, image: ImageHandle, mode: ProcessingMode) -> Outcome {
        self.modes.lock().unwrap().push(mode);
        let gate = self.pending.lock().unwrap().remove(&image.source);
        match gate {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(DiagnoseError::Backend("gate dropped".into()))),
            None => Err(DiagnoseError::ImageUnreadable),
        }
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn setup() -> (
    Arc<GatedDiagnoser>,
    Arc<StaticCatalog>,
    WorkflowController<GatedDiagnoser, StaticCatalog>,
) {
    let diagnoser = Arc::new(GatedDiagnoser::default());
    let catalog = Arc::new(StaticCatalog::builtin().unwrap());
    let controller = WorkflowController::new(
        diagnoser.clone(),
        catalog.clone(),
        Arc::new(SettingsStore::in_memory(Settings::default())),
        Arc::new(FixedClock(date(2024, 3, 1))),
    );
    (diagnoser, catalog, controller)
}

#[tokio::test]
async fn capture_to_monitor_end_to_end() {
    let (diagnoser, catalog, controller) = setup();
    let armyworm = catalog.lookup("faw-001").unwrap();
    assert_eq!(armyworm.treatments.len(), 3);

    let release = diagnoser.gate("field.jpg");
    controller.capture(ImageHandle::new("field.jpg")).await.unwrap();
    assert_eq!(controller.snapshot().page, Page::Analyzing);

    release.send(Ok(armyworm.clone())).unwrap();
    let diagnosis = controller.wait_for_analysis().await.unwrap();
    assert_eq!(diagnosis.id, "faw-001");
    assert_eq!(controller.snapshot().page, Page::Results);

    controller.navigate(Page::Treatments).await.unwrap();
    let PageView::Treatments(view) = controller.current_view().await else {
        panic!("expected treatments view");
    };
    assert_eq!(view.options.len(), 3);
    let first = view.options[0].treatment.id.clone();
    assert_eq!(first, "treat-001");

    let entry = controller
        .schedule_treatment(&first, "2024-03-01")
        .await
        .unwrap();
    assert_eq!(entry.next_application_date, date(2024, 3, 8));

    controller.navigate(Page::Monitor).await.unwrap();
    let PageView::Monitor(monitor) = controller.current_view().await else {
        panic!("expected monitor view");
    };
    assert_eq!(monitor.scheduled, vec![entry]);
    assert!(monitor.timeline.iter().any(|e| e.date == date(2024, 3, 8)));
    assert!(monitor.to_string().contains("next 2024-03-08"));
}

#[tokio::test]
async fn only_latest_capture_is_observed() {
    let (diagnoser, catalog, controller) = setup();
    let release_a = diagnoser.gate("a.jpg");
    let release_b = diagnoser.gate("b.jpg");

    controller.capture(ImageHandle::new("a.jpg")).await.unwrap();
    let mut updates = controller.subscribe();
    let b = controller.capture(ImageHandle::new("b.jpg")).await.unwrap();

    // A was cancelled when B started; releasing it changes nothing
    let _ = release_a.send(Ok(catalog.lookup("mln-001").unwrap()));
    release_b.send(Ok(catalog.lookup("blight-001").unwrap())).unwrap();

    let diagnosis = controller.wait_for_analysis().await.unwrap();
    assert_eq!(diagnosis.id, "blight-001");

    let snapshot = updates.borrow_and_update().clone();
    assert_eq!(snapshot.generation, b);
    assert_eq!(snapshot.diagnosis_id.as_deref(), Some("blight-001"));
    assert_eq!(snapshot.page, Page::Results);
}

#[tokio::test]
async fn failed_analysis_returns_to_capture() {
    let (diagnoser, _, controller) = setup();
    let release = diagnoser.gate("blurry.jpg");

    controller.capture(ImageHandle::new("blurry.jpg")).await.unwrap();
    release
        .send(Err(DiagnoseError::Backend("model crashed".into())))
        .unwrap();

    let err = controller.wait_for_analysis().await.unwrap_err();
    assert!(matches!(err, WorkflowError::DiagnosisFailed(_)));
    assert!(err.is_retryable());

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.page, Page::Capture);
    assert!(!snapshot.analyzing);
    assert!(snapshot.last_error.is_some());

    // capture is accepted again straight away
    let release = diagnoser.gate("sharp.jpg");
    controller.capture(ImageHandle::new("sharp.jpg")).await.unwrap();
    release.send(Err(DiagnoseError::NoCandidates)).unwrap();
    assert_eq!(
        controller.wait_for_analysis().await,
        Err(WorkflowError::DiagnosisFailed(DiagnoseError::NoCandidates))
    );
}

#[tokio::test]
async fn pages_without_diagnosis_are_placeholders() {
    let (_, _, controller) = setup();

    controller.navigate(Page::Treatments).await.unwrap();
    assert_eq!(
        controller.current_view().await,
        PageView::NoActiveDiagnosis {
            page: Page::Treatments
        }
    );

    controller.navigate(Page::Monitor).await.unwrap();
    assert_eq!(
        controller.current_view().await,
        PageView::NoActiveDiagnosis {
            page: Page::Monitor
        }
    );

    let err = controller.navigate(Page::Analyzing).await.unwrap_err();
    assert!(matches!(err, WorkflowError::IllegalTransition { .. }));
}

#[tokio::test]
async fn analysis_keeps_mode_it_started_with() {
    let (diagnoser, catalog, controller) = setup();
    let release = diagnoser.gate("leaf.jpg");

    controller.capture(ImageHandle::new("leaf.jpg")).await.unwrap();
    tokio::task::yield_now().await;
    controller.toggle_mode().unwrap();
    release.send(Ok(catalog.lookup("faw-001").unwrap())).unwrap();
    controller.wait_for_analysis().await.unwrap();

    assert_eq!(*diagnoser.modes.lock().unwrap(), vec![ProcessingMode::Offline]);
    let PageView::Results(view) = controller.current_view().await else {
        panic!("expected results view");
    };
    assert!(view.external_search_available);
}

#[tokio::test]
async fn session_survives_save_and_restore() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let (diagnoser, catalog, controller) = setup();
    let release = diagnoser.gate("leaf.jpg");
    controller.capture(ImageHandle::new("leaf.jpg")).await.unwrap();
    release.send(Ok(catalog.lookup("faw-001").unwrap())).unwrap();
    controller.wait_for_analysis().await.unwrap();
    controller
        .schedule_treatment("treat-002", "2024-03-05")
        .await
        .unwrap();
    controller.export_snapshot().await.save(&path).unwrap();

    let (_, _, resumed) = setup();
    resumed
        .restore_snapshot(SessionSnapshot::load(&path).unwrap().unwrap())
        .await;

    let PageView::Monitor(view) = resumed.current_view().await else {
        panic!("expected monitor view");
    };
    assert_eq!(view.scheduled.len(), 1);
    assert_eq!(view.scheduled[0].next_application_date, date(2024, 3, 15));
}
