use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{Diagnosis, ImageHandle};

/// Monotonic tag identifying one capture attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(pub u64);

impl Generation {
    fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

/// The active diagnosis, the image it came from and the in-flight analysis
/// marker. At most one diagnosis is active; each completion replaces it.
#[derive(Debug, Clone, Default)]
pub struct DiagnosisSession {
    diagnosis: Option<Arc<Diagnosis>>,
    image: Option<ImageHandle>,
    analyzing: bool,
    generation: Generation,
}

impl DiagnosisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start analysing `image`. The previous diagnosis stays visible until
    /// the new one resolves.
    pub fn begin_capture(&mut self, image: ImageHandle) -> Generation {
        self.generation = self.generation.next();
        self.image = Some(image);
        self.analyzing = true;
        self.generation
    }

    /// Attach the result for `generation`. Returns `false`, leaving the
    /// session untouched, when the completion is stale or duplicated.
    pub fn complete_analysis(&mut self, generation: Generation, diagnosis: Arc<Diagnosis>) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.diagnosis = Some(diagnosis);
        self.analyzing = false;
        true
    }

    pub fn fail_analysis(&mut self, generation: Generation) -> bool {
        if !self.accepts(generation) {
            return false;
        }
        self.analyzing = false;
        true
    }

    /// Abandon the in-flight analysis, if any. Its completion will be ignored.
    pub fn cancel_analysis(&mut self) -> Option<Generation> {
        if !self.analyzing {
            return None;
        }
        let cancelled = self.generation;
        self.generation = self.generation.next();
        self.analyzing = false;
        Some(cancelled)
    }

    /// Drop the captured image ahead of a new capture. The diagnosis stays so
    /// treatment and monitor pages remain reachable.
    pub fn reset(&mut self) {
        self.image = None;
    }

    /// Replace the active diagnosis outside of a capture, e.g. when resuming
    /// a saved session.
    pub(crate) fn restore(&mut self, diagnosis: Option<Arc<Diagnosis>>) {
        self.diagnosis = diagnosis;
        self.analyzing = false;
    }

    pub fn diagnosis(&self) -> Option<&Arc<Diagnosis>> {
        self.diagnosis.as_ref()
    }

    pub fn image(&self) -> Option<&ImageHandle> {
        self.image.as_ref()
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    fn accepts(&self, generation: Generation) -> bool {
        self.analyzing && generation == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::diagnosis::fixtures::diagnosis;

    #[test]
    fn capture_then_complete() {
        let mut session = DiagnosisSession::new();
        let image = ImageHandle::new("leaf.jpg");

        let generation = session.begin_capture(image.clone());
        assert!(session.is_analyzing());
        assert_eq!(session.image(), Some(&image));

        assert!(session.complete_analysis(generation, Arc::new(diagnosis("faw-001", vec![]))));
        assert!(!session.is_analyzing());
        assert_eq!(session.diagnosis().unwrap().id, "faw-001");
    }

    #[test]
    fn previous_diagnosis_visible_during_retake() {
        let mut session = DiagnosisSession::new();
        let first = session.begin_capture(ImageHandle::new("a.jpg"));
        session.complete_analysis(first, Arc::new(diagnosis("faw-001", vec![])));

        session.begin_capture(ImageHandle::new("b.jpg"));

        assert!(session.is_analyzing());
        assert_eq!(session.diagnosis().unwrap().id, "faw-001");
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut session = DiagnosisSession::new();
        let a = session.begin_capture(ImageHandle::new("a.jpg"));
        let b = session.begin_capture(ImageHandle::new("b.jpg"));
        assert!(b > a);

        assert!(!session.complete_analysis(a, Arc::new(diagnosis("stale", vec![]))));
        assert!(session.is_analyzing());
        assert!(session.diagnosis().is_none());

        assert!(session.complete_analysis(b, Arc::new(diagnosis("fresh", vec![]))));
        assert!(!session.complete_analysis(a, Arc::new(diagnosis("stale", vec![]))));
        assert_eq!(session.diagnosis().unwrap().id, "fresh");
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut session = DiagnosisSession::new();
        let generation = session.begin_capture(ImageHandle::new("a.jpg"));

        assert!(session.complete_analysis(generation, Arc::new(diagnosis("first", vec![]))));
        assert!(!session.complete_analysis(generation, Arc::new(diagnosis("second", vec![]))));
        assert_eq!(session.diagnosis().unwrap().id, "first");
    }

    #[test]
    fn cancel_discards_in_flight_generation() {
        let mut session = DiagnosisSession::new();
        let generation = session.begin_capture(ImageHandle::new("a.jpg"));

        assert_eq!(session.cancel_analysis(), Some(generation));
        assert!(!session.is_analyzing());
        assert!(!session.complete_analysis(generation, Arc::new(diagnosis("late", vec![]))));
        assert!(session.diagnosis().is_none());

        assert_eq!(session.cancel_analysis(), None);
    }

    #[test]
    fn failure_clears_flag_once() {
        let mut session = DiagnosisSession::new();
        let generation = session.begin_capture(ImageHandle::new("a.jpg"));

        assert!(session.fail_analysis(generation));
        assert!(!session.is_analyzing());
        assert!(!session.fail_analysis(generation));
    }

    #[test]
    fn reset_keeps_diagnosis() {
        let mut session = DiagnosisSession::new();
        let generation = session.begin_capture(ImageHandle::new("a.jpg"));
        session.complete_analysis(generation, Arc::new(diagnosis("faw-001", vec![])));

        session.reset();

        assert!(session.image().is_none());
        assert!(session.diagnosis().is_some());
    }
}
