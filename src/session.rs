//! Per-session cache of the last analysis.
//!
//! The vision call is the expensive step; every UI action re-posts the form,
//! and the session decides whether the stored result still answers it.

use crate::analysis::{AnalysisRequestKey, AnalysisResult};
use crate::error::AnalyzerError;
use crate::vision::VisionService;

#[derive(Debug, Default)]
enum Entry {
    #[default]
    Empty,
    Cached {
        key: AnalysisRequestKey,
        result: AnalysisResult,
    },
}

#[derive(Debug, Default)]
pub struct SessionState {
    entry: Entry,
    celebration_pending: bool,
}

/// What one UI action resolved to.
#[derive(Debug)]
pub struct Resolution<'a> {
    pub result: &'a AnalysisResult,
    /// True when no vision call was made.
    pub cached: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a result is stored for exactly this key.
    pub fn should_reuse_cache(&self, key: &AnalysisRequestKey) -> bool {
        matches!(&self.entry, Entry::Cached { key: stored, .. } if stored == key)
    }

    /// Drop a stale entry before deciding on a remote call.
    ///
    /// Returns whether the vision service has to be asked.
    pub fn prepare(&mut self, key: &AnalysisRequestKey) -> bool {
        if self.should_reuse_cache(key) {
            return false;
        }
        if let Some(stale) = self.cached_key() {
            log::info!(
                "🗑️  Dropping cached {} result for {}",
                stale.analysis_type,
                stale.image.as_str()
            );
        }
        self.entry = Entry::Empty;
        self.celebration_pending = false;
        true
    }

    /// Store a fresh result, replacing whatever was there.
    pub fn record_result(&mut self, key: AnalysisRequestKey, result: AnalysisResult) {
        self.entry = Entry::Cached { key, result };
        self.celebration_pending = true;
    }

    /// One-shot: true on the first call after a new result, false afterwards.
    pub fn take_celebration(&mut self) -> bool {
        std::mem::take(&mut self.celebration_pending)
    }

    pub fn cached(&self) -> Option<&AnalysisResult> {
        match &self.entry {
            Entry::Cached { result, .. } => Some(result),
            Entry::Empty => None,
        }
    }

    fn cached_key(&self) -> Option<&AnalysisRequestKey> {
        match &self.entry {
            Entry::Cached { key, .. } => Some(key),
            Entry::Empty => None,
        }
    }

    /// Answer `key` from the cache or from one call to `service`.
    ///
    /// A failed call records nothing and is not retried. The celebration for
    /// a fresh result stays pending until the caller takes it, so a caller
    /// that fails later in the same action can leave it for the next one.
    pub async fn resolve<S: VisionService>(
        &mut self,
        service: &S,
        key: AnalysisRequestKey,
        image: &[u8],
    ) -> Result<Resolution<'_>, AnalyzerError> {
        let cached = !self.prepare(&key);
        if cached {
            log::info!("♻️  Reusing cached {} result", key.analysis_type);
        } else {
            log::info!(
                "🔍 New {} job for {}",
                key.analysis_type,
                key.image.as_str()
            );
            let result = service.analyze(image, key.analysis_type).await?;
            self.record_result(key, result);
        }

        let result = self.cached().ok_or_else(|| {
            AnalyzerError::MalformedResponse("session lost its result".to_string())
        })?;
        Ok(Resolution { result, cached })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisType, DetectedFace, ImageIdentity, Vertex};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeVision {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeVision {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl VisionService for FakeVision {
        fn analyze(
            &self,
            _image: &[u8],
            _analysis_type: AnalysisType,
        ) -> impl Future<Output = Result<AnalysisResult, AnalyzerError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail;
            async move {
                if fail {
                    Err(AnalyzerError::RemoteAnalysis("quota exceeded".to_string()))
                } else {
                    Ok(faces())
                }
            }
        }
    }

    fn faces() -> AnalysisResult {
        AnalysisResult::Faces(vec![DetectedFace {
            confidence: 0.9,
            polygon: vec![
                Vertex::new(0.1, 0.1),
                Vertex::new(0.2, 0.1),
                Vertex::new(0.2, 0.2),
            ],
        }])
    }

    fn key(name: &str, analysis_type: AnalysisType) -> AnalysisRequestKey {
        AnalysisRequestKey::new(ImageIdentity::from_upload(name, name.as_bytes()), analysis_type)
    }

    #[test]
    fn test_empty_session_never_reuses() {
        let session = SessionState::new();
        assert!(!session.should_reuse_cache(&key("a.png", AnalysisType::FaceDetection)));
    }

    #[test]
    fn test_reuse_only_for_equal_key() {
        let a = key("a.png", AnalysisType::FaceDetection);
        let mut session = SessionState::new();
        session.record_result(a.clone(), faces());
        assert!(session.should_reuse_cache(&a));
        assert!(!session.should_reuse_cache(&key("b.png", AnalysisType::FaceDetection)));
        assert!(!session.should_reuse_cache(&key("a.png", AnalysisType::ObjectDetection)));
    }

    #[test]
    fn test_key_change_resets_before_remote_call() {
        let a = key("a.png", AnalysisType::FaceDetection);
        let b = key("b.png", AnalysisType::FaceDetection);
        let mut session = SessionState::new();
        session.record_result(a.clone(), faces());

        assert!(session.prepare(&b));
        assert!(session.cached().is_none());
        assert!(!session.take_celebration());
        assert!(!session.should_reuse_cache(&a));
    }

    #[test]
    fn test_celebration_is_one_shot() {
        let mut session = SessionState::new();
        session.record_result(key("a.png", AnalysisType::FaceDetection), faces());
        assert!(session.take_celebration());
        assert!(!session.take_celebration());
    }

    #[tokio::test]
    async fn test_resolve_calls_service_once_per_key() {
        let service = FakeVision::new(false);
        let mut session = SessionState::new();
        let a = key("a.png", AnalysisType::FaceDetection);

        let first = session.resolve(&service, a.clone(), b"a").await.unwrap();
        assert!(!first.cached);
        assert_eq!(first.result.len(), 1);
        assert!(session.take_celebration());

        let second = session.resolve(&service, a.clone(), b"a").await.unwrap();
        assert!(second.cached);
        assert!(!session.take_celebration());
        assert_eq!(service.calls(), 1);

        let other = session
            .resolve(&service, key("a.png", AnalysisType::ObjectDetection), b"a")
            .await
            .unwrap();
        assert!(!other.cached);
        assert!(session.take_celebration());
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn test_untaken_celebration_survives_cache_hit() {
        let service = FakeVision::new(false);
        let mut session = SessionState::new();
        let a = key("a.png", AnalysisType::FaceDetection);

        // First action fetched but never took its celebration.
        session.resolve(&service, a.clone(), b"a").await.unwrap();

        let again = session.resolve(&service, a, b"a").await.unwrap();
        assert!(again.cached);
        assert!(session.take_celebration());
        assert!(!session.take_celebration());
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_records_nothing_and_is_not_retried() {
        let service = FakeVision::new(true);
        let mut session = SessionState::new();
        let a = key("a.png", AnalysisType::FaceDetection);

        let err = session.resolve(&service, a.clone(), b"a").await.unwrap_err();
        assert!(matches!(err, AnalyzerError::RemoteAnalysis(_)));
        assert_eq!(service.calls(), 1);
        assert!(session.cached().is_none());
        assert!(session.cached_key().is_none());
        assert!(!session.take_celebration());
    }

    #[tokio::test]
    async fn test_failure_keeps_previous_entry_for_same_key() {
        let mut session = SessionState::new();
        let a = key("a.png", AnalysisType::FaceDetection);
        session.record_result(a.clone(), faces());
        session.take_celebration();

        // Same key never reaches the failing service.
        let service = FakeVision::new(true);
        let again = session.resolve(&service, a, b"a").await.unwrap();
        assert!(again.cached);
        assert_eq!(service.calls(), 0);
    }
}
