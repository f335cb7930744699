//! Ingestion pipeline: validate → decode → key → render → persist + present.
//!
//! Each accepted file runs as its own task, so files finish in whatever order
//! their renders complete and one failure never touches the others. Within a
//! file the steps are sequential suspension points:
//!
//! ```text
//! FileCandidate ──whitelist──► decode (blocking pool)
//!                                  │
//!                          ThumbnailKey::generate
//!                                  │
//!                           render (blocking pool)
//!                                  │
//!                     ┌────────────┴────────────┐
//!              spawn store.put            presenter.present
//!              (own task)                 (does not wait)
//! ```
//!
//! Persistence is best-effort: a store failure is reported as
//! `StoreUnavailable` and the thumbnail is still presented. Errors are
//! reported to [`Diagnostics`] and collected into the returned
//! [`IngestReport`]; nothing is propagated back to the caller as `Err`.
//!
//! The reset control is shown once per batch, after every render has
//! finished, if at least one file passed the whitelist.

use crate::diagnostics::{Diagnostics, PipelineEvent};
use crate::imaging::{BackendError, ImageBackend, ThumbnailSettings, render_thumbnail};
use crate::key::ThumbnailKey;
use crate::loader::CacheLoader;
use crate::media::{MediaType, to_data_uri};
use crate::presentation::{PresentedThumbnail, Presenter, ResetControl};
use crate::source::FileCandidate;
use crate::store::{StoreError, ThumbnailStore};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::{JoinHandle, JoinSet};

/// Key prefix used when none is configured.
pub const DEFAULT_KEY_PREFIX: &str = "thumbdrop";

/// Category of a reported failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedFileType,
    FeatureUnsupported,
    RenderUnsupported,
    StoreUnavailable,
    DecodeFailed,
    TaskFailed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::UnsupportedFileType => "UnsupportedFileType",
            ErrorKind::FeatureUnsupported => "FeatureUnsupported",
            ErrorKind::RenderUnsupported => "RenderUnsupported",
            ErrorKind::StoreUnavailable => "StoreUnavailable",
            ErrorKind::DecodeFailed => "DecodeFailed",
            ErrorKind::TaskFailed => "TaskFailed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("not supported: {0}")]
    FeatureUnsupported(String),
    #[error("cannot render thumbnail: {0}")]
    RenderUnsupported(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error("decode failed: {0}")]
    DecodeFailed(String),
    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::UnsupportedFileType(_) => ErrorKind::UnsupportedFileType,
            PipelineError::FeatureUnsupported(_) => ErrorKind::FeatureUnsupported,
            PipelineError::RenderUnsupported(_) => ErrorKind::RenderUnsupported,
            PipelineError::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            PipelineError::DecodeFailed(_) => ErrorKind::DecodeFailed,
            PipelineError::TaskFailed(_) => ErrorKind::TaskFailed,
        }
    }
}

impl From<BackendError> for PipelineError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Decode(msg) => PipelineError::DecodeFailed(msg),
            BackendError::Unsupported(msg) | BackendError::Encode(msg) => {
                PipelineError::RenderUnsupported(msg)
            }
        }
    }
}

/// A rendered thumbnail and the key it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub key: ThumbnailKey,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    /// The stored form: `data:<mime>;base64,<bytes>`.
    pub fn data_uri(&self) -> String {
        to_data_uri(self.media_type.as_mime(), &self.bytes)
    }
}

/// A failure attributed to one file or one store record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub subject: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// What happened to one `ingest` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Files that passed the whitelist.
    pub accepted: usize,
    /// Names of files rejected by the whitelist.
    pub rejected: Vec<String>,
    /// Keys presented, in render-completion order.
    pub presented: Vec<ThumbnailKey>,
    /// Distinct keys whose store write succeeded. Two files that drew the
    /// same key overwrite one record and count once.
    pub persisted: Vec<ThumbnailKey>,
    pub failures: Vec<Failure>,
}

impl IngestReport {
    pub fn failures_of(&self, kind: ErrorKind) -> usize {
        self.failures.iter().filter(|f| f.kind == kind).count()
    }

    fn record_persisted(&mut self, key: ThumbnailKey) {
        if !self.persisted.contains(&key) {
            self.persisted.push(key);
        }
    }
}

/// Outcome of one file's render, before persistence settles.
struct Rendered {
    key: ThumbnailKey,
    persist: JoinHandle<Result<ThumbnailKey, PipelineError>>,
}

pub struct Pipeline<B: ImageBackend> {
    backend: Arc<B>,
    store: Arc<ThumbnailStore>,
    presenter: Arc<dyn Presenter>,
    reset: Option<Arc<dyn ResetControl>>,
    diagnostics: Diagnostics,
    settings: ThumbnailSettings,
    key_prefix: Arc<str>,
}

impl<B: ImageBackend> Clone for Pipeline<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            store: Arc::clone(&self.store),
            presenter: Arc::clone(&self.presenter),
            reset: self.reset.clone(),
            diagnostics: self.diagnostics.clone(),
            settings: self.settings,
            key_prefix: Arc::clone(&self.key_prefix),
        }
    }
}

impl<B: ImageBackend> Pipeline<B> {
    pub fn new(backend: Arc<B>, store: Arc<ThumbnailStore>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            backend,
            store,
            presenter,
            reset: None,
            diagnostics: Diagnostics::silent(),
            settings: ThumbnailSettings::default(),
            key_prefix: Arc::from(DEFAULT_KEY_PREFIX),
        }
    }

    pub fn with_reset_control(mut self, reset: Arc<dyn ResetControl>) -> Self {
        self.reset = Some(reset);
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn with_settings(mut self, settings: ThumbnailSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_key_prefix(mut self, prefix: &str) -> Self {
        self.key_prefix = Arc::from(prefix);
        self
    }

    pub fn store(&self) -> &Arc<ThumbnailStore> {
        &self.store
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// A loader that replays the store into this pipeline's presenter.
    pub fn cache_loader(&self) -> CacheLoader<B> {
        let loader = CacheLoader::new(
            Arc::clone(&self.backend),
            Arc::clone(&self.store),
            Arc::clone(&self.presenter),
        )
        .with_diagnostics(self.diagnostics.clone());
        match &self.reset {
            Some(reset) => loader.with_reset_control(Arc::clone(reset)),
            None => loader,
        }
    }

    /// Run a batch of files through the pipeline.
    ///
    /// Returns once every accepted file has been presented or has failed, and
    /// every store write has settled.
    pub async fn ingest(&self, candidates: Vec<FileCandidate>) -> IngestReport {
        let mut report = IngestReport::default();
        let mut renders = JoinSet::new();

        for candidate in candidates {
            let Some(media_type) = MediaType::from_mime(&candidate.media_type) else {
                let error = PipelineError::UnsupportedFileType(candidate.media_type.clone());
                self.record_failure(&mut report, &candidate.name, &error);
                report.rejected.push(candidate.name);
                continue;
            };

            report.accepted += 1;
            let pipeline = self.clone();
            renders.spawn(async move {
                let name = candidate.name.clone();
                let result = pipeline.process(candidate, media_type).await;
                (name, result)
            });
        }

        let mut pending = Vec::new();
        while let Some(joined) = renders.join_next().await {
            match joined {
                Ok((_, Ok(rendered))) => {
                    report.presented.push(rendered.key);
                    pending.push(rendered.persist);
                }
                Ok((name, Err(error))) => self.record_failure(&mut report, &name, &error),
                Err(join) => {
                    let error = PipelineError::TaskFailed(join.to_string());
                    self.record_failure(&mut report, "ingest", &error);
                }
            }
        }

        if report.accepted > 0 {
            if let Some(reset) = &self.reset {
                reset.set_visible(true);
            }
        }

        // Store outcomes are reported by the persist tasks themselves.
        for handle in pending {
            match handle.await {
                Ok(Ok(key)) => report.record_persisted(key),
                Ok(Err(error)) => report.failures.push(failure_of("store", &error)),
                Err(join) => {
                    let error = PipelineError::TaskFailed(join.to_string());
                    self.record_failure(&mut report, "store", &error);
                }
            }
        }

        report
    }

    async fn process(
        &self,
        candidate: FileCandidate,
        media_type: MediaType,
    ) -> Result<Rendered, PipelineError> {
        let FileCandidate { name, bytes, .. } = candidate;
        let link = to_data_uri(media_type.as_mime(), &bytes);

        let backend = Arc::clone(&self.backend);
        let image = run_blocking(move || backend.decode(&bytes, media_type)).await?;

        let key = ThumbnailKey::generate(&self.key_prefix, media_type.as_mime());

        let backend = Arc::clone(&self.backend);
        let settings = self.settings;
        let encoded =
            run_blocking(move || render_thumbnail(&*backend, &image, media_type, &settings))
                .await?;

        let thumbnail = Thumbnail {
            key: key.clone(),
            media_type,
            bytes: encoded,
            width: settings.width,
            height: settings.height,
        };
        let data_uri = thumbnail.data_uri();

        let persist = self.spawn_persist(key.clone(), data_uri.clone());

        self.presenter.present(PresentedThumbnail {
            key: key.clone(),
            media_type,
            thumbnail: data_uri,
            link,
            width: thumbnail.width,
            height: thumbnail.height,
        });
        self.diagnostics.report(PipelineEvent::Presented {
            key: key.clone(),
            name,
        });

        Ok(Rendered { key, persist })
    }

    /// Start the store write as an independent task.
    fn spawn_persist(
        &self,
        key: ThumbnailKey,
        value: String,
    ) -> JoinHandle<Result<ThumbnailKey, PipelineError>> {
        let store = Arc::clone(&self.store);
        let diagnostics = self.diagnostics.clone();
        tokio::spawn(async move {
            match store.put(&key, &value).await {
                Ok(()) => {
                    diagnostics.report(PipelineEvent::Persisted { key: key.clone() });
                    Ok(key)
                }
                Err(e) => {
                    let error = PipelineError::from(e);
                    diagnostics.failure(key.as_str(), error.kind(), error.to_string());
                    Err(error)
                }
            }
        })
    }

    fn record_failure(&self, report: &mut IngestReport, subject: &str, error: &PipelineError) {
        self.diagnostics
            .failure(subject, error.kind(), error.to_string());
        report.failures.push(failure_of(subject, error));
    }
}

pub(crate) fn failure_of(subject: &str, error: &PipelineError) -> Failure {
    Failure {
        subject: subject.to_string(),
        kind: error.kind(),
        message: error.to_string(),
    }
}

/// Run backend work on the blocking pool.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, PipelineError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, BackendError> + Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::TaskFailed(e.to_string()))?;
    Ok(result?)
}
