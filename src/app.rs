//! Uploader: the startup sequence and the handlers input surfaces call.
//!
//! [`Uploader::start`] runs, in order:
//!
//! 1. **Options**: drop zone, picker and preview are required; the reset
//!    control is optional. Any missing one fails startup with
//!    [`InitError::MissingOptions`] naming all of them.
//! 2. **Capabilities**: resolved once by the caller (see
//!    [`Capabilities::detect`]). Each missing capability is reported, then a
//!    single "not supported", and startup fails with
//!    [`InitError::FeatureUnsupported`]. No uploader exists, so no handler can
//!    fire.
//! 3. **Store**: opened (or created/upgraded). A store that cannot be opened
//!    is reported as `StoreUnavailable` and the uploader still starts; later
//!    writes fail the same way and thumbnails are still presented.
//! 4. **Replay**: the cache loader presents everything already stored.

use crate::config::AppConfig;
use crate::diagnostics::{Diagnostics, PipelineEvent};
use crate::imaging::ImageBackend;
use crate::loader::LoadReport;
use crate::pipeline::{ErrorKind, IngestReport, Pipeline, PipelineError, failure_of};
use crate::presentation::{InputSurface, Presenter, ResetControl};
use crate::source::FileCandidate;
use crate::store::{OpenOutcome, ThumbnailStore};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("missing required options: {}", .0.join(", "))]
    MissingOptions(Vec<&'static str>),
    #[error("not supported: {}", .0.join(", "))]
    FeatureUnsupported(Vec<&'static str>),
}

/// The collaborators an uploader is wired to.
#[derive(Default, Clone)]
pub struct UploaderOptions {
    pub drop_zone: Option<Arc<dyn InputSurface>>,
    pub picker: Option<Arc<dyn InputSurface>>,
    pub preview: Option<Arc<dyn Presenter>>,
    pub reset: Option<Arc<dyn ResetControl>>,
}

impl UploaderOptions {
    fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.drop_zone.is_none() {
            missing.push("drop_zone");
        }
        if self.picker.is_none() {
            missing.push("picker");
        }
        if self.preview.is_none() {
            missing.push("preview");
        }
        missing
    }
}

/// Runtime features startup depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Files can be read asynchronously.
    pub file_reading: bool,
    /// A persistent local store can be created.
    pub persistent_store: bool,
}

impl Capabilities {
    pub fn all() -> Self {
        Self {
            file_reading: true,
            persistent_store: true,
        }
    }

    /// Probe the environment, masked by the `[capabilities]` switches.
    ///
    /// Async file reading needs a running tokio runtime; the store needs a
    /// directory it can create.
    pub fn detect(config: &AppConfig) -> Self {
        let file_reading = config.capabilities.file_reading
            && tokio::runtime::Handle::try_current().is_ok();
        let persistent_store = config.capabilities.persistent_store
            && std::fs::create_dir_all(config.store_dir()).is_ok();
        Self {
            file_reading,
            persistent_store,
        }
    }

    /// Names of the capabilities that are absent.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.file_reading {
            missing.push("file reading");
        }
        if !self.persistent_store {
            missing.push("persistent store");
        }
        missing
    }
}

pub struct Uploader<B: ImageBackend> {
    pipeline: Pipeline<B>,
    drop_zone: Arc<dyn InputSurface>,
    picker: Arc<dyn InputSurface>,
    preview: Arc<dyn Presenter>,
    reset: Option<Arc<dyn ResetControl>>,
    diagnostics: Diagnostics,
    opened: Option<OpenOutcome>,
    loaded: LoadReport,
}

impl<B: ImageBackend> Uploader<B> {
    pub async fn start(
        config: &AppConfig,
        capabilities: Capabilities,
        options: UploaderOptions,
        backend: B,
        diagnostics: Diagnostics,
    ) -> Result<Self, InitError> {
        diagnostics.set_enabled(config.diagnostics.enabled);

        let missing = options.missing();
        let UploaderOptions {
            drop_zone: Some(drop_zone),
            picker: Some(picker),
            preview: Some(preview),
            reset,
        } = options
        else {
            return Err(InitError::MissingOptions(missing));
        };

        let missing = capabilities.missing();
        if !missing.is_empty() {
            for capability in &missing {
                diagnostics.failure(
                    *capability,
                    ErrorKind::FeatureUnsupported,
                    format!("{capability} not supported"),
                );
            }
            diagnostics.failure("startup", ErrorKind::FeatureUnsupported, "not supported");
            return Err(InitError::FeatureUnsupported(missing));
        }

        let store = Arc::new(ThumbnailStore::new(
            &config.store_dir(),
            &config.store.name,
            config.store.version,
        ));
        let mut pipeline = Pipeline::new(Arc::new(backend), store, Arc::clone(&preview))
            .with_diagnostics(diagnostics.clone())
            .with_settings(config.thumbnail_settings())
            .with_key_prefix(&config.keys.prefix);
        if let Some(reset) = &reset {
            pipeline = pipeline.with_reset_control(Arc::clone(reset));
        }

        let mut uploader = Self {
            pipeline,
            drop_zone,
            picker,
            preview,
            reset,
            diagnostics,
            opened: None,
            loaded: LoadReport::default(),
        };

        match uploader.pipeline.store().open().await {
            Ok(outcome) => {
                uploader
                    .diagnostics
                    .report(PipelineEvent::StoreOpened(outcome));
                uploader.opened = Some(outcome);
                uploader.loaded = uploader.pipeline.cache_loader().load_all().await;
            }
            Err(e) => {
                let error = PipelineError::from(e);
                uploader
                    .diagnostics
                    .failure("store", error.kind(), error.to_string());
                uploader.loaded.failures.push(failure_of("store", &error));
            }
        }

        Ok(uploader)
    }

    /// Files dropped on the drop zone.
    pub async fn on_drop(&self, files: Vec<FileCandidate>) -> IngestReport {
        self.pipeline.ingest(files).await
    }

    /// Files chosen in the picker. The picker is acknowledged afterwards so
    /// the same selection can be made again.
    pub async fn on_pick(&self, files: Vec<FileCandidate>) -> IngestReport {
        let report = self.pipeline.ingest(files).await;
        self.picker.acknowledge();
        report
    }

    /// Discard every stored thumbnail and everything presented.
    ///
    /// The store is deleted and reopened empty. Presentation is cleared and
    /// the reset control hidden even when the store cannot be reopened.
    pub async fn reset(&self) -> Result<OpenOutcome, PipelineError> {
        let reopened = self.pipeline.store().reset().await;

        self.preview.clear();
        if let Some(reset) = &self.reset {
            reset.set_visible(false);
        }

        match reopened {
            Ok(outcome) => {
                self.diagnostics.report(PipelineEvent::StoreReset);
                Ok(outcome)
            }
            Err(e) => {
                let error = PipelineError::from(e);
                self.diagnostics
                    .failure("store", error.kind(), error.to_string());
                Err(error)
            }
        }
    }

    pub fn store(&self) -> &ThumbnailStore {
        self.pipeline.store()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn drop_zone(&self) -> &dyn InputSurface {
        self.drop_zone.as_ref()
    }

    /// How the store reached `Ready` at startup; `None` if it never did.
    pub fn opened(&self) -> Option<OpenOutcome> {
        self.opened
    }

    /// What the cache loader replayed at startup.
    pub fn loaded(&self) -> &LoadReport {
        &self.loaded
    }
}
