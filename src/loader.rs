//! Cache loader: replays persisted thumbnails into presentation at startup.
//!
//! Every record is decoded and presented by its own task, so replay order is
//! whatever order decodes finish in. The media type comes from the key's
//! suffix; keys without one fall back to the type in the stored data URI.
//!
//! The reset control is shown exactly once, after the last record has been
//! handled, and only when the store held at least one record.

use crate::diagnostics::{Diagnostics, PipelineEvent};
use crate::imaging::ImageBackend;
use crate::key::ThumbnailKey;
use crate::media::{MediaType, parse_data_uri};
use crate::pipeline::{Failure, PipelineError, failure_of, run_blocking};
use crate::presentation::{PresentedThumbnail, Presenter, ResetControl};
use crate::store::{StoreRecord, ThumbnailStore};
use std::sync::Arc;
use tokio::task::JoinSet;

/// What one `load_all` replayed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Records found in the store.
    pub records: usize,
    /// Keys presented, in decode-completion order.
    pub replayed: Vec<ThumbnailKey>,
    pub failures: Vec<Failure>,
}

pub struct CacheLoader<B: ImageBackend> {
    backend: Arc<B>,
    store: Arc<ThumbnailStore>,
    presenter: Arc<dyn Presenter>,
    reset: Option<Arc<dyn ResetControl>>,
    diagnostics: Diagnostics,
}

impl<B: ImageBackend> CacheLoader<B> {
    pub fn new(backend: Arc<B>, store: Arc<ThumbnailStore>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            backend,
            store,
            presenter,
            reset: None,
            diagnostics: Diagnostics::silent(),
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

    /// Present every stored thumbnail.
    pub async fn load_all(&self) -> LoadReport {
        let mut report = LoadReport::default();

        let records = match self.store.enumerate_all().await {
            Ok(records) => records,
            Err(e) => {
                let error = PipelineError::from(e);
                self.record_failure(&mut report, "store", &error);
                return report;
            }
        };
        report.records = records.len();

        let mut replays = JoinSet::new();
        for record in records {
            let backend = Arc::clone(&self.backend);
            let presenter = Arc::clone(&self.presenter);
            replays.spawn(async move {
                let key = record.key.clone();
                (key, replay(backend, presenter, record).await)
            });
        }

        while let Some(joined) = replays.join_next().await {
            match joined {
                Ok((key, Ok(()))) => {
                    self.diagnostics
                        .report(PipelineEvent::Replayed { key: key.clone() });
                    report.replayed.push(key);
                }
                Ok((key, Err(error))) => self.record_failure(&mut report, key.as_str(), &error),
                Err(join) => {
                    let error = PipelineError::TaskFailed(join.to_string());
                    self.record_failure(&mut report, "load", &error);
                }
            }
        }

        if report.records > 0 {
            if let Some(reset) = &self.reset {
                reset.set_visible(true);
            }
        }

        report
    }

    fn record_failure(&self, report: &mut LoadReport, subject: &str, error: &PipelineError) {
        self.diagnostics
            .failure(subject, error.kind(), error.to_string());
        report.failures.push(failure_of(subject, error));
    }
}

async fn replay<B: ImageBackend>(
    backend: Arc<B>,
    presenter: Arc<dyn Presenter>,
    record: StoreRecord,
) -> Result<(), PipelineError> {
    let (uri_mime, bytes) =
        parse_data_uri(&record.value).map_err(|e| PipelineError::DecodeFailed(e.to_string()))?;

    let declared = record.key.media_type().unwrap_or(&uri_mime);
    let media_type = MediaType::from_mime(declared)
        .ok_or_else(|| PipelineError::UnsupportedFileType(declared.to_string()))?;

    let image = run_blocking(move || backend.decode(&bytes, media_type)).await?;
    let dims = image.dimensions();

    presenter.present(PresentedThumbnail {
        key: record.key,
        media_type,
        thumbnail: record.value.clone(),
        link: record.value,
        width: dims.width,
        height: dims.height,
    });
    Ok(())
}
