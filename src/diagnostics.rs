//! Diagnostic sink for pipeline, loader and store events.
//!
//! Failures never cross the async boundary back to whoever handed files in;
//! they are reported here instead. The sink is a cloneable handle over an
//! unbounded channel. The CLI drains the receiving end and prints each event
//! through [`output::format_event`](crate::output::format_event); tests drain
//! it and count.
//!
//! Reporting can be switched off at runtime with [`Diagnostics::set_enabled`].
//! The switch is shared by every clone of the handle.

use crate::key::ThumbnailKey;
use crate::pipeline::ErrorKind;
use crate::store::OpenOutcome;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StoreOpened(OpenOutcome),
    StoreReset,
    /// A freshly rendered thumbnail reached presentation.
    Presented { key: ThumbnailKey, name: String },
    Persisted { key: ThumbnailKey },
    /// A stored thumbnail was replayed into presentation at startup.
    Replayed { key: ThumbnailKey },
    Failed {
        subject: String,
        kind: ErrorKind,
        message: String,
    },
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    sender: Option<UnboundedSender<PipelineEvent>>,
    enabled: Arc<AtomicBool>,
}

impl Diagnostics {
    /// A sink plus the receiver its events arrive on.
    pub fn channel() -> (Self, UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = unbounded_channel();
        let diagnostics = Self {
            sender: Some(tx),
            enabled: Arc::new(AtomicBool::new(true)),
        };
        (diagnostics, rx)
    }

    /// A sink that drops everything.
    pub fn silent() -> Self {
        Self {
            sender: None,
            enabled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn report(&self, event: PipelineEvent) {
        if !self.is_enabled() {
            return;
        }
        if let Some(sender) = &self.sender {
            // Receiver gone means nobody is listening; nothing to do.
            let _ = sender.send(event);
        }
    }

    pub fn failure(
        &self,
        subject: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        self.report(PipelineEvent::Failed {
            subject: subject.into(),
            kind,
            message: message.into(),
        });
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::silent()
    }
}
