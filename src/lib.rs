//! # Thumbdrop
//!
//! Drop image files in, get fixed-size thumbnails out, and keep them across
//! restarts. Each accepted PNG or JPEG is decoded, scaled down to fit a
//! fixed canvas (150×150 by default), encoded, shown, and persisted in a
//! local versioned store. On the next start everything stored is replayed.
//!
//! # Architecture: Per-File Pipeline
//!
//! ```text
//! FileCandidate → whitelist → decode → key → render ─┬─► presenter
//!                                                    └─► store (best-effort)
//!
//! startup: store.enumerate_all → decode → presenter (cache loader)
//! ```
//!
//! Every file is an independent task. Files finish in whatever order their
//! renders complete, and a failure in one (unsupported type, undecodable
//! bytes, missing encoder, store error) is reported and isolated to it.
//! Nothing is thrown back at whoever handed the files in.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`app`] | Startup sequence (options, capabilities, store, replay) and input handlers |
//! | [`pipeline`] | Per-file validate → decode → render → persist + present, error kinds |
//! | [`loader`] | Replays persisted thumbnails into presentation at startup |
//! | [`store`] | Versioned SQLite key/value store with an explicit lifecycle |
//! | [`imaging`] | Fit geometry, render planning, and the pixel backend |
//! | [`key`] | `<prefix>_<millis><random>:<mime>` thumbnail keys |
//! | [`media`] | Accepted media types and data-URI encoding |
//! | [`source`] | File candidates and directory walking |
//! | [`presentation`] | Traits for whatever shows thumbnails and supplies files |
//! | [`gallery`] | HTML page presenter rendered with Maud |
//! | [`diagnostics`] | Event sink for progress and per-file failures |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Presentation Never Waits on Persistence
//!
//! The store write for a thumbnail is spawned as its own task before the
//! thumbnail is presented. A slow or broken store delays nothing and hides
//! nothing; the failure shows up as a `StoreUnavailable` diagnostic.
//!
//! ## Explicit Store Lifecycle
//!
//! The store connection is never handed out. [`store::ThumbnailStore`] moves
//! through `Unopened → Opening → (Upgrading →) Ready → Closed`, and reads and
//! writes only run in `Ready`. A reset holds the lifecycle lock while it
//! deletes and reopens the file, so writes issued during a reset land in the
//! fresh store instead of racing it.
//!
//! ## Capabilities Resolved Once
//!
//! What the runtime can do is a plain [`app::Capabilities`] value handed to
//! startup. If anything is missing, startup fails closed before a single
//! handler exists.

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod gallery;
pub mod imaging;
pub mod key;
pub mod loader;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod presentation;
pub mod source;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
