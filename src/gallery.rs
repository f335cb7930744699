//! HTML gallery: the presentation container as a standalone page.
//!
//! Each thumbnail is an `<img>` wrapped in an `<a target="_blank">` pointing
//! at the full image. Both are data URIs, so the page has no external files.
//! The reset button is always rendered and toggled with the `hidden` class.
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.

use crate::presentation::{PresentedThumbnail, Presenter, ResetControl};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

const CSS: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; }
#preview { display: flex; flex-wrap: wrap; gap: 0.5rem; }
#preview a { display: block; line-height: 0; border: 1px solid #ddd; }
.hidden { display: none; }
"#;

#[derive(Default)]
pub struct Gallery {
    items: Mutex<Vec<PresentedThumbnail>>,
    reset_visible: AtomicBool,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything presented, in arrival order.
    pub fn items(&self) -> Vec<PresentedThumbnail> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn reset_visible(&self) -> bool {
        self.reset_visible.load(Ordering::Relaxed)
    }

    pub fn render(&self, title: &str) -> Markup {
        let items = self.items();
        let reset_class = (!self.reset_visible()).then_some("hidden");

        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="utf-8";
                    title { (title) }
                    style { (PreEscaped(CSS)) }
                }
                body {
                    h1 { (title) }
                    div #preview {
                        @for item in &items {
                            a href=(item.link) target="_blank" {
                                img
                                    src=(item.thumbnail)
                                    width=(item.width)
                                    height=(item.height)
                                    alt=(item.key.as_str())
                                    data-name=(item.key.as_str());
                            }
                        }
                    }
                    button #reset type="button" class=[reset_class] { "Reset" }
                }
            }
        }
    }

    pub fn write(&self, path: &Path, title: &str) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.render(title).into_string())
    }
}

impl Presenter for Gallery {
    fn present(&self, item: PresentedThumbnail) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    fn clear(&self) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ResetControl for Gallery {
    fn set_visible(&self, visible: bool) {
        self.reset_visible.store(visible, Ordering::Relaxed);
    }
}
