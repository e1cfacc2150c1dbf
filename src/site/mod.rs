//! The write phase: templates and the on-disk layout of the site.

mod render;
mod writer;

pub use render::{Renderer, TemplateRenderer};
pub use writer::{PAGE_FILE, PlannedPage, SiteWriter, WriteReport, ensure_dir, page_dir, plan};
