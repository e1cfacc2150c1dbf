//! Maps pages to directories and writes them.
//!
//! Each URL path becomes a directory under the output root holding a single
//! `index.html`. Directory creation is idempotent. What happens when a page
//! fails to write is decided by [`WritePolicy`].

use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::config::WritePolicy;
use crate::error::{Error, Result};
use crate::model::{INDEX_PATH, PageDescriptor, RenderReadyModel, canonical_or_self, relative_base};

use super::Renderer;

/// File name written into every page directory.
pub const PAGE_FILE: &str = "index.html";

/// Where one page goes on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPage {
    pub url: String,
    pub dir: PathBuf,
    pub file: PathBuf,
}

/// Directory for a URL path: `/` is the root, `/a/b` is `root/a/b`.
pub fn page_dir(root: &Path, url: &str) -> PathBuf {
    url.split('/')
        .filter(|s| !s.is_empty())
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Plan every page of the model, in URL order.
pub fn plan(root: &Path, model: &RenderReadyModel) -> Vec<PlannedPage> {
    model
        .pages()
        .keys()
        .map(|url| {
            let dir = page_dir(root, url);
            PlannedPage {
                url: url.clone(),
                file: dir.join(PAGE_FILE),
                dir,
            }
        })
        .collect()
}

/// Create `dir` and its parents. An existing directory is fine; any other
/// failure is returned.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(Error::write(dir, e)),
    }
}

/// Outcome of the write phase.
#[derive(Debug, Default)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    /// Pages that failed under [`WritePolicy::BestEffort`]
    pub failed: Vec<(String, Error)>,
}

/// Renders and writes every page of a [`RenderReadyModel`].
pub struct SiteWriter<'a, R: Renderer + ?Sized> {
    output_root: PathBuf,
    renderer: &'a R,
    policy: WritePolicy,
}

impl<'a, R: Renderer + ?Sized> SiteWriter<'a, R> {
    pub fn new(output_root: impl Into<PathBuf>, renderer: &'a R, policy: WritePolicy) -> Self {
        Self {
            output_root: output_root.into(),
            renderer,
            policy,
        }
    }

    /// Write every page in the path index.
    ///
    /// Under [`WritePolicy::FailFast`] the first error is returned and the
    /// remaining pages are skipped. Under [`WritePolicy::BestEffort`] errors
    /// are logged and collected in the report.
    pub fn write_all(&self, model: &RenderReadyModel) -> Result<WriteReport> {
        let mut report = WriteReport::default();

        for page in plan(&self.output_root, model) {
            let Some(descriptor) = model.page(&page.url) else {
                continue;
            };
            match self.write_page(&page, descriptor) {
                Ok(()) => report.written.push(page.file),
                Err(e) => match self.policy {
                    WritePolicy::FailFast => return Err(e),
                    WritePolicy::BestEffort => {
                        error!(url = %page.url, error = %e, "Failed to write page");
                        report.failed.push((page.url, e));
                    }
                },
            }
        }

        info!(
            written = report.written.len(),
            failed = report.failed.len(),
            root = %self.output_root.display(),
            "Site written"
        );
        Ok(report)
    }

    /// Write a second copy of the index page into `dir`, flagged as a copy.
    ///
    /// Links on the copy are relative to `dir`, so they reach the site
    /// wherever the two directories are served from together.
    pub fn write_copy_index(&self, model: &RenderReadyModel, dir: &Path) -> Result<PathBuf> {
        let (title, artists) = match model.page(INDEX_PATH) {
            Some(PageDescriptor::Index { title, artists, .. }) => (title.clone(), artists.clone()),
            _ => return Err(Error::template("model has no index page")),
        };
        ensure_dir(dir)?;
        let base = relative_base(&canonical_or_self(dir), &canonical_or_self(&self.output_root));
        let copy = PageDescriptor::Index {
            title,
            artists,
            base,
            copy: true,
        };
        let page = PlannedPage {
            url: INDEX_PATH.to_string(),
            dir: dir.to_path_buf(),
            file: dir.join(PAGE_FILE),
        };
        self.write_page(&page, &copy)?;
        info!(path = %page.file.display(), "Index copy written");
        Ok(page.file)
    }

    fn write_page(&self, page: &PlannedPage, descriptor: &PageDescriptor) -> Result<()> {
        ensure_dir(&page.dir)?;
        let html = self.renderer.render(descriptor)?;
        std::fs::write(&page.file, html).map_err(|e| Error::write(&page.file, e))?;
        debug!(url = %page.url, path = %page.file.display(), "Wrote page");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::{Aggregator, FinalizeOptions, finalize};
    use crate::model::SiteModel;
    use crate::site::TemplateRenderer;
    use crate::test_utils::{StubRenderer, track};
    use tempfile::tempdir;

    fn sample_model() -> RenderReadyModel {
        let mut agg = Aggregator::new();
        agg.add_track(track("A", "X", Some(2), Some(1999)));
        agg.add_track(track("A", "X", Some(1), Some(1999)));
        agg.add_track(track("B", "Y", Some(1), None));
        finalize(agg.into_model(), &FinalizeOptions::default())
    }

    #[test]
    fn test_page_dir() {
        let root = Path::new("/out");
        assert_eq!(page_dir(root, "/"), PathBuf::from("/out"));
        assert_eq!(page_dir(root, "/A"), PathBuf::from("/out/A"));
        assert_eq!(page_dir(root, "/A/X"), PathBuf::from("/out/A/X"));
    }

    #[test]
    fn test_plan_covers_every_page() {
        let model = sample_model();
        let planned = plan(Path::new("/out"), &model);
        let urls: Vec<_> = planned.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["/", "/A", "/A/X", "/B", "/B/Y"]);
        assert_eq!(planned[2].file, PathBuf::from("/out/A/X/index.html"));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("a").join("b");
        ensure_dir(&target).unwrap();
        ensure_dir(&target).unwrap();
        assert!(target.is_dir());
    }

    #[test]
    fn test_ensure_dir_over_file_fails() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(ensure_dir(&file), Err(Error::Write { .. })));
    }

    #[test]
    fn test_write_all_writes_every_page() {
        let dir = tempdir().unwrap();
        let model = sample_model();
        let writer = SiteWriter::new(dir.path(), &StubRenderer, WritePolicy::FailFast);

        let report = writer.write_all(&model).unwrap();
        assert_eq!(report.written.len(), 5);
        assert!(report.failed.is_empty());

        let album = std::fs::read_to_string(dir.path().join("A/X/index.html")).unwrap();
        assert_eq!(album, "album X | A tracks=2");
        let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert_eq!(index, "index artists=2 copy=false");
    }

    #[test]
    fn test_rewrite_overwrites_existing_output() {
        let dir = tempdir().unwrap();
        let model = sample_model();
        let writer = SiteWriter::new(dir.path(), &StubRenderer, WritePolicy::FailFast);
        writer.write_all(&model).unwrap();
        let first = std::fs::read_to_string(dir.path().join("B/index.html")).unwrap();
        writer.write_all(&model).unwrap();
        let second = std::fs::read_to_string(dir.path().join("B/index.html")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_model_writes_only_index() {
        let dir = tempdir().unwrap();
        let model = finalize(SiteModel::new(), &FinalizeOptions::default());
        let writer = SiteWriter::new(dir.path(), &StubRenderer, WritePolicy::FailFast);

        let report = writer.write_all(&model).unwrap();
        assert_eq!(report.written, vec![dir.path().join("index.html")]);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_fail_fast_stops_on_first_error() {
        let dir = tempdir().unwrap();
        // A file where the "A" directory should go
        std::fs::write(dir.path().join("A"), "blocker").unwrap();
        let model = sample_model();
        let writer = SiteWriter::new(dir.path(), &StubRenderer, WritePolicy::FailFast);

        assert!(writer.write_all(&model).is_err());
        assert!(!dir.path().join("B/index.html").exists());
    }

    #[test]
    fn test_best_effort_keeps_going() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("A"), "blocker").unwrap();
        let model = sample_model();
        let writer = SiteWriter::new(dir.path(), &StubRenderer, WritePolicy::BestEffort);

        let report = writer.write_all(&model).unwrap();
        let failed: Vec<_> = report.failed.iter().map(|(url, _)| url.as_str()).collect();
        assert_eq!(failed, vec!["/A", "/A/X"]);
        assert!(dir.path().join("B/Y/index.html").exists());
        assert!(dir.path().join("index.html").exists());
    }

    #[test]
    fn test_copy_index_is_flagged() {
        let dir = tempdir().unwrap();
        let mirror = dir.path().join("mirror");
        let model = sample_model();
        let writer = SiteWriter::new(dir.path().join("site"), &StubRenderer, WritePolicy::FailFast);

        let path = writer.write_copy_index(&model, &mirror).unwrap();
        assert_eq!(path, mirror.join("index.html"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "index artists=2 copy=true");
    }

    #[test]
    fn test_copy_index_links_back_to_site() {
        let dir = tempdir().unwrap();
        let site = dir.path().join("site");
        std::fs::create_dir(&site).unwrap();
        let renderer = TemplateRenderer::bundled().unwrap();
        let writer = SiteWriter::new(&site, &renderer, WritePolicy::FailFast);
        let model = sample_model();

        writer.write_all(&model).unwrap();
        let path = writer.write_copy_index(&model, &dir.path().join("mirror")).unwrap();

        let main = std::fs::read_to_string(site.join("index.html")).unwrap();
        assert!(main.contains(r#"href="/A/""#));
        let copy = std::fs::read_to_string(path).unwrap();
        assert!(copy.contains(r#"href="../site/A/""#));
        assert!(copy.contains(r#"href="../site/B/""#));
        assert!(!copy.contains(r#"href="/A/""#));
    }
}
