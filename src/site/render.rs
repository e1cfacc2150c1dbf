//! HTML rendering with Handlebars templates.
//!
//! One template per [`PageKind`] (`index.html`, `artist.html`,
//! `album.html`) plus the `header` and `footer` partials. The bundled set is
//! compiled into the binary; an alternate directory can replace it. Every
//! template is compiled once at startup, so a missing or broken template
//! fails the run before any audio file is touched.

use handlebars::{Handlebars, handlebars_helper};
use std::path::Path;

use crate::error::{Error, Result};
use crate::model::{PageDescriptor, PageKind};

const BUNDLED_HEADER: &str = include_str!("../../templates/header.html");
const BUNDLED_FOOTER: &str = include_str!("../../templates/footer.html");
const BUNDLED_INDEX: &str = include_str!("../../templates/index.html");
const BUNDLED_ARTIST: &str = include_str!("../../templates/artist.html");
const BUNDLED_ALBUM: &str = include_str!("../../templates/album.html");

const PARTIALS: [&str; 2] = ["header", "footer"];

/// Turns a page descriptor into HTML.
pub trait Renderer: Send + Sync {
    fn render(&self, page: &PageDescriptor) -> Result<String>;
}

handlebars_helper!(trim_string: |text: str, count: u64| {
    let count = count as usize;
    if text.chars().count() > count {
        format!("{}...", text.chars().take(count).collect::<String>())
    } else {
        text.to_string()
    }
});

/// Handlebars-backed [`Renderer`].
pub struct TemplateRenderer {
    registry: Handlebars<'static>,
}

impl TemplateRenderer {
    /// Templates compiled into the binary.
    pub fn bundled() -> Result<Self> {
        let mut registry = Self::registry();
        for (name, source) in [("header", BUNDLED_HEADER), ("footer", BUNDLED_FOOTER)] {
            register_partial(&mut registry, name, source, Path::new(name))?;
        }
        for (kind, source) in [
            (PageKind::Index, BUNDLED_INDEX),
            (PageKind::Artist, BUNDLED_ARTIST),
            (PageKind::Album, BUNDLED_ALBUM),
        ] {
            register_template(&mut registry, kind.name(), source, Path::new(kind.name()))?;
        }
        Ok(Self { registry })
    }

    /// Templates read from `dir`.
    ///
    /// Every page template must exist. `header.html` and `footer.html` are
    /// optional and fall back to the bundled partials.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut registry = Self::registry();

        for name in PARTIALS {
            let path = dir.join(format!("{name}.html"));
            let source = if path.exists() {
                read_template(&path)?
            } else if name == "header" {
                BUNDLED_HEADER.to_string()
            } else {
                BUNDLED_FOOTER.to_string()
            };
            register_partial(&mut registry, name, &source, &path)?;
        }

        for kind in PageKind::ALL {
            let path = dir.join(format!("{}.html", kind.name()));
            let source = read_template(&path)?;
            register_template(&mut registry, kind.name(), &source, &path)?;
        }

        tracing::info!(dir = %dir.display(), "Loaded templates");
        Ok(Self { registry })
    }

    fn registry() -> Handlebars<'static> {
        let mut registry = Handlebars::new();
        registry.register_helper("trimString", Box::new(trim_string));
        registry
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, page: &PageDescriptor) -> Result<String> {
        let name = page.kind().name();
        self.registry
            .render(name, page)
            .map_err(|e| Error::template(format!("rendering {name} page: {e}")))
    }
}

fn read_template(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::template_load(path, e.to_string()))
}

fn register_partial(registry: &mut Handlebars<'static>, name: &str, source: &str, path: &Path) -> Result<()> {
    registry
        .register_partial(name, source)
        .map_err(|e| Error::template_load(path, e.to_string()))
}

fn register_template(registry: &mut Handlebars<'static>, name: &str, source: &str, path: &Path) -> Result<()> {
    registry
        .register_template_string(name, source)
        .map_err(|e| Error::template_load(path, e.to_string()))
}
