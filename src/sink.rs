//! Defines the [`PageSink`] trait, which registers derived pages with
//! whatever renders them, and [`ManifestSink`], which records them as a JSON
//! manifest for an external renderer.

use crate::page::{PageContext, PageRequest, TemplateId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Receives page requests. Registration is fire-and-forget: the caller never
/// learns whether a page was accepted.
pub trait PageSink {
    fn create_page(&mut self, page: PageRequest);
}

impl PageSink for Vec<PageRequest> {
    fn create_page(&mut self, page: PageRequest) {
        self.push(page);
    }
}

/// Collects page requests and writes them out as a JSON array of
/// `{ path, template, component, context }` objects.
#[derive(Debug, Default)]
pub struct ManifestSink {
    /// The template file for each template id, reported as `component`.
    components: BTreeMap<TemplateId, PathBuf>,

    pages: Vec<PageRequest>,
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    path: &'a str,
    template: TemplateId,
    component: Option<&'a Path>,
    context: &'a PageContext,
}

impl ManifestSink {
    pub fn new(components: BTreeMap<TemplateId, PathBuf>) -> ManifestSink {
        ManifestSink {
            components,
            pages: Vec::new(),
        }
    }

    /// Writes the manifest to `w`.
    pub fn finish<W: Write>(self, mut w: W) -> io::Result<()> {
        let entries: Vec<ManifestEntry> = self
            .pages
            .iter()
            .map(|page| ManifestEntry {
                path: &page.path,
                template: page.template,
                component: self
                    .components
                    .get(&page.template)
                    .map(PathBuf::as_path),
                context: &page.context,
            })
            .collect();
        serde_json::to_writer_pretty(&mut w, &entries)?;
        writeln!(w)
    }
}

impl PageSink for ManifestSink {
    fn create_page(&mut self, page: PageRequest) {
        self.pages.push(page);
    }
}
