//! Runs layout rules over a data document from start to finish.
use crate::config::EngineConfig;
use crate::dispatch::{DataContext, Dispatcher};
use crate::document::Document;
use crate::error::{ErrorKind, PublishError};
use crate::output::{CollectingSink, PageOutput, PageSink};
use crate::rules::compile_rules;
use crate::typesetter::{FixedPitchTypesetter, TextFormat, Typesetter};
use crate::version::{ENGINE_VERSION, check_version};
use gridpress_resource::{FileFinder, SearchPathFinder};
use gridpress_xpath::DataNode;
use gridpress_xref::{Marker, ReferenceTracker};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Everything a run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    pub pages: Vec<PageOutput>,
    pub markers: Vec<Marker>,
    pub last_page: u32,
}

impl RunOutput {
    pub fn to_json(&self) -> Result<String, PublishError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Markers and page count of a run whose pages went to a caller's sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub markers: Vec<Marker>,
    pub last_page: u32,
}

/// A builder for creating a [`Publisher`].
#[derive(Default)]
pub struct PublisherBuilder {
    config: EngineConfig,
    typesetter: Option<Box<dyn Typesetter>>,
    finder: Option<Box<dyn FileFinder>>,
}

impl PublisherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the configuration from a JSON file.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, PublishError> {
        self.config = EngineConfig::from_file(path)?;
        Ok(self)
    }

    /// Names the aux file `<jobname>-aux.xml`.
    pub fn with_jobname(mut self, jobname: impl Into<String>) -> Self {
        self.config.jobname = jobname.into();
        self
    }

    pub fn with_aux_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.aux_dir = dir.into();
        self
    }

    /// Adds a directory images are looked up in, after the configured ones.
    pub fn with_search_path<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.search_paths.push(dir.into());
        self
    }

    pub fn with_write_aux(mut self, write: bool) -> Self {
        self.config.write_aux = write;
        self
    }

    /// Whether an unresolved marker reference stops the run.
    pub fn with_strict_references(mut self, strict: bool) -> Self {
        self.config.strict_references = strict;
        self
    }

    pub fn with_ignore_version(mut self, ignore: bool) -> Self {
        self.config.ignore_version = ignore;
        self
    }

    pub fn with_typesetter<T: Typesetter + 'static>(mut self, typesetter: T) -> Self {
        self.typesetter = Some(Box::new(typesetter));
        self
    }

    pub fn with_file_finder<F: FileFinder + 'static>(mut self, finder: F) -> Self {
        self.finder = Some(Box::new(finder));
        self
    }

    pub fn build(self) -> Result<Publisher, PublishError> {
        self.config.validate()?;
        let typesetter = self
            .typesetter
            .unwrap_or_else(|| Box::new(FixedPitchTypesetter::new(self.config.glyph_advance)));
        let finder = self
            .finder
            .unwrap_or_else(|| Box::new(SearchPathFinder::new(self.config.search_paths.clone())));
        Ok(Publisher {
            config: self.config,
            typesetter,
            finder,
        })
    }
}

pub struct Publisher {
    config: EngineConfig,
    typesetter: Box<dyn Typesetter>,
    finder: Box<dyn FileFinder>,
}

impl Publisher {
    pub fn builder() -> PublisherBuilder {
        PublisherBuilder::new()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Lays out `data` with the rules in `layout` and keeps the pages in memory.
    pub fn run(&self, layout: &str, data: &str) -> Result<RunOutput, PublishError> {
        let mut sink = CollectingSink::new();
        let summary = self.run_with_sink(layout, data, &mut sink)?;
        Ok(RunOutput {
            pages: sink.into_pages(),
            markers: summary.markers,
            last_page: summary.last_page,
        })
    }

    pub fn run_files(&self, layout: &Path, data: &Path) -> Result<RunOutput, PublishError> {
        let layout = read_source(layout)?;
        let data = read_source(data)?;
        self.run(&layout, &data)
    }

    /// Lays out `data`, handing every finished page to `sink`. A failed run is
    /// logged once.
    pub fn run_with_sink(
        &self,
        layout: &str,
        data: &str,
        sink: &mut dyn PageSink,
    ) -> Result<RunSummary, PublishError> {
        self.execute(layout, data, sink).map_err(PublishError::report)
    }

    fn execute(
        &self,
        layout: &str,
        data: &str,
        sink: &mut dyn PageSink,
    ) -> Result<RunSummary, PublishError> {
        let aux_file = self.config.aux_file();
        let tracker = ReferenceTracker::load(&aux_file)?;

        let rules = compile_rules(layout)?;
        match rules.attribute("version") {
            Some(_) if self.config.ignore_version => debug!("Version check skipped"),
            Some(required) => check_version(required, ENGINE_VERSION)?,
            None => {}
        }

        let data = roxmltree::Document::parse(data).map_err(ErrorKind::DataSyntax)?;
        let root = data.root_element();
        let root_name = root.tag_name().name();

        let document = Document::new(
            self.config.page_dimensions(),
            self.config.margins,
            self.config.grid_settings(),
            tracker,
            sink,
        )
        .with_strict_references(self.config.strict_references);
        let format = TextFormat {
            font_size: self.config.font_size,
            leading: self.config.leading,
        };
        let mut dispatcher =
            Dispatcher::new(document, self.typesetter.as_ref(), self.finder.as_ref(), format);

        let ctx = DataContext::new(DataNode::new(root));
        dispatcher.execute_children(&rules, ctx)?;
        let rule = dispatcher
            .document()
            .patterns
            .lookup(root_name, "")
            .ok_or_else(|| ErrorKind::MissingRootRule(root_name.to_string()))?;
        dispatcher.execute_children(&rule, ctx)?;

        let (tracker, last_page) = dispatcher.into_document().finish()?;
        if self.config.write_aux {
            tracker.save(&aux_file, last_page)?;
        }
        info!(
            "Run '{}' finished: {} page(s), {} marker(s)",
            self.config.jobname,
            last_page,
            tracker.len()
        );
        Ok(RunSummary {
            markers: tracker.markers().cloned().collect(),
            last_page,
        })
    }
}

fn read_source(path: &Path) -> Result<String, PublishError> {
    fs::read_to_string(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("Failed to read '{}': {}", path.display(), e),
        )
        .into()
    })
}
