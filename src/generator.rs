//! Generator - the whole pipeline for one host project
//!
//! walk bindings → bind graph → inject documents. A generator owns the
//! source cache, so it is consumed by a run and nothing survives into the
//! next one.

use crate::bindings::BindingWalker;
use crate::cache::{SourceCache, SourceLocator};
use crate::graph::GraphStats;
use crate::host::render::render_document;
use crate::host::HostProject;
use crate::injector::CodeInjector;
use crate::mapper::{BoundGraph, GraphBinder};
use crate::Result;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of a generation run
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct RunReport {
    pub documents: usize,
    pub bindings: usize,
    pub parsed_files: usize,
    pub graph: GraphStats,
    pub members_rewritten: usize,
    pub members_generated: usize,
    pub diagnostics: usize,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Generation Report:")?;
        writeln!(f, "  Documents: {}", self.documents)?;
        writeln!(f, "  Bindings: {}", self.bindings)?;
        writeln!(f, "  Python files parsed: {}", self.parsed_files)?;
        writeln!(f, "  Members rewritten: {}", self.members_rewritten)?;
        writeln!(f, "  Methods generated: {}", self.members_generated)?;
        writeln!(f, "  Diagnostics: {}", self.diagnostics)
    }
}

pub struct Generator {
    cache: SourceCache,
    locator: SourceLocator,
}

impl Generator {
    pub fn new(cache: SourceCache, locator: SourceLocator) -> Self {
        Self { cache, locator }
    }

    /// Generator parsing with tree-sitter, falling back to `python_dir` for
    /// sources not colocated with their host document
    pub fn with_python_dir(python_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self::new(SourceCache::with_tree_sitter()?, SourceLocator::new(python_dir)))
    }

    /// Bind without injecting, for inspection
    pub fn bind(mut self, project: &HostProject) -> Result<BoundGraph> {
        let bindings = BindingWalker::walk(project);
        GraphBinder::new(&mut self.cache, &self.locator).bind(&bindings)
    }

    /// Run the pipeline, returning the rewritten project
    pub fn run(mut self, project: &HostProject) -> Result<(HostProject, RunReport)> {
        tracing::info!("Generating {} ({} documents)", project.name, project.documents.len());

        let bindings = BindingWalker::walk(project);
        let bound = GraphBinder::new(&mut self.cache, &self.locator).bind(&bindings)?;

        let mut injector = CodeInjector::new(&bound);
        let output = injector.inject_project(project);
        let stats = injector.into_stats();

        let report = RunReport {
            documents: output.documents.len(),
            bindings: bindings.len(),
            parsed_files: self.cache.parse_count(),
            graph: bound.graph.stats(),
            members_rewritten: stats.rewritten,
            members_generated: stats.generated,
            diagnostics: stats.diagnostics,
        };
        if report.diagnostics > 0 {
            tracing::warn!("{} diagnostics emitted", report.diagnostics);
        }
        tracing::info!(
            "Rewrote {} members, generated {} methods",
            report.members_rewritten,
            report.members_generated
        );
        Ok((output, report))
    }
}

/// Render every document into `output_dir`, one file per document named
/// after its source. Returns the written paths.
pub fn write_documents(project: &HostProject, output_dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();
    for (index, document) in project.documents.iter().enumerate() {
        let file_name = document
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| format!("document{}.cs", index).into());
        let path = output_dir.join(file_name);
        std::fs::write(&path, render_document(document))?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
