//! Source cache
//!
//! Python files are parsed and extracted at most once per run. Entries are
//! keyed by canonical absolute path and hold the extracted file root inside
//! the run's graph builder. The cache is tied to the first builder it
//! extracts into; handing it a different builder starts it over.

use crate::extract::StructureExtractor;
use crate::graph::{BuilderId, GraphBuilder, NodeId};
use crate::python::{PythonParser, TreeSitterParser};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolves a binding's `file` to a Python source path
#[derive(Debug, Clone, Default)]
pub struct SourceLocator {
    /// Fallback root for files not found next to the host document
    pub python_dir: Option<PathBuf>,
}

impl SourceLocator {
    pub fn new(python_dir: Option<PathBuf>) -> Self {
        Self { python_dir }
    }

    /// Prefer the file next to the referencing host document, then the
    /// configured Python directory.
    pub fn locate(&self, document_dir: &Path, file: &str) -> Result<PathBuf> {
        let colocated = document_dir.join(file);
        if colocated.is_file() {
            return Ok(colocated);
        }

        if let Some(root) = &self.python_dir {
            let candidate = root.join(file);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }

        Err(Error::SourceNotFound(file.to_string()))
    }
}

/// Parse-once cache of extracted Python files
pub struct SourceCache {
    parser: Box<dyn PythonParser>,
    entries: HashMap<PathBuf, NodeId>,
    /// Builder the cached roots live in
    owner: Option<BuilderId>,
    parse_count: usize,
}

impl SourceCache {
    pub fn new(parser: Box<dyn PythonParser>) -> Self {
        Self {
            parser,
            entries: HashMap::new(),
            owner: None,
            parse_count: 0,
        }
    }

    /// Cache backed by the tree-sitter parser
    pub fn with_tree_sitter() -> Result<Self> {
        Ok(Self::new(Box::new(TreeSitterParser::new()?)))
    }

    /// Extracted root of `path`, parsing the file on first request
    pub fn get_or_extract(&mut self, builder: &mut GraphBuilder, path: &Path) -> Result<NodeId> {
        let key = std::fs::canonicalize(path)
            .map_err(|_| Error::SourceNotFound(path.display().to_string()))?;

        if self.owner != Some(builder.id()) {
            if !self.entries.is_empty() {
                tracing::debug!("Cache reset: {} roots belong to another graph", self.entries.len());
                self.entries.clear();
            }
            self.owner = Some(builder.id());
        }

        if let Some(root) = self.entries.get(&key) {
            tracing::debug!("Cache hit: {}", key.display());
            return Ok(*root);
        }

        let source = std::fs::read_to_string(&key)?;
        let ast = self.parser.parse(&source, &key)?;
        self.parse_count += 1;

        let name = key
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let root = StructureExtractor::new(builder).extract_file(&name, Some(key.clone()), &ast)?;

        tracing::debug!("Parsed {}", key.display());
        self.entries.insert(key, root);
        Ok(root)
    }

    /// Number of underlying parses performed
    pub fn parse_count(&self) -> usize {
        self.parse_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::python::Stmt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Delegates to tree-sitter and counts calls
    struct CountingParser {
        inner: TreeSitterParser,
        calls: Arc<AtomicUsize>,
    }

    impl PythonParser for CountingParser {
        fn parse(&self, source: &str, path: &Path) -> Result<Stmt> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.parse(source, path)
        }
    }

    fn counting_cache() -> (SourceCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let parser = CountingParser {
            inner: TreeSitterParser::new().unwrap(),
            calls: calls.clone(),
        };
        (SourceCache::new(Box::new(parser)), calls)
    }

    #[test]
    fn test_same_path_parsed_once() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("pkg")).unwrap();
        let file = dir.path().join("pkg").join("vector.py");
        std::fs::write(&file, "class Vector:\n    def add(self, x):\n        return x\n").unwrap();

        let (mut cache, calls) = counting_cache();
        let mut builder = GraphBuilder::new();

        let first = cache.get_or_extract(&mut builder, &file).unwrap();
        let dotted = dir.path().join("pkg").join(".").join("vector.py");
        let second = cache.get_or_extract(&mut builder, &dotted).unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.parse_count(), 1);
        assert_eq!(cache.len(), 1);
        assert!(builder.descendant(first, "Vector.add").is_some());
    }

    #[test]
    fn test_other_builder_gets_fresh_roots() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("vector.py");
        std::fs::write(&file, "class Vector:\n    def add(self, x):\n        return x\n").unwrap();

        let (mut cache, calls) = counting_cache();
        let mut first = GraphBuilder::new();
        cache.get_or_extract(&mut first, &file).unwrap();

        // shifted ids: the first builder's root names a different node here
        let mut second = GraphBuilder::new();
        second.get_or_add_module("padding");
        let root = cache.get_or_extract(&mut second, &file).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
        assert!(second.descendant(root, "Vector.add").is_some());
    }

    #[test]
    fn test_missing_file_and_syntax_error() {
        let dir = TempDir::new().unwrap();
        let (mut cache, _) = counting_cache();
        let mut builder = GraphBuilder::new();

        let missing = cache.get_or_extract(&mut builder, &dir.path().join("nope.py"));
        assert!(matches!(missing, Err(Error::SourceNotFound(_))));

        let broken = dir.path().join("broken.py");
        std::fs::write(&broken, "def f(:\n").unwrap();
        assert!(matches!(
            cache.get_or_extract(&mut builder, &broken),
            Err(Error::Parse { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_locator_prefers_colocated_file() {
        let dir = TempDir::new().unwrap();
        let docs = dir.path().join("src");
        let python = dir.path().join("python");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::create_dir_all(&python).unwrap();
        std::fs::write(python.join("shared.py"), "").unwrap();
        std::fs::write(python.join("local.py"), "").unwrap();
        std::fs::write(docs.join("local.py"), "").unwrap();

        let locator = SourceLocator::new(Some(python.clone()));
        assert_eq!(locator.locate(&docs, "local.py").unwrap(), docs.join("local.py"));
        assert_eq!(locator.locate(&docs, "shared.py").unwrap(), python.join("shared.py"));
        assert!(matches!(
            locator.locate(&docs, "absent.py"),
            Err(Error::SourceNotFound(_))
        ));

        let without_root = SourceLocator::default();
        assert!(without_root.locate(&docs, "shared.py").is_err());
    }
}
