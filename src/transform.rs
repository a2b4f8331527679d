//! Ordered tree passes applied between parsing and rendering.

use log::debug;

use crate::linker::CitationLinker;
use crate::tree::Node;

/// A pass that rewrites a document tree in place.
pub trait Transform: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    fn apply(&self, tree: &mut Node);
}

/// Transforms run in the order they were added.
pub struct Pipeline {
    passes: Vec<Box<dyn Transform>>,
}

impl Pipeline {
    /// An empty pipeline.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Appends a pass, builder style.
    pub fn with_pass(mut self, pass: impl Transform + 'static) -> Self {
        self.push(pass);
        self
    }

    pub fn push(&mut self, pass: impl Transform + 'static) {
        self.passes.push(Box::new(pass));
    }

    pub fn names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Runs every pass over the tree.
    pub fn apply(&self, tree: &mut Node) {
        for pass in &self.passes {
            debug!("running pass '{}'", pass.name());
            pass.apply(tree);
        }
    }
}

impl Default for Pipeline {
    /// The standard passes: citation linking only.
    fn default() -> Self {
        Self::new().with_pass(CitationLinker::new())
    }
}
