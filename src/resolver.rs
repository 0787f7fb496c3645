use std::path::{Path, PathBuf};

use crate::{
    error::ResolveError,
    index::{scan_children, sorted_entries},
    node::{Node, NodeFactory},
    path_guard::{Located, locate, normalize_request_path},
};

#[derive(Clone, Debug)]
pub struct Resolver {
    root: PathBuf,
    factory: NodeFactory,
}

impl Resolver {
    /// `root` must be canonical.
    pub fn new(root: PathBuf, factory: NodeFactory) -> Self {
        Self { root, factory }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    pub fn locate(&self, request_path: &str) -> Result<Located, ResolveError> {
        locate(&self.root, &normalize_request_path(request_path))
    }

    pub fn resolve(&self, request_path: &str) -> Result<Node, ResolveError> {
        let located = self.locate(request_path)?;
        self.open_populated(&located)
            .ok_or_else(|| ResolveError::not_found(request_path))
    }

    // None when the entry vanished after it was located.
    fn open_populated(&self, located: &Located) -> Option<Node> {
        let mut node = self.factory.open(&located.path).ok()?;
        if let Node::Index(page) = &mut node {
            let children = scan_children(self, located);
            page.set_entries(sorted_entries(&children));
        }
        Some(node)
    }
}
