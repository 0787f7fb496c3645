use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tracing::{debug, info};

use crate::{
    error::ResolveError,
    index::{scan_children, sorted_entries},
    node::{Node, NodeKind},
    path_guard::Located,
    resolver::Resolver,
};

/// Built once and never refreshed. Lookups still go through the path guard.
#[derive(Debug)]
pub struct Tree {
    resolver: Resolver,
    /// Keyed by canonical root-relative path.
    nodes: HashMap<String, Arc<Node>>,
}

impl Tree {
    pub fn build(resolver: Resolver) -> Result<Self, ResolveError> {
        let root = resolver.locate("")?;
        let mut builder = Builder {
            resolver: &resolver,
            nodes: HashMap::new(),
            visited: HashSet::new(),
        };
        builder.walk(root);
        let nodes = builder.nodes;

        if !nodes.contains_key("") {
            return Err(ResolveError::not_found(resolver.root().display().to_string()));
        }
        info!("built tree of {} nodes under {}", nodes.len(), resolver.root().display());
        Ok(Self { resolver, nodes })
    }

    pub fn get(&self, request_path: &str) -> Result<Arc<Node>, ResolveError> {
        let located = self.resolver.locate(request_path)?;
        self.nodes
            .get(&located.relative)
            .cloned()
            .ok_or_else(|| ResolveError::not_found(request_path))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct Builder<'a> {
    resolver: &'a Resolver,
    nodes: HashMap<String, Arc<Node>>,
    visited: HashSet<String>,
}

impl Builder<'_> {
    fn walk(&mut self, dir: Located) {
        if !self.visited.insert(dir.relative.clone()) {
            return;
        }
        let Ok(mut node) = self.resolver.factory().open(&dir.path) else {
            debug!("skipping vanished directory {}", dir.path.display());
            return;
        };

        let children = scan_children(self.resolver, &dir);
        if let Node::Index(page) = &mut node {
            page.set_entries(sorted_entries(&children));
        }
        self.nodes.insert(dir.relative.clone(), Arc::new(node));

        for child in children {
            if child.node.kind() == NodeKind::Index {
                self.walk(child.located);
            } else if child.entry.link == child.located.relative {
                self.nodes.insert(child.located.relative, Arc::new(child.node));
            } else {
                // Symlinked files carry the link's title; the target keeps its own.
                self.nodes
                    .entry(child.located.relative)
                    .or_insert_with(|| Arc::new(child.node));
            }
        }
    }
}
