use std::{fmt, str::FromStr, sync::Arc};

use anyhow::anyhow;

use crate::{error::ResolveError, node::Node, resolver::Resolver, tree::Tree};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    #[default]
    Lazy,
    Eager,
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "eager" => Ok(Self::Eager),
            other => Err(anyhow!("unknown strategy {other:?}, expected lazy or eager")),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lazy => f.write_str("lazy"),
            Self::Eager => f.write_str("eager"),
        }
    }
}

#[derive(Debug)]
pub enum Catalog {
    Lazy(Resolver),
    Eager(Tree),
}

impl Catalog {
    pub fn build(resolver: Resolver, strategy: Strategy) -> Result<Self, ResolveError> {
        match strategy {
            Strategy::Lazy => Ok(Self::Lazy(resolver)),
            Strategy::Eager => Tree::build(resolver).map(Self::Eager),
        }
    }

    pub fn resolve(&self, request_path: &str) -> Result<Arc<Node>, ResolveError> {
        match self {
            Self::Lazy(resolver) => resolver.resolve(request_path).map(Arc::new),
            Self::Eager(tree) => tree.get(request_path),
        }
    }
}
