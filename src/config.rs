use std::{env, path::PathBuf};

use anyhow::{Context, Result, anyhow};

use crate::{
    catalog::Strategy,
    converter::Converter,
    node::{Extensions, NodeFactory},
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub content_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub markdown_extensions: Vec<String>,
    pub graph_extensions: Vec<String>,
    pub markdown_converter: String,
    pub graph_converter: String,
    pub title_scan_lines: usize,
    pub strategy: Strategy,
    pub max_path_length: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| {
            lookup(key).and_then(|v| {
                let trimmed = v.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            })
        };

        let content_dir = PathBuf::from(
            shellexpand::tilde(&optional("MDLIGHT_DIR").unwrap_or_else(|| ".".to_string()))
                .into_owned(),
        );
        let host = optional("MDLIGHT_HOST").unwrap_or_else(|| "localhost".to_string());
        let port = optional("MDLIGHT_PORT")
            .as_deref()
            .unwrap_or("1600")
            .parse::<u16>()
            .context("MDLIGHT_PORT must be a port number")?;
        let markdown_extensions = list(
            optional("MDLIGHT_MARKDOWN_EXTENSIONS")
                .as_deref()
                .unwrap_or(".markdown,.md,.tex"),
        );
        let graph_extensions = list(
            optional("MDLIGHT_GRAPH_EXTENSIONS")
                .as_deref()
                .unwrap_or(".graphviz,.dot"),
        );
        let markdown_converter =
            optional("MDLIGHT_MARKDOWN_CONVERTER").unwrap_or_else(|| "pandoc".to_string());
        let graph_converter =
            optional("MDLIGHT_GRAPH_CONVERTER").unwrap_or_else(|| "dot".to_string());
        let title_scan_lines = optional("MDLIGHT_TITLE_SCAN_LINES")
            .as_deref()
            .unwrap_or("11")
            .parse::<usize>()
            .context("MDLIGHT_TITLE_SCAN_LINES must be an integer")?;
        let strategy = optional("MDLIGHT_STRATEGY")
            .map(|v| v.parse::<Strategy>())
            .transpose()
            .context("MDLIGHT_STRATEGY is invalid")?
            .unwrap_or_default();
        let max_path_length = optional("MDLIGHT_MAX_PATH_LENGTH")
            .as_deref()
            .unwrap_or("512")
            .parse::<usize>()
            .context("MDLIGHT_MAX_PATH_LENGTH must be an integer")?;

        if title_scan_lines == 0 {
            return Err(anyhow!("MDLIGHT_TITLE_SCAN_LINES must be > 0"));
        }
        if max_path_length == 0 {
            return Err(anyhow!("MDLIGHT_MAX_PATH_LENGTH must be > 0"));
        }

        Ok(Self {
            content_dir,
            host,
            port,
            markdown_extensions,
            graph_extensions,
            markdown_converter,
            graph_converter,
            title_scan_lines,
            strategy,
            max_path_length,
        })
    }

    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn content_root(&self) -> Result<PathBuf> {
        let root = self.content_dir.canonicalize().with_context(|| {
            format!("content directory {} is not accessible", self.content_dir.display())
        })?;
        if !root.is_dir() {
            return Err(anyhow!("content directory {} is not a directory", root.display()));
        }
        Ok(root)
    }

    pub fn node_factory(&self) -> NodeFactory {
        NodeFactory {
            extensions: Extensions::new(&self.markdown_extensions, &self.graph_extensions),
            markdown: Converter::markdown(&self.markdown_converter),
            graph: Converter::graph(&self.graph_converter),
            title_scan_lines: self.title_scan_lines,
        }
    }
}

fn list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
