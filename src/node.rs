use std::{
    collections::HashSet,
    fs,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;
use tracing::debug;

use crate::{
    converter::Converter,
    index::{ListingEntry, render_listing},
    mime,
};

const HTML_UTF8: &str = "text/html;charset=utf-8";
const SVG: &str = "image/svg+xml";

static FIRST_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#([^#].*)$").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Markdown,
    Graph,
    Index,
    Static,
}

/// Stored without the leading dot; matching is case-sensitive.
#[derive(Clone, Debug)]
pub struct Extensions {
    markdown: HashSet<String>,
    graph: HashSet<String>,
}

impl Extensions {
    pub fn new<M, G>(markdown: M, graph: G) -> Self
    where
        M: IntoIterator,
        M::Item: AsRef<str>,
        G: IntoIterator,
        G::Item: AsRef<str>,
    {
        Self {
            markdown: collect_extensions(markdown),
            graph: collect_extensions(graph),
        }
    }
}

impl Default for Extensions {
    fn default() -> Self {
        Self::new([".markdown", ".md", ".tex"], [".graphviz", ".dot"])
    }
}

fn collect_extensions<I>(values: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().trim_start_matches('.').to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

pub fn classify(is_dir: bool, extension: Option<&str>, extensions: &Extensions) -> NodeKind {
    if is_dir {
        return NodeKind::Index;
    }
    match extension {
        Some(ext) if extensions.markdown.contains(ext) => NodeKind::Markdown,
        Some(ext) if extensions.graph.contains(ext) => NodeKind::Graph,
        _ => NodeKind::Static,
    }
}

#[derive(Clone, Debug)]
pub struct NodeFactory {
    pub extensions: Extensions,
    pub markdown: Converter,
    pub graph: Converter,
    pub title_scan_lines: usize,
}

impl NodeFactory {
    pub fn open(&self, path: &Path) -> io::Result<Node> {
        self.open_as(path, &basename(path))
    }

    /// Like [`NodeFactory::open`], but titles the node by `name` instead of
    /// the basename of `path`, so a symlink is listed under its own name.
    /// Index nodes come back without entries.
    pub fn open_as(&self, path: &Path, name: &str) -> io::Result<Node> {
        let is_dir = fs::metadata(path)?.is_dir();
        let extension = path.extension().and_then(|ext| ext.to_str());
        let node = match classify(is_dir, extension, &self.extensions) {
            NodeKind::Index => {
                debug!("index node {}", path.display());
                Node::Index(IndexPage::new(path, name))
            }
            NodeKind::Markdown => {
                debug!("markdown node {}", path.display());
                Node::Markdown(MarkdownPage {
                    title: markdown_title(path, name, self.title_scan_lines)?,
                    path: path.to_path_buf(),
                    converter: self.markdown.clone(),
                })
            }
            NodeKind::Graph => {
                debug!("graph node {}", path.display());
                Node::Graph(GraphPage {
                    title: name.to_string(),
                    path: path.to_path_buf(),
                    converter: self.graph.clone(),
                })
            }
            NodeKind::Static => {
                debug!("static node {}", path.display());
                Node::Static(StaticPage {
                    title: name.to_string(),
                    guess: mime::guess(path),
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(node)
    }
}

#[derive(Clone, Debug)]
pub enum Node {
    Markdown(MarkdownPage),
    Graph(GraphPage),
    Index(IndexPage),
    Static(StaticPage),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Markdown(_) => NodeKind::Markdown,
            Self::Graph(_) => NodeKind::Graph,
            Self::Index(_) => NodeKind::Index,
            Self::Static(_) => NodeKind::Static,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Markdown(page) => &page.path,
            Self::Graph(page) => &page.path,
            Self::Index(page) => &page.path,
            Self::Static(page) => &page.path,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Markdown(page) => &page.title,
            Self::Graph(page) => &page.title,
            Self::Index(page) => &page.title,
            Self::Static(page) => &page.title,
        }
    }

    pub fn content(&self) -> io::Result<Vec<u8>> {
        match self {
            Self::Markdown(page) => Ok(page.converter.render(&page.path)),
            Self::Graph(page) => Ok(page.converter.render(&page.path)),
            Self::Index(page) => Ok(render_listing(&page.title, &page.entries).into_bytes()),
            Self::Static(page) => fs::read(&page.path),
        }
    }

    pub fn content_type(&self) -> &str {
        match self {
            Self::Markdown(_) | Self::Index(_) => HTML_UTF8,
            Self::Graph(_) => SVG,
            Self::Static(page) => &page.guess.content_type,
        }
    }

    pub fn content_encoding(&self) -> Option<&str> {
        match self {
            Self::Markdown(_) => Some("identity"),
            Self::Graph(_) | Self::Index(_) => None,
            Self::Static(page) => page.guess.encoding,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MarkdownPage {
    path: PathBuf,
    title: String,
    converter: Converter,
}

#[derive(Clone, Debug)]
pub struct GraphPage {
    path: PathBuf,
    title: String,
    converter: Converter,
}

#[derive(Clone, Debug)]
pub struct IndexPage {
    path: PathBuf,
    title: String,
    entries: Vec<ListingEntry>,
}

impl IndexPage {
    fn new(path: &Path, name: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            title: name.to_string(),
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn set_entries(&mut self, entries: Vec<ListingEntry>) {
        self.entries = entries;
    }
}

#[derive(Clone, Debug)]
pub struct StaticPage {
    path: PathBuf,
    title: String,
    guess: mime::Guess,
}

fn basename(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `name: heading` when a level-1 heading sits within the first
/// `scan_lines` lines, otherwise `name` alone.
pub fn markdown_title(path: &Path, name: &str, scan_lines: usize) -> io::Result<String> {
    let mut reader = BufReader::new(fs::File::open(path)?);
    let mut line = Vec::new();

    for _ in 0..scan_lines {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\n', '\r']);
        if let Some(caps) = FIRST_HEADING.captures(text) {
            let heading = caps[1].trim();
            if !heading.is_empty() {
                return Ok(format!("{name}: {heading}"));
            }
        }
    }

    Ok(name.to_string())
}
