use std::fs;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, warn};

use crate::{node::Node, path_guard::Located, resolver::Resolver};

const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    /// Root-relative request path, no leading slash.
    pub link: String,
}

#[derive(Debug)]
pub struct Child {
    pub entry: ListingEntry,
    pub located: Located,
    pub node: Node,
}

/// Children go through the same [`Resolver::locate`] as direct requests, so
/// anything that would 404 when requested is skipped. Titles use the entry's
/// own name, not its symlink target's.
pub fn scan_children(resolver: &Resolver, dir: &Located) -> Vec<Child> {
    let entries = match fs::read_dir(&dir.path) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("cannot list {}: {err}", dir.path.display());
            return Vec::new();
        }
    };

    let mut children = Vec::new();
    for entry in entries.filter_map(Result::ok) {
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            debug!("skipping non utf-8 name in {}", dir.path.display());
            continue;
        };
        let link = child_link(&dir.relative, name);

        let located = match resolver.locate(&link) {
            Ok(located) => located,
            Err(err) => {
                debug!("skipping {link}: {err}");
                continue;
            }
        };
        let node = match resolver.factory().open_as(&located.path, name) {
            Ok(node) => node,
            Err(err) => {
                debug!("skipping {link}: {err}");
                continue;
            }
        };

        debug!("add {link} as {}", node.title());
        children.push(Child {
            entry: ListingEntry {
                title: node.title().to_string(),
                link,
            },
            located,
            node,
        });
    }
    children
}

/// Equal titles are ordered by link, never by enumeration order.
pub fn sorted_entries(children: &[Child]) -> Vec<ListingEntry> {
    let mut entries: Vec<ListingEntry> = children.iter().map(|c| c.entry.clone()).collect();
    entries.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.link.cmp(&b.link)));
    entries
}

pub fn render_listing(title: &str, entries: &[ListingEntry]) -> String {
    let mut html = format!("<h2>{}</h2><ul>", escape_html(title));
    for entry in entries {
        html.push_str(&format!(
            r#"<li><a href="/{}">{}</a></li>"#,
            encode_link(&entry.link),
            escape_html(&entry.title)
        ));
    }
    html.push_str("</ul>");
    html
}

fn child_link(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn encode_link(link: &str) -> String {
    link.split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
