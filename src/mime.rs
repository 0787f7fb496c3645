use std::path::Path;

const OCTET_STREAM: &str = "application/octet-stream";

const ENCODINGS: &[(&str, &str)] = &[
    ("gz", "gzip"),
    ("bz2", "bzip2"),
    ("xz", "xz"),
    ("br", "br"),
    ("Z", "compress"),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Guess {
    pub content_type: String,
    pub encoding: Option<&'static str>,
}

/// `notes.txt.gz` is `text/plain` encoded with `gzip`. When the inner name
/// has no known type the compressed file is served as itself, unencoded.
pub fn guess(path: &Path) -> Guess {
    let encoding = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| ENCODINGS.iter().find(|(suffix, _)| *suffix == ext))
        .map(|(_, encoding)| *encoding);

    if let Some(encoding) = encoding
        && let Some(inner) = mime_guess::from_path(path.with_extension("")).first()
    {
        return Guess {
            content_type: inner.to_string(),
            encoding: Some(encoding),
        };
    }

    Guess {
        content_type: mime_guess::from_path(path)
            .first()
            .map_or_else(|| OCTET_STREAM.to_string(), |m| m.to_string()),
        encoding: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_types() {
        let css = guess(Path::new("/srv/style.css"));
        assert_eq!(css.content_type, "text/css");
        assert_eq!(css.encoding, None);

        assert_eq!(guess(Path::new("logo.png")).content_type, "image/png");
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        let unknown = guess(Path::new("blob.zzzunknown"));
        assert_eq!(unknown.content_type, OCTET_STREAM);
        assert_eq!(unknown.encoding, None);

        assert_eq!(guess(Path::new("Makefile")).content_type, OCTET_STREAM);
    }

    #[test]
    fn compression_suffix_becomes_encoding() {
        let tarball = guess(Path::new("release.tar.gz"));
        assert_eq!(tarball.content_type, "application/x-tar");
        assert_eq!(tarball.encoding, Some("gzip"));

        let text = guess(Path::new("notes.txt.bz2"));
        assert_eq!(text.content_type, "text/plain");
        assert_eq!(text.encoding, Some("bzip2"));
    }

    #[test]
    fn bare_compressed_file_is_not_encoded() {
        let gz = guess(Path::new("dump.gz"));
        assert_eq!(gz.encoding, None);
        assert_ne!(gz.content_type, "text/plain");
    }
}
