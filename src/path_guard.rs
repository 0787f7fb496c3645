use std::path::{Component, Path, PathBuf};

use crate::error::ResolveError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    /// Canonical, root-relative, no leading slash. Empty for the root.
    pub relative: String,
}

pub fn normalize_request_path(value: &str) -> String {
    value
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn is_hidden(relative: &str) -> bool {
    relative.split('/').any(|segment| {
        segment.starts_with('.') && segment != "." && segment != ".."
    })
}

pub fn strip_root_prefix(path: &Path, prefix: &Path) -> Result<String, ResolveError> {
    let rest = path
        .strip_prefix(prefix)
        .map_err(|_| ResolveError::escape(path.display().to_string()))?;

    let mut segments = Vec::new();
    for component in rest.components() {
        match component {
            Component::Normal(c) => {
                let segment = c
                    .to_str()
                    .ok_or_else(|| ResolveError::not_found(path.display().to_string()))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ResolveError::escape(path.display().to_string()));
            }
        }
    }
    Ok(segments.join("/"))
}

/// Joins `relative` onto the canonical `root` and resolves it.
///
/// Both the path as requested and its canonical form must be free of hidden
/// segments; either failing reports [`ResolveError::NotFound`], the same as
/// an absent entry. Listing children come through here too.
pub fn locate(root: &Path, relative: &str) -> Result<Located, ResolveError> {
    if is_hidden(relative) {
        return Err(ResolveError::not_found(relative));
    }
    let path = root
        .join(relative)
        .canonicalize()
        .map_err(|_| ResolveError::not_found(relative))?;
    let relative_path = strip_root_prefix(&path, root)?;
    if is_hidden(&relative_path) {
        return Err(ResolveError::not_found(relative));
    }
    Ok(Located {
        path,
        relative: relative_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn normalizes_slashes() {
        assert_eq!(normalize_request_path("/foo//bar/baz.md/"), "foo/bar/baz.md");
        assert_eq!(normalize_request_path("/"), "");
        assert_eq!(normalize_request_path(""), "");
    }

    #[test]
    fn keeps_dot_segments_for_canonicalization() {
        assert_eq!(normalize_request_path("/a/../b/./c"), "a/../b/./c");
    }

    #[test]
    fn strips_prefix() {
        assert_eq!(
            strip_root_prefix(Path::new("/i/stumbled/out/of/bed"), Path::new("/i/stumbled"))
                .expect("prefix"),
            "out/of/bed"
        );
        assert_eq!(
            strip_root_prefix(
                Path::new("./i/got/ready/for/the/struggle"),
                Path::new("./i/got/ready/")
            )
            .expect("prefix"),
            "for/the/struggle"
        );
        assert_eq!(
            strip_root_prefix(Path::new("/srv/docs"), Path::new("/srv/docs")).expect("prefix"),
            ""
        );
    }

    #[test]
    fn strip_prefix_rejects_foreign_paths() {
        assert!(matches!(
            strip_root_prefix(Path::new("i/said/this/can"), Path::new("t/be/me")),
            Err(ResolveError::PathEscape(_))
        ));
        assert!(strip_root_prefix(Path::new("/srv/docs2/a"), Path::new("/srv/docs")).is_err());
    }

    #[test]
    fn hidden_segments() {
        assert!(!is_hidden(""));
        assert!(!is_hidden("/"));
        assert!(!is_hidden("."));
        assert!(!is_hidden("../."));
        assert!(!is_hidden("that/the/dice/are/loaded"));
        assert!(!is_hidden("/everybody/rolls/with.their/fingers.crossed"));
        assert!(!is_hidden("./the/good/../guys/lost."));
        assert!(!is_hidden("./the//fight/was/./fixed"));
        assert!(is_hidden("./the/poor/.stay/poor"));
        assert!(is_hidden("the/rich/get/.rich"));
        assert!(is_hidden("/that.s/how/it/.goes"));
        assert!(is_hidden(".everybody/knows"));
        assert!(is_hidden("..dots/first"));
    }

    #[test]
    fn locates_entries_below_root() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        std::fs::create_dir_all(root.join("sub")).expect("create sub");
        std::fs::write(root.join("sub/a.md"), "# A").expect("write file");

        let located = locate(&root, "sub/../sub/a.md").expect("located");
        assert_eq!(located.relative, "sub/a.md");
        assert_eq!(located.path, root.join("sub/a.md"));

        let top = locate(&root, "").expect("root");
        assert_eq!(top.relative, "");
    }

    #[test]
    fn rejects_parent_escape() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().join("root");
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::write(temp.path().join("secret.txt"), "x").expect("write file");
        let root = root.canonicalize().expect("canonical root");

        assert!(matches!(
            locate(&root, "../secret.txt"),
            Err(ResolveError::PathEscape(_))
        ));
        assert!(locate(&root, "../../../../etc/passwd").is_err());
    }

    #[test]
    fn absolute_override_escapes() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        let outside = tempfile::Builder::new()
            .prefix("outside")
            .tempdir()
            .expect("second temp dir");
        let file = outside.path().join("x.txt");
        std::fs::write(&file, "x").expect("write file");

        assert!(matches!(
            locate(&root, file.to_str().expect("utf-8 path")),
            Err(ResolveError::PathEscape(_))
        ));
    }

    #[test]
    fn hidden_and_missing_look_the_same() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        std::fs::create_dir_all(root.join(".git")).expect("create hidden dir");
        std::fs::write(root.join(".git/config"), "x").expect("write file");

        assert!(matches!(locate(&root, ".git/config"), Err(ResolveError::NotFound(_))));
        assert!(matches!(locate(&root, "nope.md"), Err(ResolveError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn symlink_into_hidden_dir_is_hidden() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        std::fs::create_dir_all(root.join(".private")).expect("create hidden dir");
        std::os::unix::fs::symlink(root.join(".private"), root.join("public"))
            .expect("symlink");

        assert!(matches!(locate(&root, "public"), Err(ResolveError::NotFound(_))));
    }

    #[test]
    fn hidden_segment_before_parent_dir_is_hidden() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        std::fs::create_dir_all(root.join(".cache")).expect("create hidden dir");
        std::fs::write(root.join("a.md"), "# A").expect("write file");

        assert!(locate(&root, "a.md").is_ok());
        assert!(matches!(
            locate(&root, ".cache/../a.md"),
            Err(ResolveError::NotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn dot_named_symlink_to_visible_target_is_hidden() {
        let temp = tempdir().expect("temp dir");
        let root = temp.path().canonicalize().expect("canonical root");
        std::fs::create_dir_all(root.join("docs")).expect("create dir");
        std::fs::write(root.join("docs/a.md"), "# A").expect("write file");
        std::os::unix::fs::symlink(root.join("docs"), root.join(".alias")).expect("symlink");

        assert!(matches!(locate(&root, ".alias"), Err(ResolveError::NotFound(_))));
        assert!(matches!(
            locate(&root, ".alias/a.md"),
            Err(ResolveError::NotFound(_))
        ));
    }
}
