//! Path utilities
//!
//! Every path is treated as absolute: a leading `/` is assumed, `.` is
//! dropped, `..` pops a component (never above the root) and empty
//! components from doubled or trailing separators are ignored.

/// Split a path into its normalized components.
///
/// `"/a/b/../c"` gives `["a", "c"]`; `"/"`, `"//"` and `"../"` give `[]`.
pub fn split_path(path: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            _ => parts.push(part),
        }
    }
    parts
}

/// Normalize a path to its absolute, clean string form.
pub fn clean_path(path: &str) -> String {
    let parts = split_path(path);
    if parts.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", parts.join("/"))
    }
}

/// Join a clean directory path and a single name.
pub fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{}{}", dir, name)
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Extension of the last path element, including the dot.
///
/// Empty when the last element has no dot.
pub fn extension(path: &str) -> &str {
    let base = match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    };
    match base.rfind('.') {
        Some(pos) => &base[pos..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_path() {
        let cases: &[(&str, &[&str])] = &[
            ("/", &[]),
            ("//", &[]),
            ("../", &[]),
            ("", &[]),
            ("/a", &["a"]),
            ("/a/b", &["a", "b"]),
            ("/a/b/", &["a", "b"]),
            ("/a/b/../c", &["a", "c"]),
            ("/a/./b/c.ext", &["a", "b", "c.ext"]),
            ("//a/b", &["a", "b"]),
            ("../../a/b", &["a", "b"]),
            ("a/b", &["a", "b"]),
        ];
        for (input, expected) in cases {
            assert_eq!(split_path(input), *expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_split_path_idempotent() {
        for input in ["/a/b/../c", "//x//y/", "../../q", "a/./b"] {
            let once = clean_path(input);
            assert_eq!(split_path(&once), split_path(input));
            assert_eq!(clean_path(&once), once);
        }
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), "/");
        assert_eq!(clean_path("/../.."), "/");
        assert_eq!(clean_path("foo/bar/"), "/foo/bar");
        assert_eq!(clean_path("/foo/../bar"), "/bar");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("/", "a.js"), "/a.js");
        assert_eq!(join("/sub", "a.js"), "/sub/a.js");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/a/b.js"), ".js");
        assert_eq!(extension("b.min.js"), ".js");
        assert_eq!(extension("/dir.d/Makefile"), "");
        assert_eq!(extension("/x.JS"), ".JS");
    }
}
