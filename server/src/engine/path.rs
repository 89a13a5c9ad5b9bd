/*
 * This file is part of nsd.
 *
 * nsd is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Pure path splitting. A trailing slash is stripped before splitting, so
//! `a/x` and `a/x/` split identically; a leading slash is tolerated on any
//! input and does not affect `depth` (only internal separators count).

/// `split("/a/b/c")` -> `(parent: "/a/b", child: "c", depth: 2)`.
/// `split("a")` -> `(parent: "", child: "a", depth: 0)`.
pub fn split(path: &str) -> (String, String, usize) {
    let trimmed = path.strip_suffix('/').unwrap_or(path);
    // a sole leading slash denotes root and carries no separator of its own
    let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
    match body.rfind('/') {
        None => (String::new(), body.to_owned(), 0),
        Some(last) => {
            let depth = body.matches('/').count();
            let parent = &trimmed[..trimmed.len() - (body.len() - last)];
            (parent.to_owned(), body[last + 1..].to_owned(), depth)
        }
    }
}

/// Split a path into its non-empty `/`-delimited components, tolerant of
/// leading/trailing slashes. `components("")` and `components("/")` are both
/// empty -- they denote the root itself.
pub fn components(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// `true` if `descendant` names `ancestor` itself or a path nested under it.
/// Used to reject a move that would place a directory inside its own
/// subtree.
pub fn is_same_or_descendant(ancestor: &str, descendant: &str) -> bool {
    let a = ancestor.strip_suffix('/').unwrap_or(ancestor);
    let d = descendant.strip_suffix('/').unwrap_or(descendant);
    d == a || d.starts_with(&format!("{a}/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_ignores_leading_trailing_slashes() {
        assert_eq!(components("/a/b/c"), vec!["a", "b", "c"]);
        assert_eq!(components("a/b/c/"), vec!["a", "b", "c"]);
        assert!(components("").is_empty());
        assert!(components("/").is_empty());
    }

    #[test]
    fn descendant_check_matches_self_and_nested_paths() {
        assert!(is_same_or_descendant("/a", "/a"));
        assert!(is_same_or_descendant("/a", "/a/b"));
        assert!(!is_same_or_descendant("/a", "/ab"));
        assert!(!is_same_or_descendant("/a/b", "/a"));
    }

    #[test]
    fn no_separator_is_root_child() {
        assert_eq!(split("a"), (String::new(), "a".into(), 0));
        assert_eq!(split("/a"), (String::new(), "a".into(), 0));
    }

    #[test]
    fn trailing_slash_is_ignored() {
        assert_eq!(split("a/x"), split("a/x/"));
        assert_eq!(split("/a/x/"), ("/a".into(), "x".into(), 1));
    }

    #[test]
    fn depth_counts_internal_separators() {
        assert_eq!(split("/a/b/c"), ("/a/b".into(), "c".into(), 2));
        assert_eq!(split("a/b/c/d"), ("a/b/c".into(), "d".into(), 3));
    }

    #[test]
    fn empty_parent_denotes_root() {
        let (parent, child, depth) = split("x");
        assert_eq!(parent, "");
        assert_eq!(child, "x");
        assert_eq!(depth, 0);
    }
}
