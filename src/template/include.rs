//! Include fragment expansion.
//!
//! Splices shared HTML fragments into a parent document wherever a
//! `<!-- @include path -->` directive appears.

use crate::log;
use crate::template::resolver::Resolver;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// `<!-- @include templates/head.html -->`
static RE_INCLUDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!-- @include (.+?) -->").unwrap());

/// Expand every include directive in `html` in one left-to-right pass.
///
/// Each fragment is read relative to `root` and run through the resolver
/// with the parent document's page identity before splicing. Fragments are
/// not scanned for further directives; a nested `@include` survives
/// literally in the output. A missing or unreadable fragment leaves the
/// directive in place and logs a warning naming the path.
pub fn expand_includes(html: &str, root: &Path, resolver: &Resolver, page: &str) -> String {
    RE_INCLUDE
        .replace_all(html, |caps: &Captures| {
            let rel = caps[1].trim();
            let path = root.join(rel);

            if !path.exists() {
                log!("warn"; "include not found: {}", path.display());
                return caps[0].to_string();
            }

            match fs::read_to_string(&path) {
                Ok(fragment) => resolver.resolve(&fragment, page),
                Err(err) => {
                    log!("warn"; "include unreadable `{}`: {err}", path.display());
                    caps[0].to_string()
                }
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvMap;
    use tempfile::TempDir;

    fn resolver(pairs: &[(&str, &str)]) -> Resolver {
        let env: EnvMap = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Resolver::new(env, "SITE")
    }

    #[test]
    fn test_expand_splices_fragment() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("head.html"), "<meta charset=\"utf-8\">").unwrap();

        let r = resolver(&[]);
        let out = expand_includes("<head><!-- @include head.html --></head>", dir.path(), &r, "HOME");
        assert_eq!(out, "<head><meta charset=\"utf-8\"></head>");
    }

    #[test]
    fn test_fragment_variables_use_parent_page_identity() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("head.html"), "<title>%SITE_PAGE_TITLE%</title>").unwrap();

        let r = resolver(&[("SITE_OVEN_TITLE", "Oven Interface")]);
        let out = expand_includes("<!-- @include head.html -->", dir.path(), &r, "OVEN");
        assert_eq!(out, "<title>Oven Interface</title>");
    }

    #[test]
    fn test_missing_fragment_leaves_directive_verbatim() {
        let dir = TempDir::new().unwrap();
        let input = "<head><!-- @include missing.html --></head>";

        let r = resolver(&[]);
        let out = expand_includes(input, dir.path(), &r, "HOME");
        assert_eq!(out, input);
    }

    #[test]
    fn test_expansion_is_not_recursive() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("outer.html"),
            "outer <!-- @include inner.html -->",
        )
        .unwrap();
        fs::write(dir.path().join("inner.html"), "inner").unwrap();

        let r = resolver(&[]);
        let out = expand_includes("<!-- @include outer.html -->", dir.path(), &r, "HOME");
        // The inner directive came from a fragment and must appear literally.
        assert_eq!(out, "outer <!-- @include inner.html -->");
    }

    #[test]
    fn test_multiple_directives_preserve_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.html"), "A").unwrap();
        fs::write(dir.path().join("b.html"), "B").unwrap();

        let r = resolver(&[]);
        let out = expand_includes(
            "<!-- @include a.html -->|<!-- @include b.html -->|<!-- @include a.html -->",
            dir.path(),
            &r,
            "HOME",
        );
        assert_eq!(out, "A|B|A");
    }

    #[test]
    fn test_directive_path_is_trimmed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("head.html"), "ok").unwrap();

        let r = resolver(&[]);
        let out = expand_includes("<!-- @include  head.html  -->", dir.path(), &r, "HOME");
        assert_eq!(out, "ok");
    }
}
