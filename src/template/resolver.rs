//! Variable resolution for HTML and fragment text.
//!
//! Substitutes `%PREFIX_NAME%` tokens from the environment map in three
//! passes with strict precedence:
//!
//! 1. composite URL placeholders (`FULL_URL`, `FULL_IMAGE_URL`) - these
//!    derive from several keys and must not be shadowed by generic
//!    substitution,
//! 2. page-scoped variables (`%PREFIX_PAGE_NAME%`, the literal `PAGE`
//!    marker swapped for the page identity when building the lookup key),
//! 3. global variables (`%PREFIX_NAME%`).
//!
//! Unknown keys leave the token untouched. Partial configuration never
//! breaks a build; a misconfigured key ships literal placeholder text,
//! which is caught in output review, not at runtime.

use crate::env::EnvMap;
use crate::template::url;
use regex::{Captures, Regex};

/// Pure text substitution over one environment map and prefix.
///
/// Built once per build and shared read-only across parallel transforms.
pub struct Resolver {
    env: EnvMap,
    prefix: String,
    page_re: Regex,
    global_re: Regex,
    full_url_token: String,
    full_image_token: String,
}

impl Resolver {
    pub fn new(env: EnvMap, prefix: &str) -> Self {
        // The name segment is word characters only, so `%` inside values
        // can never read as a nested placeholder. The prefix is escaped,
        // making both patterns valid for any configured prefix.
        let escaped = regex::escape(prefix);
        let page_re = Regex::new(&format!("%{escaped}_PAGE_(\\w+)%")).unwrap();
        let global_re = Regex::new(&format!("%{escaped}_(\\w+)%")).unwrap();

        Self {
            env,
            prefix: prefix.to_string(),
            page_re,
            global_re,
            full_url_token: format!("%{prefix}_FULL_URL%"),
            full_image_token: format!("%{prefix}_FULL_IMAGE_URL%"),
        }
    }

    /// Resolve every placeholder in `content` for the given page identity.
    ///
    /// Pure text transform; idempotent on already-resolved content.
    pub fn resolve(&self, content: &str, page: &str) -> String {
        let content = self.resolve_composites(content, page);

        let content = self.page_re.replace_all(&content, |caps: &Captures| {
            let key = format!("{}_{}_{}", self.prefix, page, &caps[1]);
            match self.env.get(&key) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        });

        let content = self.global_re.replace_all(&content, |caps: &Captures| {
            let key = format!("{}_{}", self.prefix, &caps[1]);
            match self.env.get(&key) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        });

        content.into_owned()
    }

    /// Substitute the canonical and OG-image URL placeholders.
    ///
    /// Missing underlying keys default to empty segments inside the URL
    /// builder, so the composite always resolves to something well-formed.
    fn resolve_composites(&self, content: &str, page: &str) -> String {
        if !content.contains(&self.full_url_token) && !content.contains(&self.full_image_token) {
            return content.to_string();
        }

        let base = self.lookup_global("BASE_URL");
        let canonical = self.lookup_scoped(page, "CANONICAL");
        let image = self.lookup_scoped(page, "OG_IMAGE");

        content
            .replace(&self.full_url_token, &url::canonical_url(base, canonical))
            .replace(&self.full_image_token, &url::image_url(base, image))
    }

    fn lookup_global(&self, name: &str) -> &str {
        self.env
            .get(&format!("{}_{name}", self.prefix))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn lookup_scoped(&self, page: &str, name: &str) -> &str {
        self.env
            .get(&format!("{}_{page}_{name}", self.prefix))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&str, &str)]) -> Resolver {
        let env = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Resolver::new(env, "SITE")
    }

    #[test]
    fn test_global_substitution() {
        let r = resolver(&[("SITE_TITLE", "My Site")]);
        assert_eq!(r.resolve("<title>%SITE_TITLE%</title>", "HOME"), "<title>My Site</title>");
    }

    #[test]
    fn test_page_scoped_substitution() {
        let r = resolver(&[("SITE_OVEN_TITLE", "Oven Interface")]);
        assert_eq!(r.resolve("%SITE_PAGE_TITLE%", "OVEN"), "Oven Interface");
    }

    #[test]
    fn test_page_scope_shadows_global() {
        let r = resolver(&[
            ("SITE_OVEN_TITLE", "Oven Interface"),
            ("SITE_TITLE", "Global Title"),
        ]);
        // Page key present: page scope wins.
        assert_eq!(r.resolve("%SITE_PAGE_TITLE%", "OVEN"), "Oven Interface");
        // Global placeholder is untouched by page scope.
        assert_eq!(r.resolve("%SITE_TITLE%", "OVEN"), "Global Title");
    }

    #[test]
    fn test_unknown_key_left_verbatim() {
        let r = resolver(&[]);
        let input = "before %SITE_MISSING% and %SITE_PAGE_MISSING% after";
        assert_eq!(r.resolve(input, "HOME"), input);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let r = resolver(&[("SITE_TITLE", "My Site"), ("SITE_BASE_URL", "https://x.dev")]);
        let once = r.resolve("%SITE_TITLE% at %SITE_FULL_URL% (%SITE_MISSING%)", "HOME");
        let twice = r.resolve(&once, "HOME");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_percent_in_value_is_not_reparsed() {
        let r = resolver(&[("SITE_DISCOUNT", "50% off"), ("SITE_OFF", "nope")]);
        assert_eq!(r.resolve("%SITE_DISCOUNT%", "HOME"), "50% off");
    }

    #[test]
    fn test_full_url_composite() {
        let r = resolver(&[
            ("SITE_BASE_URL", "https://example.com/site"),
            ("SITE_OVEN_CANONICAL", "oven-interface/"),
        ]);
        assert_eq!(
            r.resolve("%SITE_FULL_URL%", "OVEN"),
            "https://example.com/site/oven-interface/"
        );
    }

    #[test]
    fn test_full_url_home_has_no_trailing_slash() {
        let r = resolver(&[("SITE_BASE_URL", "https://example.com/site")]);
        assert_eq!(r.resolve("%SITE_FULL_URL%", "HOME"), "https://example.com/site");
    }

    #[test]
    fn test_full_image_url_composite() {
        let r = resolver(&[
            ("SITE_BASE_URL", "https://example.com"),
            ("SITE_HOME_OG_IMAGE", "images/og.png"),
        ]);
        assert_eq!(
            r.resolve("%SITE_FULL_IMAGE_URL%", "HOME"),
            "https://example.com/images/og.png"
        );
    }

    #[test]
    fn test_composite_resolved_before_global_pass() {
        // SITE_FULL_URL also matches the global pattern; the composite
        // stage must claim it even when a key of that name exists.
        let r = resolver(&[
            ("SITE_BASE_URL", "https://example.com"),
            ("SITE_FULL_URL", "should-not-win"),
        ]);
        assert_eq!(r.resolve("%SITE_FULL_URL%", "HOME"), "https://example.com");
    }

    #[test]
    fn test_custom_prefix() {
        let env = [("APP_TITLE".to_string(), "App Site".to_string())]
            .into_iter()
            .collect();
        let r = Resolver::new(env, "APP");
        assert_eq!(r.resolve("%APP_TITLE%", "HOME"), "App Site");
        // Foreign prefixes pass through.
        assert_eq!(r.resolve("%SITE_TITLE%", "HOME"), "%SITE_TITLE%");
    }
}
