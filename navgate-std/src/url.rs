//! URL helpers shared by backends and matchers.

use navgate_core::Query;

/// Normalize a base path: leading slash, no trailing slash, origin stripped.
///
/// An empty or missing base normalizes to the empty string (the root).
pub fn normalize_base(base: Option<&str>) -> String {
    let base = base.unwrap_or("/");
    let base = strip_origin(base);
    let mut normalized = if base.starts_with('/') {
        base.to_string()
    } else {
        format!("/{base}")
    };
    if normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn strip_origin(base: &str) -> &str {
    for scheme in ["http://", "https://"] {
        if let Some(rest) = base.strip_prefix(scheme) {
            return rest.find('/').map_or("", |idx| &rest[idx..]);
        }
    }
    base
}

/// Collapse repeated slashes.
pub fn clean_path(path: &str) -> String {
    let mut cleaned = String::with_capacity(path.len());
    let mut prev_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if prev_slash {
                continue;
            }
            prev_slash = true;
        } else {
            prev_slash = false;
        }
        cleaned.push(ch);
    }
    cleaned
}

/// Strip `base` from the path part of `url`, yielding the app-relative location.
///
/// The comparison ignores ASCII case and only strips whole segments: base
/// `/a` leaves `/app` untouched.
pub fn strip_base(base: &str, url: &str) -> String {
    let (path, rest) = match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let mut path = path;
    if !base.is_empty() {
        let head_matches = path
            .get(..base.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(base));
        if head_matches && matches!(path[base.len()..].chars().next(), None | Some('/')) {
            path = &path[base.len()..];
        }
    }
    let path = if path.is_empty() { "/" } else { path };
    format!("{path}{rest}")
}

/// Split a location into `(path, query, hash)`; the hash keeps its `#`.
pub fn split_path(location: &str) -> (&str, &str, &str) {
    let (rest, hash) = match location.find('#') {
        Some(idx) => location.split_at(idx),
        None => (location, ""),
    };
    let (path, query) = match rest.find('?') {
        Some(idx) => (&rest[..idx], &rest[idx + 1..]),
        None => (rest, ""),
    };
    (path, query, hash)
}

/// Parse `a=1&b` into a query mapping. A leading `?` is ignored.
pub fn parse_query(query: &str) -> Query {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) => (key.to_string(), value.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Render a query mapping, including the leading `?` when non-empty.
pub fn stringify_query(query: &Query) -> String {
    if query.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = query
        .iter()
        .map(|(key, value)| {
            if value.is_empty() {
                key.clone()
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    format!("?{}", pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base() {
        assert_eq!(normalize_base(None), "");
        assert_eq!(normalize_base(Some("/")), "");
        assert_eq!(normalize_base(Some("app/")), "/app");
        assert_eq!(normalize_base(Some("https://example.com/app/")), "/app");
        assert_eq!(normalize_base(Some("http://example.com")), "");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path("/app//foo///bar"), "/app/foo/bar");
        assert_eq!(clean_path("/"), "/");
    }

    #[test]
    fn test_strip_base_keeps_similar_prefix() {
        assert_eq!(strip_base("/a", "/app"), "/app");
        assert_eq!(strip_base("/a", "/a/pp?x=1#h"), "/pp?x=1#h");
        assert_eq!(strip_base("/A", "/a"), "/");
        assert_eq!(strip_base("", "/foo#bar"), "/foo#bar");
    }

    #[test]
    fn test_strip_base_non_ascii() {
        assert_eq!(strip_base("/café", "/CAFé/menu"), "/menu");
        // Lowercasing `İ` changes its byte length; the base must not match.
        assert_eq!(strip_base("/İ", "/i\u{307}/x"), "/i\u{307}/x");
        assert_eq!(strip_base("/日本", "/日"), "/日");
    }

    #[test]
    fn test_split_and_query() {
        assert_eq!(split_path("/a?x=1&y#top"), ("/a", "x=1&y", "#top"));
        assert_eq!(split_path("/a#top?x"), ("/a", "", "#top?x"));

        let query = parse_query("?x=1&y");
        assert_eq!(query.get("x").map(String::as_str), Some("1"));
        assert_eq!(query.get("y").map(String::as_str), Some(""));
        assert_eq!(stringify_query(&query), "?x=1&y");
        assert_eq!(stringify_query(&Query::new()), "");
    }
}
