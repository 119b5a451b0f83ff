//! Glob-style path pattern matching.
//!
//! Patterns are `/`-delimited sequences of literal and wildcard segments:
//!
//! - `?` matches exactly one character within a segment
//! - `*` matches zero or more characters within a segment
//! - `**` matches zero or more whole segments
//! - `{name}` matches exactly one segment and captures it as a variable
//!
//! Matching is segment-wise with backtracking only inside a segment (for
//! `*`) and across the segment groups delimited by `**`. The specificity
//! comparator ranks patterns for one concrete path: exact match first, then
//! fewer wildcards, then longer literal text. It is a strict weak ordering;
//! ties are reported as `Equal` and must be resolved by the caller.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Whether the string contains pattern syntax (`*`, `?`, or `{var}`).
#[must_use]
pub fn is_pattern(path: &str) -> bool {
    path.contains('*') || path.contains('?') || path.contains('{')
}

/// Match `path` against `pattern`.
#[must_use]
pub fn matches(pattern: &str, path: &str) -> bool {
    do_match(pattern, path, None)
}

/// Match and extract `{name}` template variables.
///
/// Returns `None` when the path does not match the pattern; an empty map
/// when it matches a pattern without variables.
#[must_use]
pub fn extract_variables(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let mut vars = HashMap::new();
    if do_match(pattern, path, Some(&mut vars)) {
        Some(vars)
    } else {
        None
    }
}

/// Compare two patterns by specificity for the given request path.
///
/// A more specific pattern sorts `Less` (first). The ordering is strict
/// weak: `Equal` means genuinely tied, never "arbitrary".
#[must_use]
pub fn compare(a: &str, b: &str, path: &str) -> Ordering {
    let info_a = PatternInfo::new(a);
    let info_b = PatternInfo::new(b);

    match (info_a.least_specific, info_b.least_specific) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    match (a == path, b == path) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    // A "/**" suffix makes a prefix pattern; between two of those the longer
    // literal prefix wins, and either loses to a pattern without catch-alls.
    if info_a.prefix_pattern && info_b.prefix_pattern {
        return info_b.length.cmp(&info_a.length);
    }
    if info_a.prefix_pattern && info_b.double_wildcards == 0 {
        return Ordering::Greater;
    }
    if info_b.prefix_pattern && info_a.double_wildcards == 0 {
        return Ordering::Less;
    }

    info_a
        .total_count()
        .cmp(&info_b.total_count())
        .then_with(|| info_b.length.cmp(&info_a.length))
        .then_with(|| info_a.single_wildcards.cmp(&info_b.single_wildcards))
        .then_with(|| info_a.uri_vars.cmp(&info_b.uri_vars))
}

fn segments(s: &str) -> Vec<&str> {
    s.split('/').filter(|seg| !seg.is_empty()).collect()
}

/// Segment-wise match; `vars` collects `{name}` captures when present.
///
/// Captures written during a failed backtracking attempt are overwritten by
/// the attempt that succeeds, and the whole map is discarded on failure.
fn do_match(pattern: &str, path: &str, mut vars: Option<&mut HashMap<String, String>>) -> bool {
    if pattern.starts_with('/') != path.starts_with('/') {
        return false;
    }

    let patt = segments(pattern);
    let dirs = segments(path);

    let mut patt_start: isize = 0;
    let mut patt_end: isize = patt.len() as isize - 1;
    let mut path_start: isize = 0;
    let mut path_end: isize = dirs.len() as isize - 1;

    // Front scan up to the first `**`.
    while patt_start <= patt_end && path_start <= path_end {
        let patt_dir = patt[patt_start as usize];
        if patt_dir == "**" {
            break;
        }
        if !match_segment(patt_dir, dirs[path_start as usize], vars.as_deref_mut()) {
            return false;
        }
        patt_start += 1;
        path_start += 1;
    }

    if path_start > path_end {
        // Path exhausted: the rest of the pattern must be all `**`.
        return patt[patt_start.max(0) as usize..(patt_end + 1).max(0) as usize]
            .iter()
            .all(|seg| *seg == "**");
    }
    if patt_start > patt_end {
        return false;
    }

    // Back scan up to the last `**`.
    while patt_start <= patt_end && path_start <= path_end {
        let patt_dir = patt[patt_end as usize];
        if patt_dir == "**" {
            break;
        }
        if !match_segment(patt_dir, dirs[path_end as usize], vars.as_deref_mut()) {
            return false;
        }
        patt_end -= 1;
        path_end -= 1;
    }
    if path_start > path_end {
        return patt[patt_start as usize..=patt_end as usize]
            .iter()
            .all(|seg| *seg == "**");
    }

    // Middle: slide each fixed group between `**` tokens along the path.
    while patt_start != patt_end && path_start <= path_end {
        let mut next_double: isize = -1;
        for i in (patt_start + 1)..=patt_end {
            if patt[i as usize] == "**" {
                next_double = i;
                break;
            }
        }
        if next_double == patt_start + 1 {
            // `**/**`: collapse
            patt_start += 1;
            continue;
        }
        let group_len = next_double - patt_start - 1;
        let span = path_end - path_start + 1;
        if group_len > span {
            return false;
        }
        let mut found: isize = -1;
        'slide: for i in 0..=(span - group_len) {
            for j in 0..group_len {
                let patt_dir = patt[(patt_start + 1 + j) as usize];
                let path_dir = dirs[(path_start + i + j) as usize];
                if !match_segment(patt_dir, path_dir, vars.as_deref_mut()) {
                    continue 'slide;
                }
            }
            found = path_start + i;
            break;
        }
        if found == -1 {
            return false;
        }
        patt_start = next_double;
        path_start = found + group_len;
    }

    patt[patt_start as usize..=patt_end as usize]
        .iter()
        .all(|seg| *seg == "**")
}

/// Match one pattern segment against one path segment.
fn match_segment(patt: &str, path: &str, vars: Option<&mut HashMap<String, String>>) -> bool {
    if let Some(name) = template_var(patt) {
        if let Some(vars) = vars {
            vars.insert(name.to_string(), path.to_string());
        }
        return true;
    }
    glob_match(patt, path)
}

/// `{name}` when the segment is a whole-segment template variable.
fn template_var(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .filter(|name| !name.is_empty() && !name.contains('{'))
}

/// Character-level glob within one segment: `?` one char, `*` zero or more.
fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut mark = 0usize;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(sp) = star {
            pi = sp + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Wildcard accounting for the specificity comparator.
struct PatternInfo {
    uri_vars: usize,
    single_wildcards: usize,
    double_wildcards: usize,
    /// Ends with `/**` without being just `/**`.
    prefix_pattern: bool,
    /// Empty or the universal `/**`.
    least_specific: bool,
    /// Pattern length with each `{var}` counted as one character.
    length: usize,
}

impl PatternInfo {
    fn new(pattern: &str) -> Self {
        let mut uri_vars = 0;
        let mut single_wildcards = 0;
        let mut double_wildcards = 0;
        let mut length = 0;

        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    uri_vars += 1;
                    length += 1;
                    for inner in chars.by_ref() {
                        if inner == '}' {
                            break;
                        }
                    }
                }
                '?' => {
                    single_wildcards += 1;
                    length += 1;
                }
                '*' => {
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        double_wildcards += 1;
                        length += 2;
                    } else {
                        single_wildcards += 1;
                        length += 1;
                    }
                }
                _ => length += 1,
            }
        }

        let catch_all = pattern == "/**";
        Self {
            uri_vars,
            single_wildcards,
            double_wildcards,
            prefix_pattern: !catch_all && pattern.ends_with("/**"),
            least_specific: pattern.is_empty() || catch_all,
            length,
        }
    }

    fn total_count(&self) -> usize {
        self.uri_vars + self.single_wildcards + 2 * self.double_wildcards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_pattern() {
        assert!(is_pattern("/users/*"));
        assert!(is_pattern("/users/{id}"));
        assert!(is_pattern("/file?.txt"));
        assert!(!is_pattern("/users/all"));
    }

    #[test]
    fn test_literal_match() {
        assert!(matches("/users/all", "/users/all"));
        assert!(!matches("/users/all", "/users/some"));
        assert!(!matches("/users", "/users/all"));
    }

    #[test]
    fn test_question_mark_one_char() {
        assert!(matches("/t?st", "/test"));
        assert!(matches("/t?st", "/tast"));
        assert!(!matches("/t?st", "/tst"));
        assert!(!matches("/t?st", "/toast"));
    }

    #[test]
    fn test_star_within_segment() {
        assert!(matches("/items/*", "/items/new"));
        assert!(matches("/items/*.txt", "/items/a.txt"));
        assert!(matches("/*.txt", "/.txt"));
        assert!(!matches("/items/*", "/items/new/sub"));
        assert!(!matches("/items/*", "/items"));
    }

    #[test]
    fn test_double_star_across_segments() {
        assert!(matches("/api/**", "/api"));
        assert!(matches("/api/**", "/api/v1/users"));
        assert!(matches("/**/users", "/api/v1/users"));
        assert!(matches("/a/**/z", "/a/z"));
        assert!(matches("/a/**/z", "/a/b/c/z"));
        assert!(!matches("/a/**/z", "/a/b/c"));
    }

    #[test]
    fn test_mixed_wildcards() {
        assert!(matches("/**/*.html", "/docs/index.html"));
        assert!(matches("/api/*/detail/**", "/api/users/detail/42/info"));
        assert!(!matches("/api/*/detail/**", "/api/users/summary"));
    }

    #[test]
    fn test_leading_slash_must_agree() {
        assert!(!matches("/users", "users"));
        assert!(matches("users/*", "users/all"));
    }

    #[test]
    fn test_extract_single_variable() {
        let vars = extract_variables("/user/{id}", "/user/42").unwrap();
        assert_eq!(vars.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_extract_multiple_variables() {
        let vars = extract_variables("/orders/{order}/items/{item}", "/orders/7/items/3").unwrap();
        assert_eq!(vars.get("order").map(String::as_str), Some("7"));
        assert_eq!(vars.get("item").map(String::as_str), Some("3"));
    }

    #[test]
    fn test_extract_no_match_is_none() {
        assert!(extract_variables("/user/{id}", "/account/42").is_none());
    }

    #[test]
    fn test_extract_without_variables_is_empty() {
        let vars = extract_variables("/users/*", "/users/any").unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn test_variable_with_double_star() {
        let vars = extract_variables("/files/{name}/**", "/files/report/2024/q1").unwrap();
        assert_eq!(vars.get("name").map(String::as_str), Some("report"));
    }

    #[test]
    fn test_compare_exact_beats_wildcard() {
        assert_eq!(
            compare("/items/new", "/items/*", "/items/new"),
            Ordering::Less
        );
        assert_eq!(
            compare("/items/*", "/items/new", "/items/new"),
            Ordering::Greater
        );
    }

    #[test]
    fn test_compare_fewer_wildcards_first() {
        assert_eq!(
            compare("/users/{id}", "/users/*", "/users/42"),
            Ordering::Less
        );
        assert_eq!(compare("/a/*/*", "/a/*/b", "/a/x/b"), Ordering::Greater);
    }

    #[test]
    fn test_compare_catch_all_last() {
        assert_eq!(compare("/**", "/api/**", "/api/x"), Ordering::Greater);
        assert_eq!(compare("/api/{v}", "/api/**", "/api/x"), Ordering::Less);
    }

    #[test]
    fn test_compare_longer_prefix_pattern_first() {
        assert_eq!(
            compare("/api/v1/**", "/api/**", "/api/v1/users"),
            Ordering::Less
        );
    }

    #[test]
    fn test_compare_is_tied_for_identical_shape() {
        assert_eq!(compare("/a/{x}", "/a/{y}", "/a/1"), Ordering::Equal);
    }

    #[test]
    fn test_glob_backtracking() {
        assert!(glob_match("a*b*c", "axxbyyc"));
        assert!(glob_match("a*b*c", "abc"));
        assert!(!glob_match("a*b*c", "axxbyy"));
        assert!(glob_match("*", ""));
    }
}
