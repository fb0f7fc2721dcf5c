//! Glob matching with Redis `KEYS` semantics.
//!
//! Supports `*`, `?`, bracket classes (`[abc]`, `[^a]`, `[a-z]`) and `\`
//! escapes. Matching works on chars, not bytes.

/// Returns whether `text` matches the glob `pattern`.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    // backtrack point for the most recent `*`
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        let step = if p < pattern.len() {
            match pattern[p] {
                '*' => {
                    star = Some((p, t));
                    p += 1;
                    continue;
                }
                '?' => Some(p + 1),
                '[' => match_class(pattern, p, text[t]),
                '\\' if p + 1 < pattern.len() => (pattern[p + 1] == text[t]).then_some(p + 2),
                c => (c == text[t]).then_some(p + 1),
            }
        } else {
            None
        };

        match step {
            Some(next) => {
                p = next;
                t += 1;
            }
            None => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Matches `c` against the class opening at `pattern[open]`, returning the
/// index just past the closing `]`. An unterminated class matches up to the
/// end of the pattern, as Redis does.
fn match_class(pattern: &[char], open: usize, c: char) -> Option<usize> {
    let mut i = open + 1;
    let negate = pattern.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < pattern.len() && pattern[i] != ']' {
        if pattern[i] == '\\' && i + 1 < pattern.len() {
            matched |= pattern[i + 1] == c;
            i += 2;
        } else if i + 2 < pattern.len() && pattern[i + 1] == '-' && pattern[i + 2] != ']' {
            let (lo, hi) = if pattern[i] <= pattern[i + 2] {
                (pattern[i], pattern[i + 2])
            } else {
                (pattern[i + 2], pattern[i])
            };
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= pattern[i] == c;
            i += 1;
        }
    }

    let end = if i < pattern.len() { i + 1 } else { i };
    (matched != negate).then_some(end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_wildcards() {
        assert!(glob_match("key", "key"));
        assert!(!glob_match("key", "key2"));
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("test_key_unique_*", "test_key_unique_7"));
        assert!(!glob_match("test_key_unique_*", "test_key_7"));
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
        assert!(glob_match("*llo", "hello"));
        assert!(glob_match("h*l*o", "heeelllo"));
        assert!(!glob_match("h*l*x", "heeelllo"));
    }

    #[test]
    fn test_classes() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("h[a-c]llo", "hbllo"));
        assert!(glob_match("h[c-a]llo", "hbllo"));
        assert!(!glob_match("h[a-c]llo", "hdllo"));
    }

    #[test]
    fn test_escapes() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
        assert!(glob_match("req_users\\?page=*", "req_users?page=2"));
    }
}
