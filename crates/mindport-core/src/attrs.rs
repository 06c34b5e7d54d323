use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::OnceLock;

fn double_quoted_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*"([^"]*)""#).expect("valid regex")
    })
}

fn single_quoted_attr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*'([^']*)'"#).expect("valid regex")
    })
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|(amp|lt|gt|quot|apos));")
            .expect("valid regex")
    })
}

/// Returns the decoded value of attribute `name` (ASCII case-insensitive) from an open tag's
/// attribute text. Double-quoted values are preferred over single-quoted ones.
pub fn get_attr(attrs: &str, name: &str) -> Option<String> {
    for re in [double_quoted_attr_regex(), single_quoted_attr_regex()] {
        let found = re
            .captures_iter(attrs)
            .find(|caps| caps[1].eq_ignore_ascii_case(name));
        if let Some(caps) = found {
            return Some(decode_entities(&caps[2]).into_owned());
        }
    }
    None
}

/// `Some(true)` for `"true"` (any case), `Some(false)` for any other value, `None` when the
/// attribute is missing.
pub fn get_flag(attrs: &str, name: &str) -> Option<bool> {
    get_attr(attrs, name).map(|v| v.trim().eq_ignore_ascii_case("true"))
}

/// Decodes `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;` and numeric character references.
///
/// Anything else (including references to invalid code points) is left untouched.
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }
    entity_regex().replace_all(input, |caps: &Captures<'_>| {
        let decoded = if let Some(hex) = caps.get(1) {
            u32::from_str_radix(hex.as_str(), 16)
                .ok()
                .and_then(char::from_u32)
        } else if let Some(dec) = caps.get(2) {
            dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match caps.get(3).map(|m| m.as_str()) {
                Some("amp") => Some('&'),
                Some("lt") => Some('<'),
                Some("gt") => Some('>'),
                Some("quot") => Some('"'),
                Some("apos") => Some('\''),
                _ => None,
            }
        };
        match decoded {
            Some(ch) => ch.to_string(),
            None => caps[0].to_string(),
        }
    })
}

/// Integer parse that accepts a leading numeric prefix (`"12px"` -> 12), mirroring how
/// exporters write sizes. Returns `None` when there are no leading digits.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_double_and_single_quoted_values() {
        let attrs = r#" TEXT="Hello" ID='ID_1' "#;
        assert_eq!(get_attr(attrs, "TEXT").as_deref(), Some("Hello"));
        assert_eq!(get_attr(attrs, "ID").as_deref(), Some("ID_1"));
        assert_eq!(get_attr(attrs, "LINK"), None);
    }

    #[test]
    fn attribute_names_are_case_insensitive() {
        let attrs = r#" text="lower" Position="left""#;
        assert_eq!(get_attr(attrs, "TEXT").as_deref(), Some("lower"));
        assert_eq!(get_attr(attrs, "position").as_deref(), Some("left"));
    }

    #[test]
    fn double_quoted_form_wins() {
        let attrs = r##" COLOR='#111111' COLOR="#222222""##;
        assert_eq!(get_attr(attrs, "COLOR").as_deref(), Some("#222222"));
    }

    #[test]
    fn name_must_match_whole_attribute() {
        let attrs = r#" MYTEXT="no" TEXT="yes""#;
        assert_eq!(get_attr(attrs, "TEXT").as_deref(), Some("yes"));
    }

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(
            decode_entities("a &amp; b &lt;c&gt; &quot;d&quot; &apos;e&apos;"),
            "a & b <c> \"d\" 'e'"
        );
        assert_eq!(decode_entities("&#233;t&#xE9; &#X41;"), "été A");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(decode_entities("&nbsp;&copy; &#xD800;"), "&nbsp;&copy; &#xD800;");
        assert!(matches!(decode_entities("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn attribute_values_are_decoded() {
        let attrs = r#" TEXT="Fish &amp; Chips &#x2764;""#;
        assert_eq!(get_attr(attrs, "TEXT").as_deref(), Some("Fish & Chips ❤"));
    }

    #[test]
    fn flags_are_true_only_for_true() {
        assert_eq!(get_flag(r#" BOLD="true""#, "BOLD"), Some(true));
        assert_eq!(get_flag(r#" BOLD="TRUE""#, "BOLD"), Some(true));
        assert_eq!(get_flag(r#" BOLD="yes""#, "BOLD"), Some(false));
        assert_eq!(get_flag("", "BOLD"), None);
    }

    #[test]
    fn integer_prefix_parsing() {
        assert_eq!(parse_int_prefix("12"), Some(12));
        assert_eq!(parse_int_prefix(" 14px"), Some(14));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("12.5"), Some(12));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix(""), None);
    }
}
