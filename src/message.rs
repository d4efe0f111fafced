use std::sync::LazyLock;

use regex::{Captures, Regex};

/// `http(s)://` followed by anything up to whitespace or an HTML delimiter
static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"]+"#).expect("URL pattern is valid"));

/// Characters that end a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// Wraps every URL in `message` in an anchor tag.
///
/// Matches are replaced in a single left-to-right pass, so a URL that is a
/// prefix of another is never wrapped twice. The rest of the message is not
/// HTML-escaped.
pub fn annotate(message: &str) -> String {
    URL_PATTERN
        .replace_all(message, |caps: &Captures| {
            let matched = &caps[0];
            let url = matched.trim_end_matches(TRAILING_PUNCTUATION);
            let rest = &matched[url.len()..];
            if url.ends_with("://") {
                return matched.to_string();
            }
            format!("{}{rest}", anchor(url))
        })
        .into_owned()
}

/// `<a href="URL">URL</a>`
pub fn anchor(url: &str) -> String {
    format!(r#"<a href="{url}">{url}</a>"#)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn normal_message() {
        assert_eq!(annotate("normal message"), "normal message");
    }

    #[test]
    fn link_message() {
        assert_eq!(
            annotate("link message http://example.com"),
            r#"link message <a href="http://example.com">http://example.com</a>"#
        );
    }

    #[test]
    fn link_message_with_query_string() {
        assert_eq!(
            annotate("link message http://example.com?foo=bar&baz=hoge"),
            r#"link message <a href="http://example.com?foo=bar&baz=hoge">http://example.com?foo=bar&baz=hoge</a>"#
        );
    }

    #[test]
    fn link_message_with_japanese_query_string() {
        assert_eq!(
            annotate("link message http://example.com?foo=ほげ&baz=ふが"),
            r#"link message <a href="http://example.com?foo=ほげ&baz=ふが">http://example.com?foo=ほげ&baz=ふが</a>"#
        );
    }

    #[test]
    fn link_message_line_break() {
        assert_eq!(
            annotate("link message\nhttp://example.com"),
            "link message\n<a href=\"http://example.com\">http://example.com</a>"
        );
    }

    #[test]
    fn link_message_multi() {
        assert_eq!(
            annotate("link message http://one.example.com http://two.example.com"),
            r#"link message <a href="http://one.example.com">http://one.example.com</a> <a href="http://two.example.com">http://two.example.com</a>"#
        );
    }

    #[test]
    fn link_message_multi_line_break() {
        assert_eq!(
            annotate("link message\nhttp://one.example.com\nhttp://two.example.com"),
            "link message\n<a href=\"http://one.example.com\">http://one.example.com</a>\n<a href=\"http://two.example.com\">http://two.example.com</a>"
        );
    }

    #[test]
    fn repeated_url_is_wrapped_each_time() {
        assert_eq!(
            annotate("https://a.example https://a.example"),
            r#"<a href="https://a.example">https://a.example</a> <a href="https://a.example">https://a.example</a>"#
        );
    }

    #[test]
    fn url_prefix_of_another_is_not_double_wrapped() {
        let out = annotate("http://x.com http://x.com/page");
        assert_eq!(
            out,
            r#"<a href="http://x.com">http://x.com</a> <a href="http://x.com/page">http://x.com/page</a>"#
        );
        assert_eq!(out.matches("<a href").count(), 2);
    }

    #[test]
    fn trailing_punctuation_stays_outside() {
        assert_eq!(
            annotate("see https://example.com."),
            r#"see <a href="https://example.com">https://example.com</a>."#
        );
    }

    #[test]
    fn bare_scheme_is_left_alone() {
        assert_eq!(annotate("http:// nothing"), "http:// nothing");
    }

    #[test]
    fn html_is_not_escaped() {
        assert_eq!(annotate("<b>hi</b> & bye"), "<b>hi</b> & bye");
    }
}
