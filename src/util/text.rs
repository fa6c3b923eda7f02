use std::borrow::Cow;

use quick_xml::escape::resolve_html5_entity;

/// Longest reference name looked at before giving up on a `&`.
const MAX_REFERENCE_LEN: usize = 32;

/// Decodes HTML character references (`&amp;`, `&#39;`, `&eacute;`, ...).
///
/// Each reference is decoded on its own. A bare or unknown `&`, such as the
/// one in "AT&T", is copied through without affecting the rest of the text.
///
/// # Examples
///
/// ```
/// use subrelay::util::unescape_html;
///
/// assert_eq!(unescape_html("Tom &amp; Jerry"), "Tom & Jerry");
/// assert_eq!(unescape_html("AT&T"), "AT&T");
/// assert_eq!(unescape_html("AT&T &amp; co"), "AT&T & co");
/// ```
pub fn unescape_html(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    let mut changed = false;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_reference(tail) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &tail[consumed..];
                changed = true;
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(s)
    }
}

/// Decodes the reference at the start of `tail` (which begins with `&`).
///
/// Returns the replacement text and the number of bytes consumed, or `None`
/// when `tail` does not start with a terminated, known reference.
fn decode_reference(tail: &str) -> Option<(Cow<'static, str>, usize)> {
    let body = &tail[1..];
    let end = body
        .char_indices()
        .take(MAX_REFERENCE_LEN)
        .find(|&(_, c)| c == ';' || c == '&' || c.is_whitespace())
        .map(|(i, _)| i)?;
    if !body[end..].starts_with(';') || end == 0 {
        return None;
    }
    let name = &body[..end];
    let consumed = end + 2;

    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix(['x', 'X']) {
            Some(hex) if hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok()?
            }
            Some(_) => return None,
            None if number.bytes().all(|b| b.is_ascii_digit()) => number.parse().ok()?,
            None => return None,
        };
        let c = char::from_u32(code).filter(|&c| c != '\0')?;
        return Some((Cow::Owned(c.to_string()), consumed));
    }

    resolve_html5_entity(name).map(|value| (Cow::Borrowed(value), consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_borrowed() {
        assert!(matches!(unescape_html("no entities"), Cow::Borrowed(_)));
        assert!(matches!(unescape_html("AT&T"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_named_and_numeric_entities() {
        assert_eq!(unescape_html("&lt;b&gt;"), "<b>");
        assert_eq!(unescape_html("it&#39;s"), "it's");
        assert_eq!(unescape_html("it&#x27;s"), "it's");
        assert_eq!(unescape_html("caf&eacute;"), "café");
        assert_eq!(unescape_html("&quot;quoted&quot;"), "\"quoted\"");
    }

    #[test]
    fn test_double_escaped_decodes_once() {
        assert_eq!(unescape_html("&amp;amp;"), "&amp;");
    }

    #[test]
    fn test_bare_ampersand_left_alone() {
        assert_eq!(unescape_html("Black & Decker"), "Black & Decker");
    }

    #[test]
    fn test_bare_ampersand_does_not_block_other_entities() {
        assert_eq!(
            unescape_html("Tom &amp; Jerry & friends"),
            "Tom & Jerry & friends"
        );
        assert_eq!(unescape_html("Q&A &lt;live&gt;"), "Q&A <live>");
    }

    #[test]
    fn test_unknown_or_unterminated_references_copied_through() {
        assert_eq!(unescape_html("&bogus; &amp;"), "&bogus; &");
        assert_eq!(unescape_html("&amp"), "&amp");
        assert_eq!(unescape_html("&; &#; &#xZZ; &#1114112;"), "&; &#; &#xZZ; &#1114112;");
        assert_eq!(unescape_html("trailing &"), "trailing &");
    }
}
