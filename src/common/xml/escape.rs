//! Escaping for text spliced into XML character data.

use aho_corasick::AhoCorasick;
use once_cell::sync::Lazy;

const CHARACTERS: [&str; 5] = ["&", "<", ">", "\"", "'"];
const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&apos;"];

static ESCAPER: Lazy<AhoCorasick> =
    Lazy::new(|| AhoCorasick::new(CHARACTERS).expect("XML escape patterns are valid"));

/// Escape the five XML special characters in `text`, handing the buffer back
/// untouched when there is nothing to replace.
///
/// ```
/// use doc_template::common::xml::escape_xml;
///
/// assert_eq!(escape_xml("AC-2 & AC-3".to_string()), "AC-2 &amp; AC-3");
/// assert_eq!(escape_xml("<b>\"x\"</b>".to_string()), "&lt;b&gt;&quot;x&quot;&lt;/b&gt;");
/// ```
pub fn escape_xml(text: String) -> String {
    if ESCAPER.is_match(&text) {
        ESCAPER.replace_all(&text, &ENTITIES)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrative_text_is_escaped() {
        let escaped = escape_xml("Uses <AES> & \"TLS\" for 'data' in transit".to_string());
        assert_eq!(
            escaped,
            "Uses &lt;AES&gt; &amp; &quot;TLS&quot; for &apos;data&apos; in transit"
        );
    }

    #[test]
    fn test_plain_text_is_returned_as_is() {
        let text = "Justification in narrative form".to_string();
        let ptr = text.as_ptr();
        let escaped = escape_xml(text);
        assert_eq!(escaped, "Justification in narrative form");
        assert_eq!(escaped.as_ptr(), ptr);
    }

    #[test]
    fn test_existing_entities_are_escaped_again() {
        assert_eq!(escape_xml("&amp;".to_string()), "&amp;amp;");
    }
}
