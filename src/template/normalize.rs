//! Placeholder repair for text extracted from a body part.
//!
//! Authoring tools split one logical line into several runs, so a
//! placeholder typed as `{{.Name}}` can reach us as
//! `{{</w:t></w:r><w:r><w:t>.Name}}`, with typographic quotes substituted for
//! the ASCII ones. Only text inside `{{ ... }}` spans is rewritten; everything
//! else is copied byte for byte.
//!
//! Pairing rule: a span ends at the first `}}` after its `{{`. When several
//! `{{` precede that `}}`, the span starts at the last of them and the earlier
//! markers are left in the surrounding text. A `{{` with no `}}` after it is
//! not a span. Spans may cross line breaks.

use memchr::{memchr, memmem};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const QUOT_ENTITY: &str = "&quot;";

/// Repair every placeholder span in `text`.
///
/// Inside each span, in order: markup tags (`<...>`, ended by the first `>`)
/// are removed, `&quot;` becomes `"`, and curly quotes become ASCII quotes.
///
/// ```
/// use doc_template::template::normalize;
///
/// assert_eq!(
///     normalize("Hello {{<tag/>Name}}, cost: &quot;3&quot;"),
///     "Hello {{Name}}, cost: &quot;3&quot;"
/// );
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    loop {
        // Outside a span: look for the next open marker
        let Some(open) = memmem::find(rest.as_bytes(), OPEN.as_bytes()) else {
            out.push_str(rest);
            break;
        };
        out.push_str(&rest[..open]);

        // Inside a span: it ends at the first close marker
        let after_open = &rest[open + OPEN.len()..];
        let Some(close) = memmem::find(after_open.as_bytes(), CLOSE.as_bytes()) else {
            out.push_str(&rest[open..]);
            break;
        };
        let inner = &after_open[..close];

        if let Some(reopen) = memmem::rfind(inner.as_bytes(), OPEN.as_bytes()) {
            // A later open marker owns the close marker; the earlier one is plain text
            let restart = open + OPEN.len() + reopen;
            out.push_str(&rest[open..restart]);
            rest = &rest[restart..];
            continue;
        }

        out.push_str(OPEN);
        out.push_str(&clean_span(inner));
        out.push_str(CLOSE);
        rest = &after_open[close + CLOSE.len()..];
    }

    out
}

fn clean_span(inner: &str) -> String {
    let stripped = strip_tags(inner);
    let unquoted = stripped.replace(QUOT_ENTITY, "\"");
    unquoted.chars().map(normalize_quote).collect()
}

/// Remove `<...>` runs; a `<` with no later `>` is kept as text.
fn strip_tags(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut pos = 0;

    while let Some(lt) = memchr(b'<', &bytes[pos..]) {
        let lt = pos + lt;
        let Some(gt) = memchr(b'>', &bytes[lt + 1..]) else {
            break;
        };
        out.push_str(&s[pos..lt]);
        pos = lt + 1 + gt + 1;
    }

    out.push_str(&s[pos..]);
    out
}

#[inline]
fn normalize_quote(c: char) -> char {
    match c {
        '\u{201C}' | '\u{201D}' => '"',
        '\u{2018}' | '\u{2019}' => '\'',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_tags_inside_span_only() {
        assert_eq!(
            normalize("Hello {{<tag/>Name}}, cost: &quot;3&quot;"),
            "Hello {{Name}}, cost: &quot;3&quot;"
        );
    }

    #[test]
    fn test_quotes_mapped_inside_span_only() {
        assert_eq!(
            normalize("{{ \u{201C}Name\u{201D} }} said \u{201C}hi\u{201D}"),
            "{{ \"Name\" }} said \u{201C}hi\u{201D}"
        );
        assert_eq!(normalize("{{ \u{2018}a\u{2019} }}"), "{{ 'a' }}");
    }

    #[test]
    fn test_quot_entity_inside_span() {
        assert_eq!(
            normalize("{{getAllControls &quot;NIST-800-53@AC-2&quot;}}"),
            "{{getAllControls \"NIST-800-53@AC-2\"}}"
        );
    }

    #[test]
    fn test_repairs_run_split_placeholder() {
        let xml = r#"<w:r><w:t>{{getAllControls </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>“NIST-800-53@CM-2”}}</w:t></w:r>"#;
        assert_eq!(
            normalize(xml),
            r#"<w:r><w:t>{{getAllControls "NIST-800-53@CM-2"}}</w:t></w:r>"#
        );
    }

    #[test]
    fn test_unterminated_span_unchanged() {
        assert_eq!(normalize("prefix {{unterminated"), "prefix {{unterminated");
        assert_eq!(normalize("{{<b>a}} then {{<b>tail"), "{{a}} then {{<b>tail");
    }

    #[test]
    fn test_later_open_marker_owns_close() {
        assert_eq!(normalize("{{a<x> {{<y>b}}"), "{{a<x> {{b}}");
    }

    #[test]
    fn test_adjacent_spans_separated_by_markup() {
        assert_eq!(
            normalize("{{<r>.A}}<w:t/>{{<r>.B}}"),
            "{{.A}}<w:t/>{{.B}}"
        );
    }

    #[test]
    fn test_close_marker_ends_span_early() {
        // Nothing inside a span can hide a close marker
        assert_eq!(normalize("{{\"a}}b\"}}"), "{{\"a}}b\"}}");
        assert_eq!(normalize("{{a}}}"), "{{a}}}");
    }

    #[test]
    fn test_lone_angle_bracket_kept() {
        assert_eq!(normalize("{{ if lt 1 2 }}"), "{{ if lt 1 2 }}");
        assert_eq!(normalize("{{a < b}}"), "{{a < b}}");
    }

    #[test]
    fn test_span_across_lines() {
        assert_eq!(normalize("{{<w:t\n/>.Name}}"), "{{.Name}}");
    }

    #[test]
    fn test_no_markers_is_identity() {
        let xml = "<w:p><w:r><w:t>&quot;plain&quot; \u{201C}text\u{201D}</w:t></w:r></w:p>";
        assert_eq!(normalize(xml), xml);
    }

    const PIECES: &[&str] = &[
        "{{", "}}", "{", "}", "<w:t>", "</w:r>", "<", ">", "&quot;", "&amp;", "\u{201C}", "\u{201D}",
        "\u{2018}", "\u{2019}", "\n", ".Name", " ",
    ];

    fn fragment() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                prop::sample::select(PIECES).prop_map(|s| s.to_string()),
                "[a-z@.]{0,3}",
            ],
            0..24,
        )
        .prop_map(|parts| parts.concat())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_normalize_is_idempotent(text in fragment()) {
            let once = normalize(&text);
            prop_assert_eq!(normalize(&once), once);
        }

        #[test]
        fn prop_text_without_open_marker_is_untouched(text in fragment()) {
            let text = text.replace('{', "(");
            prop_assert_eq!(normalize(&text), text);
        }

        #[test]
        fn prop_unterminated_suffix_survives(text in fragment(), tail in "[a-z<>]{0,8}") {
            let suffix = format!("{{{{{tail}");
            let input = format!("{text}{suffix}");
            prop_assert!(normalize(&input).ends_with(&suffix));
        }
    }
}
