//! Lookups of justification text by `standard@control` keys.
//!
//! The `resolve_*` functions never fail: an unknown standard, control or
//! section resolves to empty text. [`narrative_functions`] exposes them to
//! templates as plain text.

use super::data::ComplianceData;
use super::error::{DataError, Result};
use crate::template::FuncMap;
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

const SEPARATOR: char = '@';

/// A parsed `standard@control[@section]` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NarrativeKey {
    pub standard: String,
    pub control: String,
    pub section: Option<String>,
}

impl NarrativeKey {
    /// Parse the strict form used by template bindings.
    ///
    /// A key without `@` names a standard with an empty control. The third
    /// segment, when present, is the section.
    ///
    /// # Errors
    ///
    /// `InvalidKey` for an empty standard or more than three segments.
    ///
    /// ```
    /// use doc_template::compliance::NarrativeKey;
    ///
    /// let key = NarrativeKey::parse("NIST-800-53@CM-2@a").unwrap();
    /// assert_eq!(key.control, "CM-2");
    /// assert_eq!(key.section.as_deref(), Some("a"));
    /// assert!(NarrativeKey::parse("NIST-800-53@CM-2@a@b").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason| DataError::InvalidKey {
            key: raw.to_string(),
            reason,
        };

        let mut segments = raw.split(SEPARATOR);
        let standard = segments.next().unwrap_or_default();
        let control = segments.next().unwrap_or_default();
        let section = segments.next();
        if segments.next().is_some() {
            return Err(invalid("expected at most standard@control@section"));
        }
        if standard.is_empty() {
            return Err(invalid("missing standard"));
        }
        if section.is_some_and(str::is_empty) {
            return Err(invalid("empty section"));
        }

        Ok(Self {
            standard: standard.to_string(),
            control: control.to_string(),
            section: section.map(str::to_string),
        })
    }
}

impl fmt::Display for NarrativeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.standard, self.control)?;
        if let Some(section) = &self.section {
            write!(f, "{SEPARATOR}{section}")?;
        }
        Ok(())
    }
}

/// Split `raw` at the first `@` into standard and control.
///
/// Without `@` the control is empty. Anything after a second `@` is dropped;
/// use [`NarrativeKey::parse`] to keep or reject it.
pub fn split_key(raw: &str) -> (&str, &str) {
    let mut segments = raw.split(SEPARATOR);
    let standard = segments.next().unwrap_or_default();
    let control = segments.next().unwrap_or_default();
    (standard, control)
}

/// All narrative text for a control, concatenated in insertion order.
pub fn resolve_control(data: &ComplianceData, standard: &str, control: &str) -> String {
    data.satisfying(standard, control)
        .flat_map(|(_, satisfies)| &satisfies.narrative)
        .map(|section| section.text.as_str())
        .collect()
}

/// Narrative text of one section of a control.
pub fn resolve_control_section(data: &ComplianceData, standard: &str, control: &str, section: &str) -> String {
    data.satisfying(standard, control)
        .flat_map(|(_, satisfies)| &satisfies.narrative)
        .filter(|narrative| narrative.has_key(section))
        .map(|narrative| narrative.text.as_str())
        .collect()
}

/// Parameter text for a control, filtered by parameter key.
pub fn resolve_parameter(data: &ComplianceData, standard: &str, control: &str, section: &str) -> String {
    data.satisfying(standard, control)
        .flat_map(|(_, satisfies)| &satisfies.parameters)
        .filter(|parameter| parameter.key == section)
        .map(|parameter| parameter.text.as_str())
        .collect()
}

/// One `Name: role` line per component satisfying the control.
///
/// Components without a responsible role are skipped; a component listed
/// twice for the same control appears once.
pub fn resolve_responsible_roles(data: &ComplianceData, standard: &str, control: &str) -> String {
    let mut seen = HashSet::new();
    let mut out = String::new();
    for (component, _) in data.satisfying(standard, control) {
        if component.responsible_role.is_empty() || !seen.insert(component.key.as_str()) {
            continue;
        }
        out.push_str(&component.name);
        out.push_str(": ");
        out.push_str(&component.responsible_role);
        out.push('\n');
    }
    out
}

/// Template bindings backed by `data`:
///
/// | name | arguments | result |
/// |------|-----------|--------|
/// | `getAllControls` | `"S@C"` or `"S@C@sec"` | all narrative text, or one section's |
/// | `getControlSection` | `"S@C" "sec"` or `"S@C@sec"` | narrative text of one section |
/// | `getParameter` | `"S@C" "key"` or `"S@C@key"` | parameter text |
/// | `getResponsibleRoles` | `"S@C"` | `Name: role` lines |
///
/// Results are plain text. Templates that write into XML escape them on
/// output (see [`TemplateBuilder::escape_xml`](crate::template::TemplateBuilder::escape_xml)).
pub fn narrative_functions(data: Arc<ComplianceData>) -> FuncMap {
    let mut funcs = FuncMap::new();

    let shared = Arc::clone(&data);
    funcs.insert("getAllControls", move |args: &[Value]| {
        let key = key_arg("getAllControls", args, 1)?;
        let text = match &key.section {
            Some(section) => resolve_control_section(&shared, &key.standard, &key.control, section),
            None => resolve_control(&shared, &key.standard, &key.control),
        };
        Ok(Value::String(text))
    });

    let shared = Arc::clone(&data);
    funcs.insert("getControlSection", move |args: &[Value]| {
        let (key, section) = sectioned_args("getControlSection", args)?;
        let text = resolve_control_section(&shared, &key.standard, &key.control, &section);
        Ok(Value::String(text))
    });

    let shared = Arc::clone(&data);
    funcs.insert("getParameter", move |args: &[Value]| {
        let (key, section) = sectioned_args("getParameter", args)?;
        let text = resolve_parameter(&shared, &key.standard, &key.control, &section);
        Ok(Value::String(text))
    });

    funcs.insert("getResponsibleRoles", move |args: &[Value]| {
        let key = key_arg("getResponsibleRoles", args, 1)?;
        let text = resolve_responsible_roles(&data, &key.standard, &key.control);
        Ok(Value::String(text))
    });

    funcs
}

fn str_arg<'a>(name: &str, args: &'a [Value], i: usize) -> std::result::Result<&'a str, String> {
    match args.get(i) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!("{name}: argument {} must be a string, got {other}", i + 1)),
        None => Err(format!("{name}: missing argument {}", i + 1)),
    }
}

fn key_arg(name: &str, args: &[Value], max: usize) -> std::result::Result<NarrativeKey, String> {
    if args.len() > max {
        return Err(format!("{name}: too many arguments ({})", args.len()));
    }
    NarrativeKey::parse(str_arg(name, args, 0)?).map_err(|e| e.to_string())
}

fn sectioned_args(name: &str, args: &[Value]) -> std::result::Result<(NarrativeKey, String), String> {
    let mut key = key_arg(name, args, 2)?;
    let section = match (key.section.take(), args.len()) {
        (Some(_), 2) => return Err(format!("{name}: section given in both key and argument")),
        (Some(section), _) => section,
        (None, 2) => str_arg(name, args, 1)?.to_string(),
        (None, _) => return Err(format!("{name}: missing section")),
    };
    Ok((key, section))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::fixtures::sample_data;
    use crate::template::{Template, TemplateError};
    use serde_json::json;

    #[test]
    fn test_split_key() {
        assert_eq!(split_key("NIST-800-53@CM-2"), ("NIST-800-53", "CM-2"));
        assert_eq!(split_key("NIST-800-53"), ("NIST-800-53", ""));
        assert_eq!(split_key("A@B@C"), ("A", "B"));
        assert_eq!(split_key(""), ("", ""));
    }

    #[test]
    fn test_narrative_key_parse() {
        let key = NarrativeKey::parse("PCI-DSS-MAY-2015@2.1").unwrap();
        assert_eq!(key.standard, "PCI-DSS-MAY-2015");
        assert_eq!(key.control, "2.1");
        assert_eq!(key.section, None);
        assert_eq!(key.to_string(), "PCI-DSS-MAY-2015@2.1");

        assert_eq!(NarrativeKey::parse("S").unwrap().control, "");
        for bad in ["@CM-2", "", "A@B@C@D", "A@B@"] {
            assert!(
                matches!(NarrativeKey::parse(bad), Err(DataError::InvalidKey { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_resolve_control_concatenates_in_order() {
        let data = sample_data();
        assert_eq!(
            resolve_control(&data, "NIST-800-53", "CM-2"),
            "Justification in narrative form A for CM-2\
             Justification in narrative form B for CM-2\
             S3 keeps versioned baselines"
        );
        assert_eq!(
            resolve_control(&data, "PCI-DSS-MAY-2015", "2.1"),
            "Justification in narrative form for 2.1"
        );
    }

    #[test]
    fn test_unknown_pairs_resolve_empty() {
        let data = sample_data();
        assert_eq!(resolve_control(&data, "BogusStandard", "NothingControl"), "");
        assert_eq!(resolve_control(&data, "PCI-DSS-MAY-2015", "1.1.1"), "");
        assert_eq!(resolve_control_section(&data, "PCI-DSS-MAY-2015", "2.1", "X"), "");
        assert_eq!(resolve_parameter(&data, "BogusStandard", "NothingControl", "a"), "");
        assert_eq!(resolve_responsible_roles(&data, "BogusStandard", "NothingControl"), "");
    }

    #[test]
    fn test_resolve_section_and_parameter() {
        let data = sample_data();
        assert_eq!(
            resolve_control_section(&data, "NIST-800-53", "CM-2", "a"),
            "Justification in narrative form A for CM-2"
        );
        assert_eq!(resolve_parameter(&data, "PCI-DSS-MAY-2015", "1.1", "a"), "Parameter A for 1.1");
        assert_eq!(resolve_parameter(&data, "NIST-800-53", "CM-2", "a"), "");
    }

    #[test]
    fn test_responsible_roles() {
        let data = sample_data();
        // S3 has no responsible role
        assert_eq!(
            resolve_responsible_roles(&data, "NIST-800-53", "CM-2"),
            "Amazon Elastic Compute Cloud: AWS Staff\n"
        );
    }

    fn render_as(text: &str, escape: bool) -> std::result::Result<String, TemplateError> {
        Template::builder("t")
            .funcs(narrative_functions(Arc::new(sample_data())))
            .escape_xml(escape)
            .parse(text)?
            .execute(&json!({}))
    }

    fn render(text: &str) -> std::result::Result<String, TemplateError> {
        render_as(text, false)
    }

    #[test]
    fn test_template_bindings() {
        assert_eq!(
            render(r#"{{getAllControls "PCI-DSS-MAY-2015@2.1"}}"#).unwrap(),
            "Justification in narrative form for 2.1"
        );
        assert_eq!(render(r#"{{getAllControls "BogusStandard@NothingControl"}}"#).unwrap(), "");
        assert_eq!(
            render(r#"{{getControlSection "NIST-800-53@CM-2" "b"}}|{{getControlSection "NIST-800-53@CM-2@a"}}"#)
                .unwrap(),
            "Justification in narrative form B for CM-2|Justification in narrative form A for CM-2"
        );
        assert_eq!(
            render(r#"{{getParameter "PCI-DSS-MAY-2015@1.1" "a"}}"#).unwrap(),
            "Parameter A for 1.1"
        );
        assert_eq!(
            render(r#"{{getResponsibleRoles "NIST-800-53@CM-2"}}"#).unwrap(),
            "Amazon Elastic Compute Cloud: AWS Staff\n"
        );
    }

    #[test]
    fn test_binding_output_is_escaped_once() {
        let text = r#"{{getAllControls "NIST-800-53@AC-2"}}"#;
        assert_eq!(render(text).unwrap(), "Accounts & roles are reviewed <quarterly>");
        assert_eq!(
            render_as(text, true).unwrap(),
            "Accounts &amp; roles are reviewed &lt;quarterly&gt;"
        );
        assert_eq!(
            render_as(r#"{{getAllControls "NIST-800-53@AC-2" | html}}"#, true).unwrap(),
            "Accounts &amp; roles are reviewed &lt;quarterly&gt;"
        );
    }

    #[test]
    fn test_binding_errors_are_exec_errors() {
        for text in [
            r#"{{getAllControls "A@B@C@D"}}"#,
            r#"{{getAllControls 42}}"#,
            r#"{{getControlSection "NIST-800-53@CM-2"}}"#,
            r#"{{getControlSection "NIST-800-53@CM-2@a" "b"}}"#,
            r#"{{getResponsibleRoles "NIST-800-53@CM-2" "extra"}}"#,
        ] {
            assert!(matches!(render(text), Err(TemplateError::Exec(_))), "{text}");
        }
    }
}
