//! Text templating over document bodies.
//!
//! Templates use the `{{action}}` syntax: field access (`{{.Name}}`),
//! pipelines (`{{.Items | len}}`), function calls with arguments, and the
//! `if`, `range` and `with` blocks closed by `{{end}}`. Functions are bound
//! on a [`TemplateBuilder`] before parsing, so calls to unknown functions
//! fail at parse time rather than during rendering.
//!
//! Word splits placeholders across runs; run [`normalize`] over raw body XML
//! before parsing it.
//!
//! # Example
//!
//! ```
//! use doc_template::template::{FuncMap, Template};
//! use serde_json::{Value, json};
//!
//! let funcs = FuncMap::new().with("shout", |args: &[Value]| {
//!     let text = args.first().and_then(Value::as_str).unwrap_or_default();
//!     Ok(Value::String(text.to_uppercase()))
//! });
//! let tpl = Template::builder("greeting")
//!     .funcs(funcs)
//!     .parse(r#"Hello {{.Name}}, {{shout "welcome"}}"#)?;
//!
//! assert_eq!(tpl.execute(&json!({"Name": "World"}))?, "Hello World, WELCOME");
//! # Ok::<(), doc_template::template::TemplateError>(())
//! ```

mod error;
mod exec;
mod funcs;
mod lexer;
mod normalize;
mod parser;

pub use error::{Result, TemplateError};
pub use funcs::{FuncMap, TemplateFn};
pub use normalize::normalize;

use parser::Node;
use serde::Serialize;
use serde_json::Value;

/// Collects functions and output options for a template before its text is
/// parsed.
#[derive(Debug, Clone)]
pub struct TemplateBuilder {
    name: String,
    funcs: FuncMap,
    escape_xml: bool,
}

impl TemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            funcs: FuncMap::new(),
            escape_xml: false,
        }
    }

    /// XML-escape the value printed by every action.
    ///
    /// Literal template text is left alone. An action whose last command is the
    /// built-in `html` is already escaped and is printed as is.
    pub fn escape_xml(mut self, enabled: bool) -> Self {
        self.escape_xml = enabled;
        self
    }

    /// Bind every function in `funcs`, replacing earlier bindings of the same name.
    pub fn funcs(mut self, funcs: FuncMap) -> Self {
        self.funcs.extend(funcs);
        self
    }

    /// Non-consuming form of [`funcs`](Self::funcs).
    pub fn add_funcs(&mut self, funcs: FuncMap) -> &mut Self {
        self.funcs.extend(funcs);
        self
    }

    /// Parse `text` against the functions bound so far.
    ///
    /// # Errors
    ///
    /// [`TemplateError::Parse`] for malformed actions, unbalanced blocks or
    /// calls to functions that are neither bound nor built in.
    pub fn parse(self, text: &str) -> Result<Template> {
        let nodes = parser::parse(lexer::lex(text)?, &self.funcs)?;
        Ok(Template {
            name: self.name,
            nodes,
            funcs: self.funcs,
            escape_xml: self.escape_xml,
        })
    }
}

/// A parsed template ready to render.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    nodes: Vec<Node>,
    funcs: FuncMap,
    escape_xml: bool,
}

impl Template {
    pub fn builder(name: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder::new(name)
    }

    /// Parse `text` with only the built-in functions available.
    pub fn parse(name: impl Into<String>, text: &str) -> Result<Self> {
        TemplateBuilder::new(name).parse(text)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with any serializable value as the data context.
    pub fn execute<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        let value = serde_json::to_value(data)
            .map_err(|e| TemplateError::Exec(format!("cannot serialize template data: {e}")))?;
        self.execute_value(&value)
    }

    /// Render with `data` as the initial dot. `data` is never modified.
    pub fn execute_value(&self, data: &Value) -> Result<String> {
        exec::execute(&self.nodes, &self.funcs, self.escape_xml, data)
    }
}
