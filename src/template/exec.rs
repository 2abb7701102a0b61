//! Template execution against a JSON data context.

use super::error::{Result, TemplateError};
use super::funcs::{FuncMap, call_builtin, display, is_true, type_name};
use crate::common::xml::escape_xml;
use super::parser::{Branch, Command, Node, Operand, Pipeline};
use serde_json::Value;

/// Render `nodes` with `data` as the initial dot. With `escape` set, action
/// output is XML-escaped.
pub(crate) fn execute(nodes: &[Node], funcs: &FuncMap, escape: bool, data: &Value) -> Result<String> {
    let mut state = State {
        funcs,
        escape,
        out: String::new(),
    };
    state.walk(data, nodes)?;
    Ok(state.out)
}

struct State<'a> {
    funcs: &'a FuncMap,
    escape: bool,
    out: String,
}

impl State<'_> {
    fn walk(&mut self, dot: &Value, nodes: &[Node]) -> Result<()> {
        for node in nodes {
            match node {
                Node::Text(text) => self.out.push_str(text),
                Node::Action(pipe) => {
                    let value = self.pipeline(dot, pipe)?;
                    let text = display(&value);
                    if self.escape && !self.ends_in_html(pipe) {
                        self.out.push_str(&escape_xml(text));
                    } else {
                        self.out.push_str(&text);
                    }
                },
                Node::If(branch) => {
                    let value = self.pipeline(dot, &branch.pipe)?;
                    let chosen = if is_true(&value) { &branch.body } else { &branch.otherwise };
                    self.walk(dot, chosen)?;
                },
                Node::With(branch) => {
                    let value = self.pipeline(dot, &branch.pipe)?;
                    if is_true(&value) {
                        self.walk(&value, &branch.body)?;
                    } else {
                        self.walk(dot, &branch.otherwise)?;
                    }
                },
                Node::Range(branch) => self.range(dot, branch)?,
            }
        }
        Ok(())
    }

    fn ends_in_html(&self, pipe: &Pipeline) -> bool {
        let last = pipe.commands.last().and_then(|command| command.operands.first());
        matches!(last, Some(Operand::Call(name)) if name == "html" && self.funcs.get(name).is_none())
    }

    fn range(&mut self, dot: &Value, branch: &Branch) -> Result<()> {
        let value = self.pipeline(dot, &branch.pipe)?;
        match &value {
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    self.walk(item, &branch.body)?;
                }
            },
            Value::Object(map) if !map.is_empty() => {
                for item in map.values() {
                    self.walk(item, &branch.body)?;
                }
            },
            Value::Number(n) if n.as_u64().is_some_and(|count| count > 0) => {
                for i in 0..n.as_u64().unwrap_or_default() {
                    self.walk(&Value::from(i), &branch.body)?;
                }
            },
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Number(_) => {
                self.walk(dot, &branch.otherwise)?;
            },
            other => {
                return Err(TemplateError::exec(
                    branch.pipe.line,
                    format!("range can't iterate over {}", type_name(other)),
                ));
            },
        }
        Ok(())
    }

    fn pipeline(&mut self, dot: &Value, pipe: &Pipeline) -> Result<Value> {
        let mut value = None;
        for command in &pipe.commands {
            value = Some(self.command(dot, command, value.take(), pipe.line)?);
        }
        Ok(value.unwrap_or(Value::Null))
    }

    fn command(&mut self, dot: &Value, command: &Command, piped: Option<Value>, line: usize) -> Result<Value> {
        let Some((first, rest)) = command.operands.split_first() else {
            return Ok(Value::Null);
        };

        if let Operand::Call(name) = first {
            let mut args = rest
                .iter()
                .map(|operand| self.operand(dot, operand, line))
                .collect::<Result<Vec<_>>>()?;
            args.extend(piped);
            return self.call(name, &args, line);
        }

        if !rest.is_empty() || piped.is_some() {
            return Err(TemplateError::exec(line, "can't give argument to non-function"));
        }
        self.operand(dot, first, line)
    }

    fn operand(&mut self, dot: &Value, operand: &Operand, line: usize) -> Result<Value> {
        match operand {
            Operand::Dot => Ok(dot.clone()),
            Operand::Field(path) => lookup(dot, path, line),
            Operand::Call(name) => self.call(name, &[], line),
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Sub(pipe) => self.pipeline(dot, pipe),
        }
    }

    fn call(&mut self, name: &str, args: &[Value], line: usize) -> Result<Value> {
        // Registered functions shadow built-ins of the same name
        let result = match self.funcs.get(name) {
            Some(f) => f(args),
            None => call_builtin(name, args)
                .ok_or_else(|| TemplateError::exec(line, format!("function {name:?} not defined")))?,
        };
        result.map_err(|message| TemplateError::exec(line, format!("error calling {name}: {message}")))
    }
}

fn lookup(dot: &Value, path: &[String], line: usize) -> Result<Value> {
    let mut current = dot;
    for segment in path {
        current = match current {
            Value::Object(map) => map
                .get(segment)
                .ok_or_else(|| TemplateError::exec(line, format!("map has no entry for key {segment:?}")))?,
            Value::Null => {
                return Err(TemplateError::exec(line, format!("nil pointer evaluating .{segment}")));
            },
            other => {
                return Err(TemplateError::exec(
                    line,
                    format!("can't evaluate field {segment} in type {}", type_name(other)),
                ));
            },
        };
    }
    Ok(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::lexer::lex;
    use crate::template::parser::parse;
    use serde_json::json;

    fn render_with(src: &str, funcs: &FuncMap, data: Value) -> Result<String> {
        let nodes = parse(lex(src)?, funcs)?;
        execute(&nodes, funcs, false, &data)
    }

    fn render(src: &str, data: Value) -> Result<String> {
        render_with(src, &FuncMap::new(), data)
    }

    #[test]
    fn test_field_substitution() {
        assert_eq!(render("Hello {{.Name}}", json!({"Name": "World"})).unwrap(), "Hello World");
        assert_eq!(
            render("{{.Sys.Owner.Name}}", json!({"Sys": {"Owner": {"Name": "ISSO"}}})).unwrap(),
            "ISSO"
        );
    }

    #[test]
    fn test_missing_field_is_exec_error() {
        let err = render("Hello {{.Nope}}", json!({"Name": "World"})).unwrap_err();
        assert!(matches!(err, TemplateError::Exec(ref m) if m.contains("Nope")));
        assert!(render("{{.Name.First}}", json!({"Name": "W"})).is_err());
        assert!(render("{{.A.B}}", json!({"A": null})).is_err());
    }

    #[test]
    fn test_values_render() {
        let data = json!({"n": 3, "f": 1.5, "b": true, "z": null, "l": [1, "a"]});
        assert_eq!(render("{{.n}} {{.f}} {{.b}} [{{.z}}] {{.l}}", data).unwrap(), r#"3 1.5 true [] [1,"a"]"#);
    }

    #[test]
    fn test_if_else() {
        let tpl = "{{if .ok}}yes{{else if .maybe}}maybe{{else}}no{{end}}";
        assert_eq!(render(tpl, json!({"ok": true, "maybe": false})).unwrap(), "yes");
        assert_eq!(render(tpl, json!({"ok": false, "maybe": "x"})).unwrap(), "maybe");
        assert_eq!(render(tpl, json!({"ok": "", "maybe": 0})).unwrap(), "no");
    }

    #[test]
    fn test_range_and_with() {
        let data = json!({
            "components": [{"name": "EC2"}, {"name": "S3"}],
            "empty": [],
            "owner": {"name": "Ops"}
        });
        assert_eq!(
            render("{{range .components}}[{{.name}}]{{end}}", data.clone()).unwrap(),
            "[EC2][S3]"
        );
        assert_eq!(render("{{range .empty}}x{{else}}none{{end}}", data.clone()).unwrap(), "none");
        assert_eq!(render("{{with .owner}}{{.name}}{{end}}", data.clone()).unwrap(), "Ops");
        assert_eq!(render("{{range 3}}{{.}}{{end}}", data.clone()).unwrap(), "012");
        assert!(render("{{range .owner.name}}x{{end}}", data).is_err());
    }

    #[test]
    fn test_pipelines_and_builtins() {
        let data = json!({"items": ["a", "b"], "title": "a & b"});
        assert_eq!(render("{{.items | len}}", data.clone()).unwrap(), "2");
        assert_eq!(render("{{index .items 1}}", data.clone()).unwrap(), "b");
        assert_eq!(render("{{.title | html}}", data.clone()).unwrap(), "a &amp; b");
        assert_eq!(render(r#"{{if eq (len .items) 2}}two{{end}}"#, data.clone()).unwrap(), "two");
        assert_eq!(render(r#"{{print "x" | print "y"}}"#, data).unwrap(), "yx");
    }

    #[test]
    fn test_bound_function_and_failure() {
        let funcs = FuncMap::new()
            .with("upper", |args: &[Value]| match args {
                [Value::String(s)] => Ok(Value::String(s.to_uppercase())),
                _ => Err("upper takes one string".to_string()),
            })
            .with("fail", |_: &[Value]| Err("lookup exploded".to_string()));

        assert_eq!(render_with(r#"{{upper "ac-2"}}"#, &funcs, json!({})).unwrap(), "AC-2");
        assert_eq!(render_with(r#"{{"ac-2" | upper}}"#, &funcs, json!({})).unwrap(), "AC-2");
        let err = render_with("{{fail}}", &funcs, json!({})).unwrap_err();
        assert!(matches!(err, TemplateError::Exec(ref m) if m.contains("lookup exploded")));
        assert!(render_with("{{upper 1 2}}", &funcs, json!({})).is_err());
    }

    #[test]
    fn test_escape_applies_to_actions_only() {
        let funcs = FuncMap::new().with("html", |_: &[Value]| Ok(json!("<raw>")));
        let data = json!({"components": [{"name": "R&D <lab>"}, {"name": "S3"}]});
        let src = "<w:t>{{range .components}}[{{.name}}]{{end}}</w:t>";
        let nodes = parse(lex(src).unwrap(), &FuncMap::new()).unwrap();
        assert_eq!(
            execute(&nodes, &FuncMap::new(), true, &data).unwrap(),
            "<w:t>[R&amp;D &lt;lab&gt;][S3]</w:t>"
        );

        // A bound `html` shadows the built-in and is escaped like any other call
        let nodes = parse(lex("{{html}}").unwrap(), &funcs).unwrap();
        assert_eq!(execute(&nodes, &funcs, true, &data).unwrap(), "&lt;raw&gt;");
    }

    #[test]
    fn test_argument_to_non_function() {
        assert!(render("{{.A .B}}", json!({"A": 1, "B": 2})).is_err());
        assert!(render("{{1 | .A}}", json!({"A": 1})).is_err());
    }

    #[test]
    fn test_context_not_mutated() {
        let data = json!({"Name": "World"});
        let before = data.clone();
        let nodes = parse(lex("{{.Name}}{{with .Name}}{{.}}{{end}}").unwrap(), &FuncMap::new()).unwrap();
        execute(&nodes, &FuncMap::new(), false, &data).unwrap();
        assert_eq!(data, before);
    }
}
