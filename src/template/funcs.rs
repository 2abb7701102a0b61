//! Function tables and built-in template functions.

use crate::common::xml::escape_xml;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A function callable from a template action.
///
/// Receives the evaluated arguments (a piped value comes last) and returns a
/// value or a message describing the failure.
pub type TemplateFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Named functions registered on a template before parsing.
#[derive(Clone, Default)]
pub struct FuncMap {
    funcs: HashMap<String, TemplateFn>,
}

impl FuncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` under `name`, replacing any previous binding.
    pub fn insert<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.funcs.insert(name.into(), Arc::new(f));
        self
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.insert(name, f);
        self
    }

    /// Copy every binding of `other` into this table.
    pub fn extend(&mut self, other: FuncMap) {
        self.funcs.extend(other.funcs);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&TemplateFn> {
        self.funcs.get(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.funcs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

impl fmt::Debug for FuncMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.funcs.keys().collect();
        names.sort();
        f.debug_struct("FuncMap").field("names", &names).finish()
    }
}

/// Names available in every template.
pub(crate) const BUILTINS: &[&str] = &[
    "and", "eq", "html", "index", "len", "ne", "not", "or", "print", "println",
];

#[inline]
pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Truthiness: false, zero, null and empty strings or collections are false.
pub(crate) fn is_true(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text a value renders as. Null renders as nothing.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        _ => a == b,
    }
}

fn expect_args(name: &str, args: &[Value], min: usize, max: Option<usize>) -> Result<(), String> {
    let ok = args.len() >= min && max.is_none_or(|max| args.len() <= max);
    if ok {
        return Ok(());
    }
    Err(match max {
        Some(max) if max == min => format!("wrong number of args for {name}: want {min} got {}", args.len()),
        _ => format!("wrong number of args for {name}: want at least {min} got {}", args.len()),
    })
}

/// Dispatch a built-in; `None` if `name` is not one.
pub(crate) fn call_builtin(name: &str, args: &[Value]) -> Option<Result<Value, String>> {
    let result = match name {
        "and" => expect_args(name, args, 1, None).map(|_| {
            args.iter()
                .find(|v| !is_true(v))
                .or(args.last())
                .cloned()
                .unwrap_or(Value::Null)
        }),
        "or" => expect_args(name, args, 1, None).map(|_| {
            args.iter()
                .find(|v| is_true(v))
                .or(args.last())
                .cloned()
                .unwrap_or(Value::Null)
        }),
        "not" => expect_args(name, args, 1, Some(1)).map(|_| Value::Bool(!is_true(&args[0]))),
        "eq" => expect_args(name, args, 2, None)
            .map(|_| Value::Bool(args[1..].iter().any(|v| values_equal(&args[0], v)))),
        "ne" => expect_args(name, args, 2, Some(2)).map(|_| Value::Bool(!values_equal(&args[0], &args[1]))),
        "len" => expect_args(name, args, 1, Some(1)).and_then(|_| length(&args[0])),
        "index" => expect_args(name, args, 1, None).and_then(|_| index(&args[0], &args[1..])),
        "print" => Ok(Value::String(sprint(args))),
        "println" => Ok(Value::String(sprintln(args))),
        "html" => Ok(Value::String(escape_xml(sprint(args)))),
        _ => return None,
    };
    Some(result)
}

fn length(value: &Value) -> Result<Value, String> {
    let len = match value {
        Value::String(s) => s.len(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(format!("len of {}", type_name(other))),
    };
    Ok(Value::from(len as u64))
}

fn index(item: &Value, keys: &[Value]) -> Result<Value, String> {
    let mut current = item.clone();
    for key in keys {
        current = match (&current, key) {
            (Value::Array(items), Value::Number(n)) => {
                let i = n
                    .as_u64()
                    .ok_or_else(|| format!("cannot index slice with {n}"))?;
                items
                    .get(i as usize)
                    .cloned()
                    .ok_or_else(|| format!("index out of range: {i}"))?
            },
            (Value::Object(map), Value::String(k)) => map.get(k).cloned().unwrap_or(Value::Null),
            (Value::Null, _) => return Err("index of untyped nil".to_string()),
            (container, key) => {
                return Err(format!(
                    "cannot index {} with {}",
                    type_name(container),
                    type_name(key)
                ));
            },
        };
    }
    Ok(current)
}

/// Operands are joined with a space when neither side is a string.
fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 && !args[i - 1].is_string() && !arg.is_string() {
            out.push(' ');
        }
        out.push_str(&display(arg));
    }
    out
}

fn sprintln(args: &[Value]) -> String {
    let mut out = args.iter().map(display).collect::<Vec<_>>().join(" ");
    out.push('\n');
    out
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}
