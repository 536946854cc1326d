//! Declarative shape check for inbound post payloads.

use serde_json::Value;
use thiserror::Error;

/// JSON type a property must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Object,
}

impl JsonType {
    pub fn name(self) -> &'static str {
        match self {
            JsonType::String => "string",
            JsonType::Object => "object",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            JsonType::String => value.is_string(),
            JsonType::Object => value.is_object(),
        }
    }
}

/// A single failed check; the `Display` text is the client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("'{0}' is a required property")]
    Required(&'static str),

    #[error("{} is not of type '{}'", literal(.value), .expected.name())]
    WrongType { value: Value, expected: JsonType },
}

/// Render a value the way validation messages quote it: `None`, `True`,
/// single-quoted strings, `[1, 2]`, `{'k': v}`.
fn literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(&mut out, value);
    out
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(number) => out.push_str(&number.to_string()),
        Value::String(text) => write_quoted(out, text),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, item);
            }
            out.push(']');
        }
        Value::Object(fields) => {
            out.push('{');
            for (i, (key, item)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(out, key);
                out.push_str(": ");
                write_literal(out, item);
            }
            out.push('}');
        }
    }
}

/// Single quotes unless the text holds a `'` and no `"`.
fn write_quoted(out: &mut String, text: &str) {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    out.push(quote);
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() && (c as u32) < 0x100 => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Object schema: typed properties plus a list of required names.
///
/// Unlisted properties are ignored. Failures are reported one at a time:
/// missing required properties first, then type mismatches, each in
/// declaration order.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub properties: &'static [(&'static str, JsonType)],
    pub required: &'static [&'static str],
}

impl Schema {
    pub fn validate<'v>(&self, instance: &'v Value) -> Result<&'v Value, SchemaError> {
        let Some(object) = instance.as_object() else {
            return Err(SchemaError::WrongType {
                value: instance.clone(),
                expected: JsonType::Object,
            });
        };

        if let Some(missing) = self
            .required
            .iter()
            .find(|field| !object.contains_key(**field))
        {
            return Err(SchemaError::Required(*missing));
        }

        for (name, expected) in self.properties {
            if let Some(value) = object.get(*name) {
                if !expected.matches(value) {
                    return Err(SchemaError::WrongType {
                        value: value.clone(),
                        expected: *expected,
                    });
                }
            }
        }

        Ok(instance)
    }
}

/// Shape every created post must have.
pub const POST_SCHEMA: Schema = Schema {
    properties: &[("title", JsonType::String), ("body", JsonType::String)],
    required: &["title", "body"],
};
