//! Parameter binding for the in-memory route table.
//!
//! Values are read from the declared source and converted to the declared
//! kind. Missing or unconvertible values bind as null and record a
//! validation error; only an unreadable JSON body is a binding fault.

use serde_json::{Map, Value};

use crate::pipeline::{
    BindingContext, BindingSource, BoundArguments, ParameterKind, PipelineFault, ValidationState,
};

/// Validation message recorded for a missing required parameter.
pub const REQUIRED: &str = "required";

/// Bind every declared parameter of `ctx.action`.
pub fn bind_parameters(
    ctx: BindingContext<'_>,
    validation: &mut ValidationState,
) -> Result<BoundArguments, PipelineFault> {
    let needs_body = ctx
        .action
        .parameters
        .iter()
        .any(|p| p.source == BindingSource::Body);
    let body = if needs_body { parse_body(ctx)? } else { None };

    let mut arguments = BoundArguments::new();
    for param in &ctx.action.parameters {
        let raw = match param.source {
            BindingSource::Route => ctx.route.values.get(&param.name).cloned().map(Raw::Text),
            BindingSource::Query => ctx.request.query_param(&param.name).map(Raw::Text),
            BindingSource::Header => ctx.request.header(&param.name).map(|v| Raw::Text(v.to_string())),
            BindingSource::Body => body
                .as_ref()
                .and_then(|b| b.get(&param.name))
                .filter(|v| !v.is_null())
                .cloned()
                .map(Raw::Json),
        };

        let value = match raw {
            Some(raw) => match convert(raw, param.kind) {
                Ok(v) => v,
                Err(message) => {
                    validation.add_error(param.name.clone(), message);
                    Value::Null
                }
            },
            None => {
                if param.required {
                    validation.add_error(param.name.clone(), REQUIRED);
                }
                Value::Null
            }
        };
        arguments.insert(param.name.clone(), value);
    }

    Ok(arguments)
}

enum Raw {
    Text(String),
    Json(Value),
}

fn parse_body(ctx: BindingContext<'_>) -> Result<Option<Map<String, Value>>, PipelineFault> {
    let bytes = ctx.request.body();
    if bytes.is_empty() {
        return Ok(None);
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(PipelineFault::new("request body must be a JSON object")),
        Err(e) => Err(PipelineFault::new(format!("request body is not valid JSON: {}", e))),
    }
}

fn convert(raw: Raw, kind: ParameterKind) -> Result<Value, String> {
    match (raw, kind) {
        (Raw::Json(v), ParameterKind::Json) => Ok(v),
        (Raw::Text(s), ParameterKind::Json) => {
            Ok(serde_json::from_str(&s).unwrap_or(Value::String(s)))
        }
        (Raw::Text(s), ParameterKind::String) => Ok(Value::String(s)),
        (Raw::Json(Value::String(s)), ParameterKind::String) => Ok(Value::String(s)),
        (Raw::Json(_), ParameterKind::String) => Err("expected a string".to_string()),
        (Raw::Text(s), ParameterKind::Int) | (Raw::Json(Value::String(s)), ParameterKind::Int) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("'{}' is not a valid integer", s)),
        (Raw::Json(v), ParameterKind::Int) => v
            .as_i64()
            .map(Value::from)
            .ok_or_else(|| "expected an integer".to_string()),
        (Raw::Text(s), ParameterKind::Float) | (Raw::Json(Value::String(s)), ParameterKind::Float) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(|f| serde_json::Number::from_f64(f).map(Value::Number))
            .ok_or_else(|| format!("'{}' is not a valid number", s)),
        (Raw::Json(v), ParameterKind::Float) => v
            .as_f64()
            .map(Value::from)
            .ok_or_else(|| "expected a number".to_string()),
        (Raw::Text(s), ParameterKind::Bool) | (Raw::Json(Value::String(s)), ParameterKind::Bool) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(format!("'{}' is not a valid boolean", s)),
            }
        }
        (Raw::Json(v), ParameterKind::Bool) => v
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| "expected a boolean".to_string()),
    }
}
