// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `$interpolated` template substitution (§4.4): `${name}` and
//! `${<base: property: ...>}` placeholders resolved against the context.

use aro_core::{ExecutionContext, Value};

use crate::ExprError;

pub fn interpolate(template: &str, ctx: &ExecutionContext) -> Result<String, ExprError> {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            let close = template[i + 2..]
                .find('}')
                .map(|p| i + 2 + p)
                .ok_or_else(|| ExprError::Interpolation(template.to_string()))?;
            let placeholder = &template[i + 2..close];
            out.push_str(&resolve_placeholder(placeholder, ctx)?);
            i = close + 1;
        } else {
            let ch = template[i..].chars().next().unwrap_or('\0');
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    Ok(out)
}

fn resolve_placeholder(placeholder: &str, ctx: &ExecutionContext) -> Result<String, ExprError> {
    let trimmed = placeholder.trim();
    let (base, segments): (&str, Vec<String>) = if let Some(inner) = trimmed.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        let mut parts = inner.split(':').map(str::trim);
        let base = parts.next().ok_or_else(|| ExprError::Interpolation(placeholder.to_string()))?;
        (base, parts.map(str::to_string).collect())
    } else {
        (trimmed, Vec::new())
    };

    let value = ctx.resolve(base).ok_or_else(|| ExprError::UnknownVariable(base.to_string()))?;
    let value = if segments.is_empty() {
        value
    } else {
        value
            .get_path(&segments)
            .cloned()
            .ok_or_else(|| ExprError::UnknownVariable(format!("{base}.{}", segments.join("."))))?
    };
    Ok(render(&value))
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_json().to_string(),
    }
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
