//! Debugger-style text for dumped values.
//!
//! The output follows gdb's `set print pretty on`: one `label = value` per
//! line, nested composites indented by two spaces, arrays of scalars kept on
//! one line.

use core::fmt::Write;
use tilck_object::printer::{Composite, DisplayHint, Value};

use crate::commands::Outcome;

const INDENT: usize = 2;

pub fn render(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0);
    out
}

pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Dump {
            type_name,
            addr,
            value,
        } => format!("*(struct {} *){:#x} = {}", type_name, addr, render(value)),
        Outcome::Missing(what) => String::from(*what),
    }
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    // Writing into a String cannot fail.
    let _ = match value {
        Value::Bool(b) => write!(out, "{}", b),
        Value::Int(v) => write!(out, "{}", v),
        Value::UInt(v) => write!(out, "{}", v),
        Value::Ptr(p) => write!(out, "{:#x}", p),
        Value::Enum { name: Some(n), .. } => write!(out, "{}", n),
        Value::Enum { name: None, raw } => write!(out, "{}", raw),
        Value::Text(s) => write!(out, "{}", s),
        Value::Composite(c) => {
            write_composite(out, c, depth);
            Ok(())
        }
    };
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Composite(_))
}

fn write_composite(out: &mut String, c: &Composite, depth: usize) {
    if let Some(header) = &c.header {
        out.push_str(header);
        if c.children.is_empty() {
            return;
        }
        out.push(' ');
    }
    if c.children.is_empty() {
        out.push_str("{}");
        return;
    }
    if c.hint == DisplayHint::Array && c.children.iter().all(|f| is_scalar(&f.value)) {
        out.push('{');
        for (i, field) in c.children.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_value(out, &field.value, depth);
        }
        out.push('}');
        return;
    }
    out.push_str("{\n");
    let pad = " ".repeat((depth + 1) * INDENT);
    for (i, field) in c.children.iter().enumerate() {
        out.push_str(&pad);
        if c.hint == DisplayHint::Struct {
            out.push_str(&field.label);
            out.push_str(" = ");
        }
        write_value(out, &field.value, depth + 1);
        if i + 1 < c.children.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(depth * INDENT));
    out.push('}');
}
