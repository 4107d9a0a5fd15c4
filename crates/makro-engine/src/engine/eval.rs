//! Rhai engine creation and formula evaluation.
//!
//! The evaluator only ever sees fully literal scripts: references have been
//! replaced by the preprocessor using [`to_literal`]. Its result is converted
//! back into a [`Value`] with [`from_dynamic`], and every Rhai failure is
//! reported as [`EngineError::EvaluationError`].

use rhai::{Array, Dynamic, Engine};

use super::AST;
use super::cell::Value;
use crate::error::{EngineError, Result};

/// Literal standing in for a blank cell: Rhai's unit value.
pub const NO_VALUE: &str = "()";

/// A Rhai engine with built-ins registered, plus optional user functions.
pub struct Evaluator {
    engine: Engine,
    custom_ast: Option<AST>,
}

impl Evaluator {
    /// Create an evaluator with built-ins registered.
    pub fn new() -> Evaluator {
        let mut engine = Engine::new();
        crate::builtins::register_builtins(&mut engine);
        Evaluator {
            engine,
            custom_ast: None,
        }
    }

    /// Create an evaluator and compile custom functions from `script`.
    pub fn with_functions(script: &str) -> Result<Evaluator> {
        let mut evaluator = Evaluator::new();
        evaluator.set_functions(Some(script))?;
        Ok(evaluator)
    }

    /// Replace the custom functions. On a compile error the previous
    /// functions stay in place.
    pub fn set_functions(&mut self, script: Option<&str>) -> Result<()> {
        self.custom_ast = match script {
            Some(script) => Some(self.engine.compile(script).map_err(|e| {
                EngineError::EvaluationError(format!("Error in custom functions: {}", e))
            })?),
            None => None,
        };
        Ok(())
    }

    /// Bound the number of operations a single formula may run.
    pub fn set_max_operations(&mut self, operations: u64) {
        self.engine.set_max_operations(operations);
    }

    /// Evaluate a literalized script. `Ok(None)` means the script produced
    /// no value.
    pub fn evaluate(&self, script: &str) -> Result<Option<Value>> {
        let result = match &self.custom_ast {
            Some(ast) => self
                .engine
                .compile(script)
                .map_err(|e| e.to_string())
                .and_then(|formula_ast| {
                    let merged = ast.merge(&formula_ast);
                    self.engine
                        .eval_ast::<Dynamic>(&merged)
                        .map_err(|e| e.to_string())
                }),
            None => self.engine.eval::<Dynamic>(script).map_err(|e| e.to_string()),
        };
        result
            .map(from_dynamic)
            .map_err(EngineError::EvaluationError)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a Rhai result into an engine value. Unit becomes `None` (or empty
/// text inside an array); types with no engine counterpart (maps, function
/// pointers, ...) become their text.
pub fn from_dynamic(value: Dynamic) -> Option<Value> {
    if value.is_unit() {
        return None;
    }
    if let Ok(n) = value.as_int() {
        return Some(Value::Int(n));
    }
    if let Ok(n) = value.as_float() {
        return Some(Value::Float(n));
    }
    if let Ok(b) = value.as_bool() {
        return Some(Value::Bool(b));
    }
    if let Ok(c) = value.as_char() {
        return Some(Value::Text(c.to_string()));
    }
    if value.is_string() {
        return value.into_string().ok().map(Value::Text);
    }
    if value.is_array() {
        let items: Array = value.cast();
        return Some(Value::List(
            items
                .into_iter()
                .map(|item| from_dynamic(item).unwrap_or_else(|| Value::Text(String::new())))
                .collect(),
        ));
    }
    Some(Value::Text(value.to_string()))
}

/// Render a value as Rhai source that evaluates back to the same value.
pub fn to_literal(value: &Value) -> String {
    match value {
        // i64::MIN has no positive counterpart for Rhai's unary minus.
        Value::Int(i64::MIN) => format!("({} - 1)", i64::MIN + 1),
        Value::Int(n) if *n < 0 => format!("({})", n),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => float_literal(*n),
        Value::Bool(b) => b.to_string(),
        Value::Text(s) => string_literal(s),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(to_literal).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

fn float_literal(n: f64) -> String {
    if n.is_nan() {
        return "NAN()".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "INF()" } else { "(-INF())" }.to_string();
    }
    // Debug keeps a fractional part ("42.0") so Rhai reads a float back.
    let mut text = format!("{:?}", n.abs());
    if let Some(exp) = text.find('e')
        && !text[..exp].contains('.')
    {
        text.insert_str(exp, ".0");
    }
    if n.is_sign_negative() {
        format!("(-{})", text)
    } else {
        text
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}
