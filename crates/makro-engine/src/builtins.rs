//! Built-in functions registered into every formula engine.
//!
//! Ranges reach Rhai as arrays, so the aggregate helpers take an `Array` and
//! flatten nested arrays. Non-numeric members (text, booleans, blanks) are
//! skipped, the same way a spreadsheet ignores text inside `SUM`.

use rhai::{Array, Dynamic, Engine, EvalAltResult, Position};

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

/// Collect the numeric members of a (possibly nested) array.
fn numbers(values: &Array) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    collect_numbers(values, &mut out);
    out
}

fn collect_numbers(values: &Array, out: &mut Vec<f64>) {
    for value in values {
        if let Ok(n) = value.as_float() {
            out.push(n);
        } else if let Ok(n) = value.as_int() {
            out.push(n as f64);
        } else if let Some(inner) = value.clone().try_cast::<Array>() {
            collect_numbers(&inner, out);
        }
    }
}

/// Integer sums stay integers so `SUM([1, 2])` prints `3`, not `3.0`.
fn sum(values: Array) -> Dynamic {
    let all_ints = values.iter().all(|v| v.is_int());
    if all_ints {
        let total = values
            .iter()
            .filter_map(|v| v.as_int().ok())
            .try_fold(0i64, |acc, n| acc.checked_add(n));
        if let Some(total) = total {
            return Dynamic::from(total);
        }
    }
    Dynamic::from(numbers(&values).iter().sum::<f64>())
}

fn avg(values: Array) -> Result<f64, Box<EvalAltResult>> {
    let nums = numbers(&values);
    if nums.is_empty() {
        return Err(invalid_arg("AVG of an empty range"));
    }
    Ok(nums.iter().sum::<f64>() / nums.len() as f64)
}

fn min(values: Array) -> Result<f64, Box<EvalAltResult>> {
    numbers(&values)
        .into_iter()
        .reduce(f64::min)
        .ok_or_else(|| invalid_arg("MIN of an empty range"))
}

fn max(values: Array) -> Result<f64, Box<EvalAltResult>> {
    numbers(&values)
        .into_iter()
        .reduce(f64::max)
        .ok_or_else(|| invalid_arg("MAX of an empty range"))
}

fn count(values: Array) -> i64 {
    numbers(&values).len() as i64
}

pub fn register_builtins(engine: &mut Engine) {
    engine.register_fn("SUM", sum);
    engine.register_fn("AVG", avg);
    engine.register_fn("AVERAGE", avg);
    engine.register_fn("MIN", min);
    engine.register_fn("MAX", max);
    engine.register_fn("COUNT", count);

    // Float literals the preprocessor cannot spell in Rhai syntax.
    engine.register_fn("NAN", || f64::NAN);
    engine.register_fn("INF", || f64::INFINITY);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        let mut engine = Engine::new();
        register_builtins(&mut engine);
        engine
    }

    #[test]
    fn test_sum_keeps_integers() {
        let result: i64 = engine().eval("SUM([1, 2, 3])").unwrap();
        assert_eq!(result, 6);
    }

    #[test]
    fn test_sum_mixed_and_nested() {
        let result: f64 = engine().eval(r#"SUM([1, 2.5, "x", [3, 4]])"#).unwrap();
        assert_eq!(result, 10.5);
    }

    #[test]
    fn test_aggregates() {
        let engine = engine();
        assert_eq!(engine.eval::<f64>("AVG([10, 20, 30])").unwrap(), 20.0);
        assert_eq!(engine.eval::<f64>("MIN([10, 20, 30])").unwrap(), 10.0);
        assert_eq!(engine.eval::<f64>("MAX([10, 20, 30])").unwrap(), 30.0);
        assert_eq!(engine.eval::<i64>("COUNT([10, (), \"a\", 30])").unwrap(), 2);
    }

    #[test]
    fn test_empty_range_errors() {
        let engine = engine();
        assert!(engine.eval::<f64>("AVG([])").is_err());
        assert!(engine.eval::<f64>("MAX([\"a\"])").is_err());
    }

    #[test]
    fn test_special_floats() {
        let engine = engine();
        assert!(engine.eval::<f64>("NAN()").unwrap().is_nan());
        assert_eq!(engine.eval::<f64>("-INF()").unwrap(), f64::NEG_INFINITY);
    }
}
