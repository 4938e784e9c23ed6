//! Post-processing of fetched payloads: transform, filter, sort, limit.
//!
//! When a descriptor asks for several stages they always run in the same order:
//!
//! ```text
//! raw payload -> transform -> filter -> sort -> limit -> data
//! ```
//!
//! so `limit` means "top N of the filtered, sorted set".
//!
//! # Expression grammar
//!
//! Filter: `<field> <op> <value>` with `op` one of `==`, `!=`, `>`, `<`, `>=`,
//! `<=`, `contains`. Fields are dotted paths (`author.name`). Values are
//! `true`, `false`, `null`, numbers, quoted strings, or bare words.
//!
//! Sort: comma-separated `<field> [asc|desc]` clauses; earlier clauses win,
//! later ones break ties.
//!
//! Expressions written by content authors are not trusted to be well formed.
//! A malformed filter or sort logs a warning and leaves the data unchanged.

use serde_json::{Number, Value};
use std::cmp::Ordering;
use std::sync::OnceLock;
use tracing::warn;

use regex::Regex;

use super::FetchDescriptor;

/// Look up a dotted path, walking objects by key and arrays by index.
///
/// An empty path returns the value itself.
///
/// ```rust
/// use serde_json::json;
/// use sitekit_cli::fetch::query::get_nested;
///
/// let payload = json!({"data": {"items": [{"id": 7}]}});
/// assert_eq!(get_nested(&payload, "data.items.0.id"), Some(&json!(7)));
/// assert_eq!(get_nested(&payload, "data.missing"), None);
/// ```
pub fn get_nested<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

/// Extract the sub-value at `transform` from a raw payload.
///
/// A path that does not exist yields an empty array (with a warning), so an
/// API that changed its envelope looks like an empty collection downstream.
pub fn apply_transform(data: Value, transform: &str) -> Value {
    if transform.trim().is_empty() {
        return data;
    }
    match get_nested(&data, transform) {
        Some(inner) => inner.clone(),
        None => {
            warn!("Transform path '{}' not found in fetched data", transform);
            Value::Array(Vec::new())
        }
    }
}

/// Keep the items matching a filter expression, preserving their order.
///
/// Non-array input and empty or malformed expressions return the data unchanged.
pub fn apply_filter(data: &Value, filter: &str) -> Value {
    let Value::Array(items) = data else {
        return data.clone();
    };
    if filter.trim().is_empty() {
        return data.clone();
    }
    let Some(expr) = FilterExpr::parse(filter) else {
        warn!("Ignoring malformed filter expression '{}'", filter);
        return data.clone();
    };
    Value::Array(items.iter().filter(|item| expr.matches(item)).cloned().collect())
}

/// Return a sorted copy of the items; the input is left untouched.
///
/// Sorting is stable. Non-array input and empty or malformed expressions return
/// the data unchanged.
pub fn apply_sort(data: &Value, sort: &str) -> Value {
    let Value::Array(items) = data else {
        return data.clone();
    };
    if sort.trim().is_empty() {
        return data.clone();
    }
    let Some(keys) = parse_sort(sort) else {
        warn!("Ignoring malformed sort expression '{}'", sort);
        return data.clone();
    };

    let mut sorted = items.clone();
    sorted.sort_by(|a, b| {
        keys.iter()
            .map(|key| {
                let ordering = compare_values(get_nested(a, &key.field), get_nested(b, &key.field));
                if key.descending { ordering.reverse() } else { ordering }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    Value::Array(sorted)
}

/// Keep the first `limit` items. `limit <= 0` and non-array input are no-ops.
pub fn apply_limit(data: &Value, limit: i64) -> Value {
    match data {
        Value::Array(items) if limit > 0 => {
            let n = usize::try_from(limit).unwrap_or(usize::MAX);
            Value::Array(items.iter().take(n).cloned().collect())
        }
        _ => data.clone(),
    }
}

/// Run every stage a descriptor requests, in pipeline order.
pub fn apply_post_processing(data: Value, descriptor: &FetchDescriptor) -> Value {
    let mut data = match descriptor.transform.as_deref() {
        Some(transform) => apply_transform(data, transform),
        None => data,
    };
    if let Some(filter) = descriptor.filter.as_deref() {
        data = apply_filter(&data, filter);
    }
    if let Some(sort) = descriptor.sort.as_deref() {
        data = apply_sort(&data, sort);
    }
    if let Some(limit) = descriptor.limit {
        data = apply_limit(&data, limit);
    }
    data
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Contains,
}

#[derive(Debug)]
struct FilterExpr {
    field: String,
    op: FilterOp,
    value: Value,
}

fn filter_regex() -> Option<&'static Regex> {
    static FILTER_RE: OnceLock<Option<Regex>> = OnceLock::new();
    FILTER_RE
        .get_or_init(|| Regex::new(r"^\s*(\S+)\s+(==|!=|>=|<=|>|<|contains)\s+(.+?)\s*$").ok())
        .as_ref()
}

impl FilterExpr {
    fn parse(expr: &str) -> Option<Self> {
        let caps = filter_regex()?.captures(expr)?;
        let op = match &caps[2] {
            "==" => FilterOp::Eq,
            "!=" => FilterOp::Ne,
            ">" => FilterOp::Gt,
            "<" => FilterOp::Lt,
            ">=" => FilterOp::Ge,
            "<=" => FilterOp::Le,
            "contains" => FilterOp::Contains,
            _ => return None,
        };
        Some(Self {
            field: caps[1].to_string(),
            op,
            value: parse_literal(&caps[3]),
        })
    }

    fn matches(&self, item: &Value) -> bool {
        static NULL: Value = Value::Null;
        let actual = get_nested(item, &self.field).unwrap_or(&NULL);
        match self.op {
            FilterOp::Eq => loose_eq(actual, &self.value),
            FilterOp::Ne => !loose_eq(actual, &self.value),
            FilterOp::Gt => ordered(actual, &self.value).is_some_and(Ordering::is_gt),
            FilterOp::Lt => ordered(actual, &self.value).is_some_and(Ordering::is_lt),
            FilterOp::Ge => ordered(actual, &self.value).is_some_and(Ordering::is_ge),
            FilterOp::Le => ordered(actual, &self.value).is_some_and(Ordering::is_le),
            FilterOp::Contains => match actual {
                Value::Array(elements) => elements.contains(&self.value),
                Value::String(s) => s.contains(literal_text(&self.value).as_str()),
                _ => false,
            },
        }
    }
}

/// Parse the right-hand side of a filter into a JSON value.
fn parse_literal(raw: &str) -> Value {
    let raw = raw.trim();
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Value::String(raw[1..raw.len() - 1].to_string());
        }
    }
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        "null" => return Value::Null,
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}

fn literal_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Equality that lets a number match its string spelling (`"2024" == 2024`).
fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.trim().parse::<f64>().ok() == n.as_f64()
        }
        (Value::String(s), Value::Bool(b)) | (Value::Bool(b), Value::String(s)) => s == &b.to_string(),
        _ => actual == expected,
    }
}

/// Ordering for `>`/`<` filters. Numeric strings compare with numbers the same
/// way [`loose_eq`] matches them; other mixed types are unordered.
fn ordered(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(s), Value::Number(n)) => s.trim().parse::<f64>().ok()?.partial_cmp(&n.as_f64()?),
        (Value::Number(n), Value::String(s)) => n.as_f64()?.partial_cmp(&s.trim().parse::<f64>().ok()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
struct SortKey {
    field: String,
    descending: bool,
}

fn parse_sort(expr: &str) -> Option<Vec<SortKey>> {
    expr.split(',')
        .map(|clause| {
            let mut parts = clause.split_whitespace();
            let field = parts.next()?.to_string();
            let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => false,
                Some("desc") => true,
                Some(_) => return None,
            };
            if parts.next().is_some() {
                return None;
            }
            Some(SortKey {
                field,
                descending,
            })
        })
        .collect()
}

/// Total order for sort keys: numbers, strings, booleans, other values, then
/// missing/null.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            Some(Value::Number(_)) => 0,
            Some(Value::String(_)) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Array(_) | Value::Object(_)) => 3,
            Some(Value::Null) | None => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().unwrap_or_default().total_cmp(&y.as_f64().unwrap_or_default())
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
