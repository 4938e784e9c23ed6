//! Reduce editor metadata to the runtime schema a component needs at render time.
//!
//! Component metadata is written for the editor: labels, hints, descriptions,
//! and several historical ways of declaring the same thing. The runtime only
//! needs a small subset. Each output field has its own rule below, and each
//! rule consults its sources in a fixed priority:
//!
//! | Output         | Sources, highest priority first                        |
//! |----------------|--------------------------------------------------------|
//! | `background`   | `background` when truthy                               |
//! | `data`         | `data` string, or `data.entity`                        |
//! | `schemas`      | `data.schemas`, then `schemas`                         |
//! | `defaults`     | `params.<name>.default` (`properties` is not read)     |
//! | `context`      | `context` object                                       |
//! | `initialState` | `initialState` object                                  |
//! | `inheritData`  | `data.inherit`, then `inheritData`, then `[data.type]` |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Render-time metadata of one component. Never empty when returned by
/// [`extract_runtime_schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DataBinding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit_data: Option<Value>,
}

impl RuntimeSchema {
    /// Whether no rule produced output.
    pub const fn is_empty(&self) -> bool {
        self.background.is_none()
            && self.data.is_none()
            && self.schemas.is_none()
            && self.defaults.is_none()
            && self.context.is_none()
            && self.initial_state.is_none()
            && self.inherit_data.is_none()
    }
}

/// Entity binding: which collection a component renders and how many items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBinding {
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Serialized as `null` when absent
    pub limit: Option<i64>,
}

/// Field keys the runtime reads; everything else is editor-only.
const RUNTIME_FIELD_KEYS: [&str; 5] = ["type", "default", "options", "of", "schema"];

/// Field types that collapse to a bare type-name string.
const SHORTHAND_TYPES: [&str; 3] = ["string", "number", "boolean"];

/// Extract the runtime schema from full component metadata.
///
/// Returns `None` when the metadata is not an object or no rule produced
/// output.
///
/// ```rust
/// use serde_json::json;
/// use sitekit_cli::schema::extract_runtime_schema;
///
/// let schema = extract_runtime_schema(&json!({"data": "articles:5"})).unwrap();
/// let data = schema.data.as_ref().unwrap();
/// assert_eq!(data.entity_type, "articles");
/// assert_eq!(data.limit, Some(5));
/// assert_eq!(schema.inherit_data, Some(json!(["articles"])));
///
/// assert!(extract_runtime_schema(&json!({"title": "Hero", "category": "layout"})).is_none());
/// ```
pub fn extract_runtime_schema(meta: &Value) -> Option<RuntimeSchema> {
    let meta = meta.as_object()?;

    let data = data_rule(meta);
    let inherit_data = inherit_data_rule(meta, data.as_ref());
    let schema = RuntimeSchema {
        background: background_rule(meta),
        data,
        schemas: schemas_rule(meta),
        defaults: defaults_rule(meta),
        context: object_field(meta, "context"),
        initial_state: object_field(meta, "initialState"),
        inherit_data,
    };

    (!schema.is_empty()).then_some(schema)
}

fn data_object(meta: &Map<String, Value>) -> Option<&Map<String, Value>> {
    meta.get("data").and_then(Value::as_object)
}

fn background_rule(meta: &Map<String, Value>) -> Option<Value> {
    meta.get("background").filter(|v| is_truthy(v)).cloned()
}

fn data_rule(meta: &Map<String, Value>) -> Option<DataBinding> {
    match meta.get("data")? {
        Value::String(s) => parse_data_string(s),
        Value::Object(obj) => obj.get("entity").and_then(Value::as_str).and_then(parse_data_string),
        _ => None,
    }
}

fn schemas_rule(meta: &Map<String, Value>) -> Option<Map<String, Value>> {
    let source = data_object(meta)
        .and_then(|data| data.get("schemas"))
        .filter(|v| !v.is_null())
        .or_else(|| meta.get("schemas"))?;
    reduce_schemas(source)
}

fn defaults_rule(meta: &Map<String, Value>) -> Option<Map<String, Value>> {
    let params = meta.get("params")?.as_object()?;
    let defaults: Map<String, Value> = params
        .iter()
        .filter_map(|(name, param)| {
            let default = param.as_object()?.get("default")?;
            Some((name.clone(), default.clone()))
        })
        .collect();
    non_empty(defaults)
}

fn inherit_data_rule(meta: &Map<String, Value>, data: Option<&DataBinding>) -> Option<Value> {
    let explicit = data_object(meta)
        .and_then(|data| data.get("inherit"))
        .filter(|v| !v.is_null())
        .or_else(|| meta.get("inheritData").filter(|v| !v.is_null()));

    match explicit {
        Some(value) => Some(value.clone()),
        None => data.map(|binding| Value::Array(vec![Value::String(binding.entity_type.clone())])),
    }
}

fn object_field(meta: &Map<String, Value>, key: &str) -> Option<Map<String, Value>> {
    meta.get(key).and_then(Value::as_object).cloned()
}

/// Parse `"type"` or `"type:limit"`.
///
/// Whitespace around both parts is ignored. The limit is read like a leading
/// integer (`"5 items"` → 5); anything unparseable leaves it `None`. An empty
/// type yields `None`.
pub fn parse_data_string(input: &str) -> Option<DataBinding> {
    let (entity, limit) = match input.split_once(':') {
        Some((entity, limit)) => (entity.trim(), parse_leading_int(limit)),
        None => (input.trim(), None),
    };
    if entity.is_empty() {
        return None;
    }
    Some(DataBinding {
        entity_type: entity.to_string(),
        limit,
    })
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (sign, rest) = match text.as_bytes().first() {
        Some(b'-') => (-1, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    rest[..digits_end].parse::<i64>().ok().map(|n| sign * n)
}

/// Reduce a map of named schemas. Each entry is either full format
/// (`{name, fields: {...}}`) or an inline field map.
pub fn reduce_schemas(schemas: &Value) -> Option<Map<String, Value>> {
    let schemas = schemas.as_object()?;
    let reduced: Map<String, Value> = schemas
        .iter()
        .filter_map(|(name, schema)| {
            let fields = match schema.get("fields") {
                Some(Value::Object(fields)) => fields,
                _ => schema.as_object()?,
            };
            reduce_fields(fields).map(|fields| (name.clone(), Value::Object(fields)))
        })
        .collect();
    non_empty(reduced)
}

fn reduce_fields(fields: &Map<String, Value>) -> Option<Map<String, Value>> {
    let reduced: Map<String, Value> = fields
        .iter()
        .filter_map(|(name, field)| reduce_field(field).map(|field| (name.clone(), field)))
        .collect();
    non_empty(reduced)
}

/// Reduce one field definition to its runtime keys.
///
/// A field left with only a simple `type` collapses to the type name, so
/// `{"type": "string", "label": "Title"}` becomes `"string"`. Returns `None`
/// when nothing runtime-relevant remains.
///
/// ```rust
/// use serde_json::json;
/// use sitekit_cli::schema::reduce_field;
///
/// assert_eq!(reduce_field(&json!({"type": "string", "label": "Title"})), Some(json!("string")));
/// assert_eq!(
///     reduce_field(&json!({"type": "select", "options": ["a", "b"], "hint": "pick"})),
///     Some(json!({"type": "select", "options": ["a", "b"]}))
/// );
/// assert_eq!(reduce_field(&json!({"label": "Only a label"})), None);
/// ```
pub fn reduce_field(field: &Value) -> Option<Value> {
    let field = match field {
        Value::String(type_name) if !type_name.is_empty() => return Some(field.clone()),
        Value::Object(field) => field,
        _ => return None,
    };

    let mut reduced = Map::new();
    for key in RUNTIME_FIELD_KEYS {
        let Some(value) = field.get(key) else {
            continue;
        };
        let value = match (key, value) {
            ("of", _) => reduce_field(value),
            ("schema", Value::Object(nested)) => reduce_fields(nested).map(Value::Object),
            _ => Some(value.clone()),
        };
        if let Some(value) = value {
            reduced.insert(key.to_string(), value);
        }
    }

    if reduced.len() == 1 {
        if let Some(Value::String(type_name)) = reduced.get("type") {
            if SHORTHAND_TYPES.contains(&type_name.as_str()) {
                return Some(Value::String(type_name.clone()));
            }
        }
    }

    (!reduced.is_empty()).then_some(Value::Object(reduced))
}

fn non_empty(map: Map<String, Value>) -> Option<Map<String, Value>> {
    (!map.is_empty()).then_some(map)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
