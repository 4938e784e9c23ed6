//! Merging fetched data into content.
//!
//! Two operations:
//!
//! - [`merge_data_into_content`] stores fetched data at `data.<schema>` of a
//!   structured document, either replacing what is there or merging with it.
//! - [`attach_cascaded_data`] hands a cascade mapping down a section tree.
//!
//! Both are pure. Input content is never modified; callers receive new values.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

use super::{Cascade, Section};

/// Store `fetched` at `content.data[schema_key]`.
///
/// Returns `Cow::Borrowed(content)`, the same reference, when `fetched` is
/// absent or `null`, or when `schema_key` is empty. Otherwise returns a new
/// document:
///
/// - `merge == false`: the existing value is replaced.
/// - `merge == true`: two arrays are concatenated (existing first), two objects
///   are shallow-merged (fetched keys win), and any other combination takes
///   the fetched value.
///
/// A non-object `content` is treated as an empty object, as is a missing or
/// non-object `data` field.
///
/// ```rust
/// use serde_json::json;
/// use sitekit_cli::content::merge_data_into_content;
///
/// let content = json!({"data": {"team": [1]}});
/// let merged = merge_data_into_content(&content, Some(&json!([2])), "team", true);
/// assert_eq!(merged["data"]["team"], json!([1, 2]));
/// assert_eq!(content["data"]["team"], json!([1]));
/// ```
pub fn merge_data_into_content<'a>(
    content: &'a Value,
    fetched: Option<&Value>,
    schema_key: &str,
    merge: bool,
) -> Cow<'a, Value> {
    let Some(fetched) = fetched.filter(|value| !value.is_null()) else {
        return Cow::Borrowed(content);
    };
    if schema_key.is_empty() {
        return Cow::Borrowed(content);
    }

    let mut document = content.as_object().cloned().unwrap_or_default();
    let mut data = document.get("data").and_then(Value::as_object).cloned().unwrap_or_default();

    let value = if merge {
        combine(data.get(schema_key), fetched)
    } else {
        fetched.clone()
    };
    data.insert(schema_key.to_string(), value);
    document.insert("data".to_string(), Value::Object(data));

    Cow::Owned(Value::Object(document))
}

fn combine(existing: Option<&Value>, fetched: &Value) -> Value {
    match (existing, fetched) {
        (Some(Value::Array(current)), Value::Array(incoming)) => {
            Value::Array(current.iter().chain(incoming).cloned().collect())
        }
        (Some(Value::Object(current)), Value::Object(incoming)) => {
            let mut merged = current.clone();
            for (key, value) in incoming {
                merged.insert(key.clone(), value.clone());
            }
            Value::Object(merged)
        }
        _ => fetched.clone(),
    }
}

/// Union of two cascades, keys of `inner` winning.
///
/// When either side is empty the other `Arc` is returned as is, so siblings
/// keep sharing one mapping.
pub fn merge_cascade(outer: &Cascade, inner: &Cascade) -> Cascade {
    if outer.is_empty() || Arc::ptr_eq(outer, inner) {
        return Arc::clone(inner);
    }
    if inner.is_empty() {
        return Arc::clone(outer);
    }

    let mut merged: Map<String, Value> = (**outer).clone();
    for (key, value) in inner.iter() {
        merged.insert(key.clone(), value.clone());
    }
    Arc::new(merged)
}

/// Attach `cascade` to every section in a tree.
///
/// Each returned section carries its previous cascaded data united with
/// `cascade`, where `cascade` wins on key collisions. Children receive the
/// same `cascade` reference. The input tree is left untouched.
pub fn attach_cascaded_data(sections: &[Section], cascade: &Cascade) -> Vec<Section> {
    sections.iter().map(|section| attach_to_section(section, cascade)).collect()
}

fn attach_to_section(section: &Section, cascade: &Cascade) -> Section {
    Section {
        parsed_content: section.parsed_content.clone(),
        params: section.params.clone(),
        fetch: section.fetch.clone(),
        cascaded_data: merge_cascade(&section.cascaded_data, cascade),
        subsections: attach_cascaded_data(&section.subsections, cascade),
        extra: section.extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cascade(value: Value) -> Cascade {
        match value {
            Value::Object(map) => Arc::new(map),
            _ => panic!("cascade must be an object"),
        }
    }

    #[test]
    fn test_null_data_is_identity() {
        let content = json!({"data": {"team": [1]}});
        let result = merge_data_into_content(&content, None, "team", false);
        assert!(matches!(result, Cow::Borrowed(r) if std::ptr::eq(r, &content)));

        let result = merge_data_into_content(&content, Some(&Value::Null), "team", true);
        assert!(matches!(result, Cow::Borrowed(r) if std::ptr::eq(r, &content)));
    }

    #[test]
    fn test_empty_key_is_identity() {
        let content = json!({"title": "x"});
        let result = merge_data_into_content(&content, Some(&json!([1])), "", false);
        assert!(matches!(result, Cow::Borrowed(_)));
    }

    #[test]
    fn test_replace_mode() {
        let content = json!({"data": {"team": [{"n": "Local"}]}, "title": "Team"});
        let result = merge_data_into_content(&content, Some(&json!([{"n": "Remote"}])), "team", false);

        assert_eq!(result["data"]["team"], json!([{"n": "Remote"}]));
        assert_eq!(result["title"], json!("Team"));
        assert_eq!(content["data"]["team"], json!([{"n": "Local"}]));
    }

    #[test]
    fn test_merge_mode_concatenates_arrays() {
        let content = json!({"data": {"team": [1]}});
        let result = merge_data_into_content(&content, Some(&json!([2])), "team", true);
        assert_eq!(result["data"]["team"], json!([1, 2]));
    }

    #[test]
    fn test_merge_mode_shallow_merges_objects() {
        let content = json!({"data": {"stats": {"a": 1, "b": 2}}});
        let result = merge_data_into_content(&content, Some(&json!({"b": 3, "c": 4})), "stats", true);
        assert_eq!(result["data"]["stats"], json!({"a": 1, "b": 3, "c": 4}));
    }

    #[test]
    fn test_merge_mode_type_mismatch_takes_fetched() {
        let content = json!({"data": {"team": {"lead": "Ada"}}});
        let result = merge_data_into_content(&content, Some(&json!(["Linus"])), "team", true);
        assert_eq!(result["data"]["team"], json!(["Linus"]));
    }

    #[test]
    fn test_missing_data_field_is_created() {
        let content = json!({"title": "About"});
        let result = merge_data_into_content(&content, Some(&json!([1])), "team", true);
        assert_eq!(result.into_owned(), json!({"title": "About", "data": {"team": [1]}}));

        let result = merge_data_into_content(&Value::Null, Some(&json!([1])), "team", false);
        assert_eq!(result.into_owned(), json!({"data": {"team": [1]}}));
    }

    #[test]
    fn test_other_data_keys_untouched() {
        let content = json!({"data": {"team": [1], "events": [2]}});
        let result = merge_data_into_content(&content, Some(&json!([3])), "team", false);
        assert_eq!(result["data"], json!({"team": [3], "events": [2]}));
    }

    #[test]
    fn test_attach_cascade_reaches_every_node() {
        let tree = vec![Section {
            subsections: vec![Section {
                subsections: vec![Section::default()],
                ..Section::default()
            }],
            ..Section::default()
        }];
        let site = cascade(json!({"nav": ["home"]}));

        let attached = attach_cascaded_data(&tree, &site);

        assert_eq!(attached[0].cascaded_data["nav"], json!(["home"]));
        assert_eq!(attached[0].subsections[0].cascaded_data["nav"], json!(["home"]));
        assert_eq!(attached[0].subsections[0].subsections[0].cascaded_data["nav"], json!(["home"]));
        assert!(Arc::ptr_eq(&attached[0].cascaded_data, &site));
        assert!(tree[0].cascaded_data.is_empty());
    }

    #[test]
    fn test_attach_keeps_previous_keys_and_inner_wins() {
        let tree = vec![Section {
            cascaded_data: cascade(json!({"nav": ["home"], "article": {"slug": "old"}})),
            ..Section::default()
        }];
        let item = cascade(json!({"article": {"slug": "post-1"}}));

        let attached = attach_cascaded_data(&tree, &item);

        assert_eq!(attached[0].cascaded_data["nav"], json!(["home"]));
        assert_eq!(attached[0].cascaded_data["article"], json!({"slug": "post-1"}));
        assert_eq!(tree[0].cascaded_data["article"], json!({"slug": "old"}));
    }

    #[test]
    fn test_merge_cascade_shares_when_possible() {
        let empty = Cascade::default();
        let site = cascade(json!({"nav": []}));

        assert!(Arc::ptr_eq(&merge_cascade(&empty, &site), &site));
        assert!(Arc::ptr_eq(&merge_cascade(&site, &empty), &site));
    }
}
