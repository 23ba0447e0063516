//! Field-wise merging of stored records over defaults.
//!
//! Records written by older versions lack fields added later. Merging them
//! over a complete default record fills those fields in without a migration.

use serde_json::Value;

/// Overlay `stored` onto `defaults`, field by field.
///
/// Objects are merged recursively so nested objects keep their own defaults.
/// Any other stored value replaces the default. `null` fields are treated as
/// absent. A stored value that is not an object leaves the defaults untouched.
pub fn merge_defaults(defaults: &mut Value, stored: Value) {
    let (Value::Object(target), Value::Object(overlay)) = (defaults, stored) else {
        return;
    };

    for (key, value) in overlay {
        if value.is_null() {
            continue;
        }

        let nested = value.is_object() && target.get(&key).is_some_and(Value::is_object);
        if nested {
            if let Some(existing) = target.get_mut(&key) {
                merge_defaults(existing, value);
            }
        } else {
            target.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_overlay_keeps_defaults() {
        let mut defaults = json!({ "a": 1, "nested": { "b": 2 } });
        merge_defaults(&mut defaults, json!({}));
        assert_eq!(defaults, json!({ "a": 1, "nested": { "b": 2 } }));
    }

    #[test]
    fn test_nested_objects_merge_field_by_field() {
        let mut defaults = json!({
            "prefix": "INV",
            "branding": { "logo": "", "color": "#fff" },
            "pdf": { "scale": 1, "fit": true }
        });

        merge_defaults(
            &mut defaults,
            json!({ "prefix": "ACME", "branding": { "color": "#000" } }),
        );

        assert_eq!(
            defaults,
            json!({
                "prefix": "ACME",
                "branding": { "logo": "", "color": "#000" },
                "pdf": { "scale": 1, "fit": true }
            })
        );
    }

    #[test]
    fn test_null_and_unknown_fields() {
        let mut defaults = json!({ "prefix": "INV" });
        merge_defaults(&mut defaults, json!({ "prefix": null, "extra": [1, 2] }));
        assert_eq!(defaults, json!({ "prefix": "INV", "extra": [1, 2] }));
    }

    #[test]
    fn test_non_object_overlay_is_ignored() {
        let mut defaults = json!({ "prefix": "INV" });
        merge_defaults(&mut defaults, json!("garbage"));
        assert_eq!(defaults, json!({ "prefix": "INV" }));
    }

    #[test]
    fn test_scalar_replaces_object_default() {
        let mut defaults = json!({ "branding": { "logo": "" } });
        merge_defaults(&mut defaults, json!({ "branding": "flat" }));
        assert_eq!(defaults, json!({ "branding": "flat" }));
    }
}
