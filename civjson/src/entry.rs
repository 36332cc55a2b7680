use serde_json::Value;

/// A borrowed node of a raw parse tree.
///
/// Every accessor is lenient: a missing key, a `null`, or a value of the
/// wrong shape yields the supplied default (or `None`) instead of an error.
/// Scalars are coerced the way hand-edited data files need: numbers may be
/// quoted, booleans may be spelled `"true"`/`"false"`, and a number read as
/// a string gives its decimal text.
#[derive(Debug, Clone, Copy)]
pub struct RawEntry<'a> {
    value: &'a Value,
}

impl<'a> RawEntry<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The underlying JSON value.
    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn is_object(&self) -> bool {
        self.value.is_object()
    }

    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    /// The non-blank `"name"` property, if any.
    pub fn name(&self) -> Option<&'a str> {
        self.value
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }

    /// True when `key` is present and not `null`.
    pub fn has(&self, key: &str) -> bool {
        self.value.get(key).is_some_and(|v| !v.is_null())
    }

    pub fn child(&self, key: &str) -> Option<RawEntry<'a>> {
        self.value
            .get(key)
            .filter(|v| !v.is_null())
            .map(RawEntry::new)
    }

    /// Array elements in order; empty for anything that is not an array.
    pub fn elements(self) -> impl Iterator<Item = RawEntry<'a>> + 'a {
        self.value
            .as_array()
            .into_iter()
            .flatten()
            .map(RawEntry::new)
    }

    /// Object members in file order; empty for anything that is not an object.
    pub fn fields(self) -> impl Iterator<Item = (&'a str, RawEntry<'a>)> + 'a {
        self.value
            .as_object()
            .into_iter()
            .flatten()
            .map(|(k, v)| (k.as_str(), RawEntry::new(v)))
    }

    pub fn as_string(&self) -> Option<String> {
        match self.value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integers, also spelled as a string or as an integral float (`2.0`).
    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            Value::Number(n) => n
                .as_i64()
                .and_then(|i| i32::try_from(i).ok())
                .or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            Value::Number(n) => n.as_f64().map(|f| f as f32),
            Value::String(s) => s.trim().parse::<f32>().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.child(key)
            .and_then(|c| c.as_string())
            .unwrap_or_else(|| default.to_string())
    }

    /// The string at `key`, or `None` when it is missing or blank.
    pub fn get_string_or_none(&self, key: &str) -> Option<String> {
        self.child(key)
            .and_then(|c| c.as_string())
            .filter(|s| !s.trim().is_empty())
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.child(key).and_then(|c| c.as_int()).unwrap_or(default)
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.child(key).and_then(|c| c.as_float()).unwrap_or(default)
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.child(key).and_then(|c| c.as_bool()).unwrap_or(default)
    }

    /// Non-blank string elements of the array at `key`.
    pub fn get_string_array(&self, key: &str) -> Vec<String> {
        self.child(key)
            .map(|c| {
                c.elements()
                    .filter_map(|e| e.as_string())
                    .filter(|s| !s.trim().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get_int_array(&self, key: &str) -> Vec<i32> {
        self.child(key)
            .map(|c| c.elements().filter_map(|e| e.as_int()).collect())
            .unwrap_or_default()
    }

    /// Members of the nested object at `key`, in file order.
    pub fn get_map(&self, key: &str) -> Option<Vec<(&'a str, RawEntry<'a>)>> {
        self.child(key)
            .filter(|c| c.is_object())
            .map(|c| c.fields().collect())
    }

    /// A counter-like nested object: `{ "Great Scientist": 3 }`.
    ///
    /// Members may also be written as `{ "value": 3 }`. Blank keys are
    /// dropped and unreadable amounts count as zero.
    pub fn get_counter(&self, key: &str) -> Option<Vec<(String, i32)>> {
        let members = self.get_map(key)?;
        Some(
            members
                .into_iter()
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| {
                    let amount = if v.is_object() {
                        v.get_int("value", 0)
                    } else {
                        v.as_int().unwrap_or(0)
                    };
                    (k.to_string(), amount)
                })
                .collect(),
        )
    }
}

fn integral(f: f64) -> Option<i32> {
    if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) {
        Some(f as i32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_coercion() {
        let v = json!({
            "cost": "40",
            "movement": 2.0,
            "isWonder": "true",
            "science": "1.5",
            "quote": 12
        });
        let e = RawEntry::new(&v);

        assert_eq!(e.get_int("cost", -1), 40);
        assert_eq!(e.get_int("movement", 0), 2);
        assert!(e.get_bool("isWonder", false));
        assert_eq!(e.get_float("science", 0.0), 1.5);
        assert_eq!(e.get_string("quote", ""), "12");
    }

    #[test]
    fn test_fractional_int_is_rejected() {
        let v = json!({ "range": 1.5, "cost": "2.5", "movement": "3.0" });
        let e = RawEntry::new(&v);

        assert_eq!(e.get_int("range", -1), -1);
        assert_eq!(e.get_int("cost", -1), -1);
        assert_eq!(e.get_int("movement", 0), 3);
    }

    #[test]
    fn test_defaults_on_missing_or_malformed() {
        let v = json!({ "cost": [1, 2], "name": "   ", "requiredTech": null });
        let e = RawEntry::new(&v);

        assert_eq!(e.get_int("cost", -1), -1);
        assert_eq!(e.get_int("strength", 7), 7);
        assert_eq!(e.name(), None);
        assert!(!e.has("requiredTech"));
        assert_eq!(e.get_string_or_none("requiredTech"), None);
        assert!(e.get_string_array("promotions").is_empty());
    }

    #[test]
    fn test_arrays_skip_blank_items() {
        let v = json!({ "uniques": ["A", "", "  ", "B"], "RGB": [10, "20", "x", 30] });
        let e = RawEntry::new(&v);

        assert_eq!(e.get_string_array("uniques"), vec!["A", "B"]);
        assert_eq!(e.get_int_array("RGB"), vec![10, 20, 30]);
    }

    #[test]
    fn test_counter_forms() {
        let v = json!({
            "greatPersonPoints": { "Great Scientist": 3, "Great Engineer": { "value": 2 }, "": 9, "Broken": "x" }
        });
        let e = RawEntry::new(&v);

        let counter = e.get_counter("greatPersonPoints").unwrap();
        assert_eq!(
            counter,
            vec![
                ("Great Scientist".to_string(), 3),
                ("Great Engineer".to_string(), 2),
                ("Broken".to_string(), 0),
            ]
        );
        assert!(e.get_counter("missing").is_none());
    }
}
