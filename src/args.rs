//! Marshalling of model-supplied argument strings into typed values.

use std::collections::HashMap;

/// A tool argument after coercion into one of the supported scalar types.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Str(String),
    Int(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
}

/// Coerce a raw string into the scalar named by `type_tag`.
///
/// Unparseable numbers and unknown tags yield `None`. `bool` has no failure
/// path: anything other than `"true"` or `"1"` is `false`.
pub fn coerce(value: &str, type_tag: &str) -> Option<ArgValue> {
    match type_tag {
        "string" => Some(ArgValue::Str(value.to_string())),
        "int" => value.parse::<i64>().ok().map(ArgValue::Int),
        "float" => value.parse::<f32>().ok().map(ArgValue::Float),
        "double" => value.parse::<f64>().ok().map(ArgValue::Double),
        "bool" => Some(ArgValue::Bool(value == "true" || value == "1")),
        _ => None,
    }
}

/// Arguments for a single tool invocation, keyed by parameter name.
///
/// Parameters whose inbound value failed coercion are simply not present.
/// Every accessor returns `None` both for missing names and for type
/// mismatches; nothing here aborts the dispatch loop.
#[derive(Debug, Default)]
pub struct ArgBag {
    values: HashMap<String, ArgValue>,
}

impl ArgBag {
    pub fn set(&mut self, name: impl Into<String>, value: ArgValue) {
        self.values.insert(name.into(), value);
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            ArgValue::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        match self.values.get(name)? {
            ArgValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        match self.values.get(name)? {
            ArgValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_double(&self, name: &str) -> Option<f64> {
        match self.values.get(name)? {
            ArgValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name)? {
            ArgValue::Bool(value) => Some(*value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_coercion_is_identity() {
        assert_eq!(
            coerce("hello", "string"),
            Some(ArgValue::Str("hello".into()))
        );
        assert_eq!(coerce("", "string"), Some(ArgValue::Str(String::new())));
    }

    #[test]
    fn int_round_trips_representable_values() {
        assert_eq!(coerce("42", "int"), Some(ArgValue::Int(42)));
        assert_eq!(coerce("-7", "int"), Some(ArgValue::Int(-7)));
        assert_eq!(coerce(&i64::MAX.to_string(), "int"), Some(ArgValue::Int(i64::MAX)));
    }

    #[test]
    fn int_parse_failures_are_absent() {
        assert_eq!(coerce("abc", "int"), None);
        assert_eq!(coerce("12x", "int"), None);
        assert_eq!(coerce("", "int"), None);
    }

    #[test]
    fn float_and_double_parse() {
        assert_eq!(coerce("1.5", "float"), Some(ArgValue::Float(1.5)));
        assert_eq!(coerce("2.25", "double"), Some(ArgValue::Double(2.25)));
        assert_eq!(coerce("nope", "float"), None);
        assert_eq!(coerce("nope", "double"), None);
    }

    #[test]
    fn bool_accepts_only_true_and_one() {
        assert_eq!(coerce("true", "bool"), Some(ArgValue::Bool(true)));
        assert_eq!(coerce("1", "bool"), Some(ArgValue::Bool(true)));
        for falsy in ["false", "0", "", "True", "yes"] {
            assert_eq!(coerce(falsy, "bool"), Some(ArgValue::Bool(false)));
        }
    }

    #[test]
    fn unknown_tag_is_absent() {
        assert_eq!(coerce("anything", "uint128"), None);
    }

    #[test]
    fn bag_returns_none_on_type_mismatch() {
        let mut bag = ArgBag::default();
        bag.set("count", ArgValue::Int(3));

        assert_eq!(bag.get_int("count"), Some(3));
        assert_eq!(bag.get_str("count"), None);
        assert_eq!(bag.get_bool("count"), None);
        assert_eq!(bag.get_int("missing"), None);
    }
}
