// contract-fuzz/src/mutators/builtin.rs
//! Mutators available when no custom mutator folder is configured

use rand::{Rng, RngCore};
use serde_json::{json, Value};

use crate::mutators::Mutator;
use crate::payload;

/// Length of the string produced by `VeryLargeStringMutator`
const LARGE_STRING_LEN: usize = 20_000;

const BOUNDARY_INTEGERS: [i64; 6] = [0, -1, i32::MIN as i64, i32::MAX as i64, i64::MIN, i64::MAX];

const ZERO_WIDTH_CHARS: [&str; 4] = ["\u{200B}", "\u{200C}", "\u{200D}", "\u{FEFF}"];

/// Replaces the field with an empty string
pub struct EmptyStringMutator;

impl Mutator for EmptyStringMutator {
    fn name(&self) -> &str {
        "empty string"
    }

    fn mutate(&self, payload: &Value, field: &str, _rng: &mut dyn RngCore) -> Value {
        payload::replace_field(payload, field, Value::String(String::new()))
    }
}

/// Replaces the field with `null`
pub struct NullValueMutator;

impl Mutator for NullValueMutator {
    fn name(&self) -> &str {
        "null value"
    }

    fn mutate(&self, payload: &Value, field: &str, _rng: &mut dyn RngCore) -> Value {
        payload::replace_field(payload, field, Value::Null)
    }
}

/// Drops the field from the payload
pub struct RemoveFieldMutator;

impl Mutator for RemoveFieldMutator {
    fn name(&self) -> &str {
        "remove field"
    }

    fn mutate(&self, payload: &Value, field: &str, _rng: &mut dyn RngCore) -> Value {
        payload::remove_field(payload, field)
    }
}

pub struct VeryLargeStringMutator;

impl Mutator for VeryLargeStringMutator {
    fn name(&self) -> &str {
        "very large string"
    }

    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value {
        let c = rng.gen_range(b'a'..=b'z') as char;
        payload::replace_field(payload, field, Value::String(c.to_string().repeat(LARGE_STRING_LEN)))
    }
}

/// Replaces the field with a short run of arbitrary code points
pub struct RandomUnicodeMutator;

impl Mutator for RandomUnicodeMutator {
    fn name(&self) -> &str {
        "random unicode"
    }

    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value {
        let len = rng.gen_range(1..=32);
        let value: String = (0..len).map(|_| rng.gen::<char>()).collect();
        payload::replace_field(payload, field, Value::String(value))
    }
}

pub struct BoundaryIntegerMutator;

impl Mutator for BoundaryIntegerMutator {
    fn name(&self) -> &str {
        "boundary integer"
    }

    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value {
        let value = BOUNDARY_INTEGERS[rng.gen_range(0..BOUNDARY_INTEGERS.len())];
        payload::replace_field(payload, field, json!(value))
    }
}

/// Wraps the current value in a single-element array
pub struct TypeConfusionMutator;

impl Mutator for TypeConfusionMutator {
    fn name(&self) -> &str {
        "type confusion"
    }

    fn mutate(&self, payload: &Value, field: &str, _rng: &mut dyn RngCore) -> Value {
        payload::map_field(payload, field, &|old| Value::Array(vec![old.clone()]))
    }
}

/// Inserts a zero-width character at a random position of the text value
pub struct ZeroWidthInjectionMutator;

impl Mutator for ZeroWidthInjectionMutator {
    fn name(&self) -> &str {
        "zero-width injection"
    }

    fn mutate(&self, payload: &Value, field: &str, rng: &mut dyn RngCore) -> Value {
        let Some(current) = payload::get_field(payload, field) else {
            return payload.clone();
        };
        let original: Vec<char> = payload::value_to_text(current).chars().collect();
        let position = rng.gen_range(0..=original.len());
        let injected = ZERO_WIDTH_CHARS[rng.gen_range(0..ZERO_WIDTH_CHARS.len())];

        let mut value: String = original[..position].iter().collect();
        value.push_str(injected);
        value.extend(&original[position..]);
        payload::replace_field(payload, field, Value::String(value))
    }
}

/// Every built-in mutator, in a fixed order
pub fn builtin_mutators() -> Vec<Box<dyn Mutator>> {
    vec![
        Box::new(EmptyStringMutator),
        Box::new(NullValueMutator),
        Box::new(RemoveFieldMutator),
        Box::new(VeryLargeStringMutator),
        Box::new(RandomUnicodeMutator),
        Box::new(BoundaryIntegerMutator),
        Box::new(TypeConfusionMutator),
        Box::new(ZeroWidthInjectionMutator),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn payload() -> Value {
        json!({"name": "ok", "address": {"city": "Paris"}})
    }

    #[test]
    fn test_simple_replacements() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            EmptyStringMutator.mutate(&payload(), "name", &mut rng),
            json!({"name": "", "address": {"city": "Paris"}})
        );
        assert_eq!(
            NullValueMutator.mutate(&payload(), "address#city", &mut rng),
            json!({"name": "ok", "address": {"city": null}})
        );
        assert_eq!(
            RemoveFieldMutator.mutate(&payload(), "name", &mut rng),
            json!({"address": {"city": "Paris"}})
        );
        assert_eq!(
            TypeConfusionMutator.mutate(&payload(), "name", &mut rng),
            json!({"name": ["ok"], "address": {"city": "Paris"}})
        );
    }

    #[test]
    fn test_input_is_untouched() {
        let mut rng = StdRng::seed_from_u64(2);
        let original = payload();
        for mutator in builtin_mutators() {
            let _ = mutator.mutate(&original, "name", &mut rng);
        }
        assert_eq!(original, payload());
    }

    #[test]
    fn test_large_string_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let mutated = VeryLargeStringMutator.mutate(&payload(), "name", &mut rng);
        assert_eq!(mutated["name"].as_str().unwrap().len(), LARGE_STRING_LEN);
    }

    #[test]
    fn test_boundary_integer_is_from_the_table() {
        let mut rng = StdRng::seed_from_u64(4);
        let mutated = BoundaryIntegerMutator.mutate(&payload(), "name", &mut rng);
        let value = mutated["name"].as_i64().unwrap();
        assert!(BOUNDARY_INTEGERS.contains(&value));
    }

    #[test]
    fn test_zero_width_injection_keeps_original_chars() {
        let mut rng = StdRng::seed_from_u64(5);
        let mutated = ZeroWidthInjectionMutator.mutate(&payload(), "name", &mut rng);
        let value = mutated["name"].as_str().unwrap();
        let stripped: String = value
            .chars()
            .filter(|c| !ZERO_WIDTH_CHARS.iter().any(|z| z.starts_with(*c)))
            .collect();
        assert_eq!(stripped, "ok");
        assert_eq!(value.chars().count(), 3);
    }

    #[test]
    fn test_unknown_field_is_noop() {
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(ZeroWidthInjectionMutator.mutate(&payload(), "missing", &mut rng), payload());
        assert_eq!(NullValueMutator.mutate(&payload(), "missing", &mut rng), payload());
    }
}
