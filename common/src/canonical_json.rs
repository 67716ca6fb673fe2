use serde_json::Value;
use sha2::{Digest, Sha256};

/// Serializes `value` with object keys sorted lexicographically and no
/// extraneous whitespace.
///
/// Used for both the HMAC signing message and the idempotency request hash,
/// so that two logically-identical request bodies with differently-ordered
/// keys produce the same signature and the same hash.
pub fn canonical_json(value: &Value) -> String {
    let sorted = sort_keys(value);
    // `sort_keys` rebuilds every object as a BTreeMap-ordered `serde_json::Map`,
    // so the default (non-pretty) serializer below already emits keys in
    // lexicographic order with no inserted whitespace.
    serde_json::to_string(&sorted).expect("sorted Value always serializes")
}

/// SHA-256 hex digest over the canonical form of `body`, used for the
/// idempotency `requestHash`.
pub fn request_hash(body: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(body).as_bytes());
    hex::encode(hasher.finalize())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sorts_object_keys_regardless_of_insertion_order() {
        let a = json!({"b": 1, "a": 2, "c": {"z": 1, "y": 2}});
        let b = json!({"a": 2, "c": {"y": 2, "z": 1}, "b": 1});
        assert_eq!(canonical_json(&a), canonical_json(&b));
    }

    #[test]
    fn produces_no_extraneous_whitespace() {
        let value = json!({"a": 1, "b": [1, 2, 3]});
        assert_eq!(canonical_json(&value), r#"{"a":1,"b":[1,2,3]}"#);
    }

    #[test]
    fn stable_under_key_permutation() {
        let permutations = [
            json!({"amountCents": 500, "currency": "USD", "playerId": "p1", "refId": "r1"}),
            json!({"refId": "r1", "playerId": "p1", "currency": "USD", "amountCents": 500}),
            json!({"currency": "USD", "amountCents": 500, "refId": "r1", "playerId": "p1"}),
        ];
        let first = canonical_json(&permutations[0]);
        for value in &permutations[1..] {
            assert_eq!(canonical_json(value), first);
        }
    }

    #[test]
    fn request_hash_is_stable_under_key_permutation() {
        let a = json!({"refId": "r1", "amountCents": 500});
        let b = json!({"amountCents": 500, "refId": "r1"});
        assert_eq!(request_hash(&a), request_hash(&b));
    }

    #[test]
    fn request_hash_changes_with_body() {
        let a = json!({"amountCents": 500});
        let b = json!({"amountCents": 501});
        assert_ne!(request_hash(&a), request_hash(&b));
    }
}
