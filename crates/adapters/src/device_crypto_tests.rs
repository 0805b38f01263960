use super::*;

#[test]
fn generate_produces_a_device_id_matching_the_public_key_hash() {
    let pair = generate();
    assert_eq!(pair.device_id, device_id_for(&pair.public_key_bytes));
    assert_eq!(pair.device_id.len(), 64);
}

#[test]
fn from_private_key_bytes_round_trips_to_the_same_device_id() {
    let original = generate();
    let restored = from_private_key_bytes(&original.private_key_bytes);
    assert_eq!(restored.device_id, original.device_id);
    assert_eq!(restored.public_key_bytes, original.public_key_bytes);
}

#[test]
fn distinct_keys_produce_distinct_device_ids() {
    let a = generate();
    let b = generate();
    assert_ne!(a.device_id, b.device_id);
}
