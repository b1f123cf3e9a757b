//! Field naming convention shared by every wire record.
//!
//! In-memory fields are `snake_case`; the platform's JSON and YAML use
//! `camelCase`. Every record in [`crate::objects`] derives its wire names with
//! `#[serde(rename_all = "camelCase")]`, which applies exactly the rule in
//! [`to_wire_name`] at compile time, so no per-type field list is maintained
//! by hand.
//!
//! There is no free-standing reverse transform. Code that needs to go from a
//! wire name back to a field id builds a lookup table with [`wire_table`]; the
//! marshaler's secret redaction works from one.

use std::collections::HashMap;

/// Convert a `snake_case` field identifier to its wire name.
///
/// The first word is lower-cased, every following word is capitalized and the
/// underscores are dropped. There are no abbreviation rules, so
/// `o_auth_callback_data` becomes `oAuthCallbackData`.
pub fn to_wire_name(field: &str) -> String {
    let mut words = field.split('_');
    let mut wire = String::with_capacity(field.len());
    if let Some(first) = words.next() {
        wire.push_str(&first.to_lowercase());
    }
    for word in words {
        let mut chars = word.chars();
        if let Some(head) = chars.next() {
            wire.extend(head.to_uppercase());
            wire.push_str(&chars.as_str().to_lowercase());
        }
    }
    wire
}

/// Build a wire name → field id table for a record's field set.
pub fn wire_table<'a>(fields: &[&'a str]) -> HashMap<String, &'a str> {
    fields
        .iter()
        .map(|field| (to_wire_name(field), *field))
        .collect()
}
