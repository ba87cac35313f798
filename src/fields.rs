//! Access to vendor field maps of the shape `{"<key>": {"value": ...}, ...}`.
//!
//! Pure functions, no async. Every accessor returns `None` for a missing key,
//! a missing `value`, or a JSON `null`, so mappers never fail on partial data.

use serde_json::{Map, Value};

use crate::conversion::{
    convert_string_to_number, retrieve_first_number_from_string, value_to_number, NumericKind,
};
use crate::schema::LineItem;

/// Raw vendor field map, in vendor document order.
pub type FieldMap = Map<String, Value>;

const LINE_ITEM_PREFIX: &str = "lineItem";

/// The `value` of a vendor field, or `None` when absent or null.
pub fn get_field<'a>(fields: &'a FieldMap, key: &str) -> Option<&'a Value> {
    fields
        .get(key)
        .and_then(|wrapper| wrapper.get("value"))
        .filter(|v| !v.is_null())
}

/// Textual rendering of a scalar vendor value.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// A vendor field as text.
pub fn field_text(fields: &FieldMap, key: &str) -> Option<String> {
    get_field(fields, key).and_then(value_to_text)
}

/// A vendor field coerced to a number.
pub fn field_number<T: NumericKind>(fields: &FieldMap, key: &str) -> Option<T> {
    get_field(fields, key).and_then(value_to_number)
}

/// Values of every `lineItem*<suffix>` key, in map order. Null or missing
/// values keep their slot so positions stay aligned.
fn line_item_values<'a>(fields: &'a FieldMap, suffix: &str) -> Vec<Option<&'a Value>> {
    fields
        .iter()
        .filter(|(key, _)| key.starts_with(LINE_ITEM_PREFIX) && key.ends_with(suffix))
        .map(|(_, wrapper)| wrapper.get("value").filter(|v| !v.is_null()))
        .collect()
}

fn value_at(list: &[Option<&Value>], idx: usize) -> Option<Value> {
    list.get(idx).copied().flatten().cloned()
}

/// Rebuild line items by zipping the per-attribute lists positionally.
///
/// Lists are assumed aligned. A shorter list is padded with missing values,
/// so the result has as many items as the longest list.
pub fn extract_line_items(fields: &FieldMap) -> Vec<LineItem> {
    let descriptions = line_item_values(fields, "Description");
    let quantities = line_item_values(fields, "Quantity");
    let totals = line_item_values(fields, "LineTotal");
    let unit_prices = line_item_values(fields, "UnitPrice");

    let len = descriptions
        .len()
        .max(quantities.len())
        .max(totals.len())
        .max(unit_prices.len());

    (0..len)
        .map(|idx| {
            // Quantities sometimes carry a unit suffix ("3 pcs").
            let quantity_text = value_at(&quantities, idx).as_ref().and_then(value_to_text);
            let quantity = retrieve_first_number_from_string(quantity_text.as_deref());

            LineItem {
                description: value_at(&descriptions, idx)
                    .as_ref()
                    .and_then(value_to_text)
                    .unwrap_or_default(),
                quantity: convert_string_to_number(quantity.as_deref()),
                amount: value_at(&totals, idx).as_ref().and_then(value_to_number),
                unit_price: value_at(&unit_prices, idx).as_ref().and_then(value_to_number),
            }
        })
        .collect()
}
