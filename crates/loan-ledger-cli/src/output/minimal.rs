use serde_json::Value;

use super::{result_of, scalar};

/// The figure a caller most likely asked for, in priority order.
const PRIORITY_KEYS: [&str; 9] = [
    "months_saved",
    "remaining_balance",
    "monthly_payment",
    "message",
    "loan_name",
    "status",
    "id",
    "deleted",
    "total_interest",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                println!("{}", scalar(val, "null"));
                return;
            }
        }
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val, "null"));
            return;
        }
    }

    if let Value::Array(items) = result {
        // one line per loan or row
        for item in items {
            let line = item
                .get("loan_id")
                .or_else(|| item.get("month"))
                .map(|v| scalar(v, "null"))
                .unwrap_or_else(|| scalar(item, "null"));
            println!("{}", line);
        }
        return;
    }

    println!("{}", scalar(result, "null"));
}
