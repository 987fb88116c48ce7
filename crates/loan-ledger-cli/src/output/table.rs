use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{is_row_list, scalar};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_envelope(result, map),
            None => print_object(map),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", value),
    }
}

fn print_envelope(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(map) => print_object(map),
        Value::Array(rows) => print_rows(rows),
        other => println!("{}", scalar(other, "null")),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(methodology)) = envelope.get("methodology") {
        println!("\nMethodology: {}", methodology);
    }
}

/// Field/value table for scalars, then one table per nested row list.
fn print_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut row_lists = Vec::new();
    for (key, val) in map {
        if is_row_list(val) {
            row_lists.push((key, val));
        } else {
            builder.push_record([key.as_str(), &cell(val)]);
        }
    }
    println!("{}", Table::from(builder));

    for (key, val) in row_lists {
        if let Value::Array(rows) = val {
            println!("\n{}:", key);
            print_rows(rows);
        }
    }
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        if rows.is_empty() {
            println!("(empty)");
        }
        for row in rows {
            println!("{}", cell(row));
        }
        return;
    };

    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !is_row_list(v))
        .map(|(k, _)| k.clone())
        .collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for row in rows.iter().filter_map(Value::as_object) {
        builder.push_record(
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell).unwrap_or_default()),
        );
    }
    println!("{}", Table::from(builder));
}

fn cell(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join(", "),
        other => scalar(other, "-"),
    }
}
