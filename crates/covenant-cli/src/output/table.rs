use colored::Colorize;
use serde_json::Value;
use tabled::{Table, builder::Builder};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &serde_json::Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            // Compliance output gets a dedicated breach table
            if let Some(Value::Array(breaches)) = res_map.get("breaches") {
                print_compliance(res_map, breaches);
            } else {
                let mut builder = Builder::default();
                builder.push_record(["Field", "Value"]);
                for (key, val) in res_map {
                    builder.push_record([key.as_str(), &format_value(val)]);
                }
                println!("{}", Table::from(builder));
            }
        }
        // Forecast output: result is an array of series points
        Value::Array(arr) => print_array_table(arr),
        _ => print_flat_object(&Value::Object(envelope.clone())),
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow());
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    // Print methodology
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_compliance(result: &serde_json::Map<String, Value>, breaches: &[Value]) {
    let compliant = result
        .get("is_compliant")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if compliant {
        println!("Status: {}", "COMPLIANT".green().bold());
    } else {
        println!("Status: {}", "BREACH".red().bold());
    }

    if breaches.is_empty() {
        return;
    }

    let mut builder = Builder::default();
    builder.push_record(["Covenant", "Threshold", "Actual", "Deviation", "Severity"]);
    for row in breach_rows(breaches) {
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn breach_rows(breaches: &[Value]) -> Vec<[String; 5]> {
    breaches
        .iter()
        .filter_map(Value::as_object)
        .map(|b| {
            let threshold = b.get("threshold").and_then(Value::as_f64);
            let actual = b.get("actual").and_then(Value::as_f64);
            // Deviation is derived, not serialized: |actual - threshold| / threshold.
            let deviation = match (actual, threshold) {
                (Some(a), Some(t)) if t != 0.0 => {
                    format!("{:.1}%", (a - t).abs() / t * 100.0)
                }
                _ => String::new(),
            };
            let severity = b
                .get("severity")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            [
                b.get("covenant_name")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                format_value(b.get("threshold").unwrap_or(&Value::Null)),
                format_value(b.get("actual").unwrap_or(&Value::Null)),
                deviation,
                color_severity(severity),
            ]
        })
        .collect()
}

fn color_severity(severity: &str) -> String {
    match severity {
        "critical" => severity.red().bold().to_string(),
        "major" => severity.red().to_string(),
        "minor" => severity.yellow().to_string(),
        _ => severity.to_string(),
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    // Collect all keys from first object for headers
    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| {
                        map.get(h.as_str())
                            .map(|v| format_value(v))
                            .unwrap_or_default()
                    })
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        // Simple array of values
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(|v| format_value(v)).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
