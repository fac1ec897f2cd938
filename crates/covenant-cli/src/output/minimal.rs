use serde_json::Value;

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", render_minimal(value));
}

/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
fn render_minimal(value: &Value) -> String {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Priority list of key output fields
    let priority_keys = ["is_compliant", "trend", "letter"];

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    // Series output: print just the values, forecast-only when any exist
    if let Value::Array(points) = result_obj {
        let forecast_values: Vec<String> = points
            .iter()
            .filter(|p| {
                p.get("is_forecast")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
            })
            .filter_map(|p| p.get("value").map(|v| v.to_string()))
            .collect();
        if !forecast_values.is_empty() {
            return forecast_values.join(", ");
        }

        let all_values: Vec<String> = points
            .iter()
            .filter_map(|p| p.get("value").map(|v| v.to_string()))
            .collect();
        if !all_values.is_empty() {
            return all_values.join(", ");
        }
    }

    // Not an object, just print directly
    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
