use serde_json::Value;

use super::{BoundingBox, ParseOutcome, NO_LABEL};

/// Only the first element of the outer array is read.
pub(super) fn parse(text: &str, out: &mut ParseOutcome) {
    let root: Value = match serde_json::from_str(text) {
        Ok(root) => root,
        Err(e) => {
            out.diagnose(format!("malformed JSON: {e}"));
            return;
        }
    };

    let items = root.as_array();
    let Some(entries) = items
        .and_then(|items| items.first())
        .and_then(|first| first.get("annotations"))
        .and_then(Value::as_array)
    else {
        out.diagnose("JSON structure not as expected: 'annotations' key not found in the first object");
        return;
    };

    if let Some(extra) = items.map(|items| items.len() - 1).filter(|&n| n > 0) {
        out.diagnose(format!("{extra} further top-level entries ignored"));
    }

    for (i, entry) in entries.iter().enumerate() {
        match entry_box(entry) {
            Ok(bbox) => out.boxes.push(bbox),
            Err(reason) => out.diagnose(format!("annotation #{i} skipped: {reason}")),
        }
    }
}

fn entry_box(entry: &Value) -> Result<BoundingBox, String> {
    let label = match entry.get("label") {
        None | Some(Value::Null) => NO_LABEL.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let coords = entry
        .get("coordinates")
        .filter(|c| !c.is_null())
        .ok_or("missing coordinates")?;

    let x = coordinate(coords, "x")?;
    let y = coordinate(coords, "y")?;
    let width = coordinate(coords, "width")?;
    let height = coordinate(coords, "height")?;

    Ok(BoundingBox::new(
        label,
        x as i32,
        y as i32,
        (x + width) as i32,
        (y + height) as i32,
    ))
}

fn coordinate(coords: &Value, key: &str) -> Result<f64, String> {
    match coords.get(key) {
        None | Some(Value::Null) => Err(format!("missing {key}")),
        Some(v) => v.as_f64().ok_or_else(|| format!("non-numeric {key}: {v}")),
    }
}
