use roxmltree::{Document, Node};

use super::{BoundingBox, ParseOutcome, NO_LABEL};

pub(super) fn parse(text: &str, out: &mut ParseOutcome) {
    let doc = match Document::parse(text) {
        Ok(doc) => doc,
        Err(e) => {
            out.diagnose(format!("malformed XML: {e}"));
            return;
        }
    };

    let objects = doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("object"));

    for (i, object) in objects.enumerate() {
        let label = child(object, "name")
            .and_then(|n| n.text())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_LABEL);

        // An object without a box is a classification-only entry.
        let Some(bndbox) = child(object, "bndbox") else {
            continue;
        };

        match corners(bndbox) {
            Ok([x_min, y_min, x_max, y_max]) => {
                out.boxes.push(BoundingBox::new(label.to_string(), x_min, y_min, x_max, y_max))
            }
            Err(reason) => out.diagnose(format!("object #{i} ({label}) skipped: {reason}")),
        }
    }
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn corners(bndbox: Node) -> Result<[i32; 4], String> {
    Ok([
        coordinate(bndbox, "xmin")?,
        coordinate(bndbox, "ymin")?,
        coordinate(bndbox, "xmax")?,
        coordinate(bndbox, "ymax")?,
    ])
}

/// Values are read as floats and truncated, `"12.9"` becomes 12.
fn coordinate(bndbox: Node, tag: &str) -> Result<i32, String> {
    let text = child(bndbox, tag)
        .and_then(|n| n.text())
        .ok_or_else(|| format!("missing {tag}"))?;
    text.trim()
        .parse::<f64>()
        .map(|v| v as i32)
        .map_err(|_| format!("non-numeric {tag}: {text:?}"))
}
