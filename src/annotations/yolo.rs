use super::{BoundingBox, ParseOutcome};

pub(super) fn parse(
    text: &str,
    image_width: u32,
    image_height: u32,
    class_names: Option<&[String]>,
    out: &mut ParseOutcome,
) {
    let class_names = class_names.filter(|names| !names.is_empty());
    if class_names.is_none() {
        out.diagnose("no class names provided, labels will be class ids");
    }

    let (width, height) = (f64::from(image_width), f64::from(image_height));
    for (line_no, line) in text.lines().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 5 {
            continue;
        }
        match parse_line(&tokens, width, height, class_names) {
            Ok(bbox) => out.boxes.push(bbox),
            Err(reason) => out.diagnose(format!("line {} skipped: {reason}", line_no + 1)),
        }
    }
}

fn parse_line(
    tokens: &[&str],
    width: f64,
    height: f64,
    class_names: Option<&[String]>,
) -> Result<BoundingBox, String> {
    let class_id: i64 = tokens[0]
        .parse()
        .map_err(|_| format!("invalid class id {:?}", tokens[0]))?;
    let mut values = [0.0f64; 4];
    for (slot, token) in values.iter_mut().zip(&tokens[1..]) {
        *slot = token
            .parse()
            .map_err(|_| format!("non-numeric value {token:?}"))?;
    }
    let [x_center, y_center, box_w, box_h] = values;

    let x_center = x_center * width;
    let y_center = y_center * height;
    let box_w = box_w * width;
    let box_h = box_h * height;

    let label = class_names
        .zip(usize::try_from(class_id).ok())
        .and_then(|(names, idx)| names.get(idx))
        .cloned()
        .unwrap_or_else(|| format!("Class {class_id}"));

    Ok(BoundingBox::new(
        label,
        (x_center - box_w / 2.0) as i32,
        (y_center - box_h / 2.0) as i32,
        (x_center + box_w / 2.0) as i32,
        (y_center + box_h / 2.0) as i32,
    ))
}
