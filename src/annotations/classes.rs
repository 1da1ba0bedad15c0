use std::path::Path;

/// Class-name files probed in a dataset root, in order.
pub const CLASS_FILE_NAMES: [&str; 2] = ["classes.txt", "classes.names"];

/// Load a YOLO class table, one name per non-empty line. Index = class id.
///
/// An unreadable file gives an empty table; YOLO labels then fall back to
/// `"Class {id}"`.
pub fn load_class_names(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            let names = parse_class_names(&text);
            log::info!("{} class names loaded from {}", names.len(), path.display());
            names
        }
        Err(e) => {
            log::error!("Error loading classes file {}: {e}", path.display());
            Vec::new()
        }
    }
}

pub fn parse_class_names(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// First of [`CLASS_FILE_NAMES`] present in `root`.
pub fn find_class_file(root: &Path) -> Option<std::path::PathBuf> {
    CLASS_FILE_NAMES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_dropped() {
        let names = parse_class_names("silver marking\n\n  balancing weight \r\n\t\nrim\n");
        assert_eq!(names, vec!["silver marking", "balancing weight", "rim"]);
    }

    #[test]
    fn missing_file_is_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_class_names(&dir.path().join("classes.txt")).is_empty());
    }

    #[test]
    fn class_file_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(find_class_file(dir.path()), None);

        std::fs::write(dir.path().join("classes.names"), "a\n").unwrap();
        assert_eq!(find_class_file(dir.path()), Some(dir.path().join("classes.names")));

        std::fs::write(dir.path().join("classes.txt"), "b\n").unwrap();
        assert_eq!(find_class_file(dir.path()), Some(dir.path().join("classes.txt")));
        assert_eq!(load_class_names(&dir.path().join("classes.txt")), vec!["b"]);
    }
}
