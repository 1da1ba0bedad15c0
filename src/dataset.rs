//! Folder mode: pair every image in a dataset folder with its label file and
//! step through the pairs.

use std::path::{Path, PathBuf};

use crate::annotations::classes::{find_class_file, load_class_names};
use crate::annotations::AnnotationFormat;
use crate::error::{Error, Result};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetItem {
    pub image: PathBuf,
    pub labels: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Dataset {
    items: Vec<DatasetItem>,
    class_names: Vec<String>,
    current: usize,
}

impl Dataset {
    /// Scan `root`. Uses `images/` and `labels/` when both exist, otherwise
    /// the root itself for both. Images without a label file are left out.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let (images_dir, labels_dir) = {
            let images = root.join("images");
            let labels = root.join("labels");
            if images.is_dir() && labels.is_dir() {
                (images, labels)
            } else {
                (root.to_path_buf(), root.to_path_buf())
            }
        };

        let mut images = Vec::new();
        let entries = std::fs::read_dir(&images_dir).map_err(|e| Error::io(&images_dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&images_dir, e))?.path();
            if path.is_file() && is_image(&path) {
                images.push(path);
            }
        }
        images.sort();

        let items: Vec<DatasetItem> = images
            .into_iter()
            .filter_map(|image| {
                let labels = find_label_file(&image, &labels_dir)?;
                Some(DatasetItem { image, labels })
            })
            .collect();

        if items.is_empty() {
            return Err(Error::NoPairsFound(root.to_path_buf()));
        }

        let class_names = find_class_file(root)
            .map(|path| load_class_names(&path))
            .unwrap_or_default();

        log::info!(
            "{}: {} image-label pairs, {} class names",
            root.display(),
            items.len(),
            class_names.len()
        );

        Ok(Self {
            items,
            class_names,
            current: 0,
        })
    }

    #[cfg(test)]
    pub fn items(&self) -> &[DatasetItem] {
        &self.items
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub fn current(&self) -> &DatasetItem {
        &self.items[self.current]
    }

    /// Item at a 0-based index.
    pub fn item(&self, index: usize) -> Result<&DatasetItem> {
        self.items.get(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Index after the current one; `None` at the last item.
    pub fn next_index(&self) -> Option<usize> {
        Some(self.current + 1).filter(|&i| i < self.items.len())
    }

    /// Index before the current one; `None` at the first item.
    pub fn previous_index(&self) -> Option<usize> {
        self.current.checked_sub(1)
    }

    /// Make `index` current. Out of range leaves the position unchanged.
    pub fn set_current(&mut self, index: usize) {
        if index < self.items.len() {
            self.current = index;
        }
    }

    /// `"3/17"`, 1-based.
    pub fn position_label(&self) -> String {
        format!("{}/{}", self.current + 1, self.items.len())
    }
}

/// Parse a 1-based position typed by the user into a 0-based index.
pub fn parse_position(text: &str) -> Result<usize> {
    let position: usize = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidPosition(text.to_string()))?;
    position
        .checked_sub(1)
        .ok_or_else(|| Error::InvalidPosition(text.to_string()))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// First existing `<labels_dir>/<stem>.{json,xml,txt}`.
pub fn find_label_file(image: &Path, labels_dir: &Path) -> Option<PathBuf> {
    let stem = image.file_stem()?;
    AnnotationFormat::PAIRING_ORDER
        .iter()
        .map(|format| {
            let mut name = stem.to_os_string();
            name.push(".");
            name.push(format.extension());
            labels_dir.join(name)
        })
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: PathBuf) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn split_layout_pairs_by_stem_in_format_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir(root.join("images")).unwrap();
        fs::create_dir(root.join("labels")).unwrap();
        touch(root.join("images/b.jpg"));
        touch(root.join("images/a.PNG"));
        touch(root.join("images/c.jpeg"));
        touch(root.join("images/notes.md"));
        touch(root.join("labels/a.txt"));
        touch(root.join("labels/a.json"));
        touch(root.join("labels/b.xml"));
        touch(root.join("labels/b.txt"));
        fs::write(root.join("classes.names"), "rim\nweight\n").unwrap();

        let ds = Dataset::scan(root).unwrap();
        assert_eq!(
            ds.items(),
            &[
                DatasetItem {
                    image: root.join("images/a.PNG"),
                    labels: root.join("labels/a.json"),
                },
                DatasetItem {
                    image: root.join("images/b.jpg"),
                    labels: root.join("labels/b.xml"),
                },
            ]
        );
        assert_eq!(ds.class_names(), &["rim".to_string(), "weight".to_string()]);
    }

    #[test]
    fn flat_layout_uses_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        // only images/ present: not a split layout
        fs::create_dir(root.join("images")).unwrap();
        touch(root.join("x.jpg"));
        touch(root.join("x.txt"));

        let ds = Dataset::scan(root).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.current().labels, root.join("x.txt"));
        assert!(ds.class_names().is_empty());
    }

    #[test]
    fn dotted_stems_keep_their_full_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path().join("rim.v2.jpg"));
        touch(dir.path().join("rim.xml"));
        touch(dir.path().join("rim.v2.xml"));

        let ds = Dataset::scan(dir.path()).unwrap();
        assert_eq!(ds.current().labels, dir.path().join("rim.v2.xml"));
    }

    #[test]
    fn scan_errors() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        touch(file.clone());
        assert!(matches!(Dataset::scan(&file), Err(Error::NotADirectory(_))));

        touch(dir.path().join("lonely.png"));
        assert!(matches!(Dataset::scan(dir.path()), Err(Error::NoPairsFound(_))));
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let dir = tempfile::tempdir().unwrap();
        for stem in ["a", "b", "c"] {
            touch(dir.path().join(format!("{stem}.png")));
            touch(dir.path().join(format!("{stem}.json")));
        }
        let mut ds = Dataset::scan(dir.path()).unwrap();
        assert_eq!(ds.position_label(), "1/3");
        assert_eq!(ds.previous_index(), None);
        assert_eq!(ds.next_index(), Some(1));

        ds.set_current(2);
        assert_eq!(ds.next_index(), None);
        assert_eq!(ds.previous_index(), Some(1));
        assert_eq!(ds.position_label(), "3/3");

        assert!(matches!(ds.item(3), Err(Error::IndexOutOfRange { index: 3, len: 3 })));
        ds.set_current(3);
        assert_eq!(ds.current_index(), 2);
        assert_eq!(ds.item(0).unwrap().image, dir.path().join("a.png"));
    }

    #[test]
    fn positions_are_one_based() {
        assert_eq!(parse_position(" 4 ").unwrap(), 3);
        assert!(matches!(parse_position("0"), Err(Error::InvalidPosition(_))));
        assert!(matches!(parse_position("four"), Err(Error::InvalidPosition(_))));
        assert!(matches!(parse_position("-1"), Err(Error::InvalidPosition(_))));
    }
}
