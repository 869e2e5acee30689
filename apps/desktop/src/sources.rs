use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions accepted by both the file-pick dialog and the folder scan.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "gif"];

#[derive(Clone, Default, Debug)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Recursively collect the image files under `dir`.
///
/// Paths come back sorted so a scanned folder always stamps in the same
/// order. A canceled scan stops walking and returns whatever was gathered
/// up to that point.
pub async fn scan_directory(dir: &Path, cancel: Option<&CancellationFlag>) -> Result<Vec<PathBuf>> {
    scan_directory_blocking(dir, cancel)
}

fn scan_directory_blocking(dir: &Path, cancel: Option<&CancellationFlag>) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();

    for entry in WalkDir::new(dir).into_iter().filter_map(|res| res.ok()) {
        if cancel
            .as_ref()
            .map(|flag| flag.is_canceled())
            .unwrap_or(false)
        {
            break;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        match path.extension().and_then(OsStr::to_str) {
            Some(ext) if is_supported_extension(ext) => {}
            _ => continue,
        }

        out.push(path);
    }

    out.sort();
    debug!("Scan of {} found {} images", dir.display(), out.len());
    Ok(out)
}

fn is_supported_extension(ext: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::fs;
    use tempfile::tempdir;

    fn write_test_image(path: &Path) {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 10, 200]));
        img.save(path).unwrap();
    }

    #[test]
    fn scan_filters_supported_extensions() {
        let dir = tempdir().unwrap();
        let jpg_path = dir.path().join("one.JPG");
        let txt_path = dir.path().join("note.txt");
        write_test_image(&jpg_path);
        fs::write(&txt_path, b"ignore me").unwrap();

        let results = block_on(scan_directory(dir.path(), None)).expect("scan");
        assert_eq!(results, vec![jpg_path]);
    }

    #[test]
    fn scan_recurses_and_sorts() {
        let dir = tempdir().unwrap();
        let sub_a = dir.path().join("a");
        let sub_b = dir.path().join("b");
        fs::create_dir_all(&sub_a).unwrap();
        fs::create_dir_all(&sub_b).unwrap();

        // Written out of order; the scan still reports them sorted.
        let late = dir.path().join("zebra.jpg");
        let early = sub_a.join("one.png");
        let middle = sub_b.join("two.png");
        write_test_image(&late);
        write_test_image(&middle);
        write_test_image(&early);

        let results = block_on(scan_directory(dir.path(), None)).expect("scan");
        assert_eq!(results, vec![early, middle, late]);
    }

    #[test]
    fn canceled_scan_returns_early() {
        let dir = tempdir().unwrap();
        write_test_image(&dir.path().join("one.png"));
        write_test_image(&dir.path().join("two.png"));

        let flag = CancellationFlag::default();
        flag.cancel();

        let results = block_on(scan_directory(dir.path(), Some(&flag))).expect("scan");
        assert!(results.is_empty());
    }
}
