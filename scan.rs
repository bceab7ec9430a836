use crate::error::{Error, Result};
use crate::models::{DirectoryScan, ScannedStation};
use std::path::Path;
use walkdir::WalkDir;

const SUPPORTED_EXT: &[&str] = &["jpg", "jpeg", "png"];

pub fn is_supported_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXT.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Scans the photo root: first-level subdirectories are stations (directory
/// name = station code), supported image files directly inside them are the
/// station's photos. Entries are sorted by name so repeated scans over the
/// same tree are deterministic. Unreadable entries are skipped with a
/// warning; they must not abort the scan.
pub fn scan_stations(root: &Path) -> Result<DirectoryScan> {
    if !root.is_dir() {
        return Err(Error::Path(format!(
            "Photo folder not found: {}",
            root.display()
        )));
    }

    let mut scan = DirectoryScan::default();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| skip_unreadable(entry, root))
    {
        if !entry.file_type().is_dir() {
            continue;
        }
        let code = entry.file_name().to_string_lossy().to_string();
        let photos: Vec<String> = WalkDir::new(entry.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| skip_unreadable(entry, root))
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| is_supported_photo(entry.path()))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        scan.stations.push(ScannedStation { code, photos });
    }

    log::info!(
        "Scanned {} station folders under {}",
        scan.stations.len(),
        root.display()
    );
    Ok(scan)
}

fn skip_unreadable(
    entry: walkdir::Result<walkdir::DirEntry>,
    root: &Path,
) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            log::warn!("Skipping unreadable entry under {}: {}", root.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn build_tree(name: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("sl_scan_{name}"));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("SX02")).unwrap();
        fs::create_dir_all(root.join("SW47")).unwrap();
        fs::write(root.join("SW47/20241025_105000_SE02.jpg"), b"x").unwrap();
        fs::write(root.join("SW47/20241024_093000_SE02.JPG"), b"x").unwrap();
        fs::write(root.join("SW47/notes.txt"), b"x").unwrap();
        fs::write(root.join("SX02/20240110_113000.png"), b"x").unwrap();
        fs::write(root.join("stray.jpg"), b"x").unwrap();
        root
    }

    #[test]
    fn scans_stations_and_photos_sorted() {
        let root = build_tree("sorted");
        let scan = scan_stations(&root).unwrap();

        let codes: Vec<&str> = scan.stations.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["SW47", "SX02"]);

        assert_eq!(
            scan.stations[0].photos,
            vec!["20241024_093000_SE02.JPG", "20241025_105000_SE02.jpg"]
        );
        assert_eq!(scan.stations[1].photos, vec!["20240110_113000.png"]);
    }

    #[test]
    fn unsupported_files_and_root_files_are_ignored() {
        let root = build_tree("filtered");
        let scan = scan_stations(&root).unwrap();
        for station in &scan.stations {
            assert!(!station.photos.iter().any(|p| p.ends_with(".txt")));
        }
        assert!(scan.stations.iter().all(|s| s.code != "stray.jpg"));
    }

    #[test]
    fn empty_station_folder_is_kept() {
        let root = build_tree("empty");
        let scan = scan_stations(&root).unwrap();
        let sx02 = scan.stations.iter().find(|s| s.code == "SX02").unwrap();
        assert_eq!(sx02.photos.len(), 1);

        fs::create_dir_all(root.join("SY00")).unwrap();
        let scan = scan_stations(&root).unwrap();
        let sy00 = scan.stations.iter().find(|s| s.code == "SY00").unwrap();
        assert!(sy00.photos.is_empty());
    }

    #[test]
    fn missing_root_is_a_path_error() {
        let root = std::env::temp_dir().join("sl_scan_does_not_exist");
        let err = scan_stations(&root).unwrap_err();
        assert!(matches!(err, Error::Path(_)));
    }

    #[test]
    fn supported_extension_check_is_case_insensitive() {
        assert!(is_supported_photo(Path::new("a/IMG.JPG")));
        assert!(is_supported_photo(Path::new("a/IMG.jpeg")));
        assert!(is_supported_photo(Path::new("a/IMG.png")));
        assert!(!is_supported_photo(Path::new("a/IMG.tiff")));
        assert!(!is_supported_photo(Path::new("a/IMG")));
    }
}
