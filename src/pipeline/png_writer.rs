use image::{ImageFormat, RgbaImage};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;

use super::sanitize::sanitize_path;
use crate::error::SplitError;

pub const EXTENSION: &str = "png";

/// File name (relative to the output directory) for a part name.
pub fn part_file_name(name: &str) -> Result<PathBuf, SplitError> {
    let bad_name = || SplitError::BadName(name.to_string());

    let sanitized = sanitize_path(name);
    if sanitized.is_empty() || sanitized == "." || sanitized == "/" {
        return Err(bad_name());
    }

    let relative = sanitized.trim_start_matches('/');
    let stem = relative.strip_prefix('.').unwrap_or(relative);
    if stem.is_empty() {
        return Err(bad_name());
    }

    let file_name = PathBuf::from(format!("{}.{}", stem, EXTENSION));
    if !file_name
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        return Err(bad_name());
    }
    Ok(file_name)
}

/// Encodes `image` as PNG and stores it under `output_dir` using the part's name.
///
/// The image is encoded in memory and written through a temporary file that is
/// renamed into place, so a failure never leaves a truncated file behind.
pub fn write_part(image: &RgbaImage, name: &str, output_dir: &Path) -> Result<PathBuf, SplitError> {
    let path = output_dir.join(part_file_name(name)?);
    write_png(image, &path)?;
    Ok(path)
}

pub fn write_png(image: &RgbaImage, path: &Path) -> Result<(), SplitError> {
    let mut encoded = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
        .map_err(SplitError::Encode)?;

    let create = |source| SplitError::Create {
        path: path.to_path_buf(),
        source,
    };

    let parent = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(parent).map_err(create)?;

    let mut file = NamedTempFile::new_in(parent).map_err(create)?;
    file.write_all(&encoded).map_err(create)?;
    file.persist(path).map_err(|e| create(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    #[test]
    fn test_write_png_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("icon.png");

        write_png(&RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255])), &path).unwrap();
        write_png(&RgbaImage::from_pixel(5, 3, Rgba([0, 255, 0, 255])), &path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (5, 3));
        assert_eq!(loaded.get_pixel(4, 2), &Rgba([0, 255, 0, 255]));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_part_uses_sanitized_name() {
        let dir = tempdir().unwrap();
        let image = RgbaImage::from_pixel(3, 2, Rgba([0, 0, 255, 255]));

        let path = write_part(&image, ".Icon-A", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("icon-a.png"));

        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (3, 2));
        assert_eq!(loaded.get_pixel(2, 1), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn test_write_part_creates_subdirectories() {
        let dir = tempdir().unwrap();
        let image = RgbaImage::new(1, 1);

        let path = write_part(&image, "icons/small/.home", dir.path()).unwrap();
        assert_eq!(path, dir.path().join("icons/small/.home.png"));
        assert!(path.exists());
    }

    #[test]
    fn test_write_part_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        write_part(&RgbaImage::new(2, 2), ".a", dir.path()).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("a.png")]);
    }

    #[test]
    fn test_encode_failure_writes_nothing() {
        let dir = tempdir().unwrap();
        let empty = RgbaImage::new(0, 0);

        let err = write_part(&empty, ".empty", dir.path()).unwrap_err();
        assert!(matches!(err, SplitError::Encode(_)));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_part_file_name() {
        assert_eq!(part_file_name(".icon-a").unwrap(), PathBuf::from("icon-a.png"));
        assert_eq!(part_file_name("#logo").unwrap(), PathBuf::from("logo.png"));
        assert_eq!(
            part_file_name("../../etc/passwd").unwrap(),
            PathBuf::from("etc/passwd.png")
        );
        assert_eq!(part_file_name("a:hover").unwrap(), PathBuf::from("a-hover.png"));
    }

    #[test]
    fn test_part_file_name_stays_below_output_dir() {
        assert_eq!(part_file_name("/.*./.*./x").unwrap(), PathBuf::from("x.png"));
        assert_eq!(part_file_name("a/.*./.*./b").unwrap(), PathBuf::from("a/b.png"));

        for name in [
            "/.*./.*./x",
            "a/.*./.*./b",
            r".x\/\.\*\.\/\.\*\.\/escaped",
            "..../...../z",
        ] {
            let file_name = part_file_name(name).unwrap();
            assert!(
                file_name
                    .components()
                    .all(|c| matches!(c, Component::Normal(_))),
                "{:?} -> {:?}",
                name,
                file_name
            );
        }
    }

    #[test]
    fn test_part_file_name_rejects_degenerate_names() {
        for name in ["", "*", ".", "/", "[]", ". ", "/."] {
            assert!(
                matches!(part_file_name(name), Err(SplitError::BadName(_))),
                "{:?}",
                name
            );
        }
    }
}
