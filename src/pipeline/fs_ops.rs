use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn ensure_dir<P: AsRef<Path>>(p: P) -> std::io::Result<()> {
    if !p.as_ref().is_dir() {
        fs::create_dir_all(&p)?;
    }
    Ok(())
}

/// Expands directories into the `.css` files below them, sorted by path.
/// Plain file paths are passed through untouched, whatever their extension.
pub fn collect_css_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut css_files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            css_files.push(path.clone());
            continue;
        }

        let mut found: Vec<PathBuf> = WalkDir::new(path)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("css"))
                    .unwrap_or(false)
            })
            .collect();
        found.sort();
        css_files.extend(found);
    }
    css_files
}
