// End-to-end tests: stylesheet -> parts -> files on disk

#[cfg(test)]
mod tests {
    use crate::app;
    use crate::config::Config;
    use crate::css::parse_stylesheet;
    use crate::model::part::Rect;
    use crate::pipeline::find::find_all;
    use crate::pipeline::parts::{distinct, scale};
    use crate::pipeline::splitter::{PartOutcome, SplitOptions, split_parts};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const SHEET: &str = "
        .sprite { background-image: url(sprite.png); }
        .icon-a { width: 20px; height: 20px; background-position: -10px -5px; }
        .icon-b { background: url(s.png) -40px -30px no-repeat; width: 15px; height: 15px; }
        .icon-b-copy { background-position: -40px -30px; width: 15px; height: 15px; }
        @media (min-resolution: 2dppx) { .icon-a { background-size: 50px 50px; } }
        .too-far { width: 30px; height: 30px; background-position: -90px -90px; }
    ";

    fn sprite(width: u32, height: u32) -> DynamicImage {
        let mut img = RgbaImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let val = ((x + y) * 2) as u8;
                img.put_pixel(x, y, Rgba([val, x as u8, y as u8, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    fn dims(path: &Path) -> (u32, u32) {
        let loaded = image::open(path).unwrap().to_rgba8();
        loaded.dimensions()
    }

    #[test]
    fn test_sheet_to_files_round_trip() {
        let temp_dir = tempdir().unwrap();
        let out = temp_dir.path().join("split");
        fs::create_dir_all(&out).unwrap();

        let sheet = parse_stylesheet(SHEET).unwrap();
        let report = find_all(&sheet);
        assert_eq!(report.parts.len(), 4);
        assert_eq!(report.skipped.len(), 2);

        let parts = distinct(report.parts, false);
        let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec![".icon-a", ".icon-b-copy", ".too-far"]);

        let sprite = sprite(100, 100);
        let mut lines = Vec::new();
        let stats = split_parts(&sprite, &parts, &SplitOptions::new(&out), |o| {
            lines.push(o.to_string())
        })
        .unwrap();

        assert_eq!(stats.written, 2);
        assert_eq!(stats.failed, 1);
        assert!(lines.contains(&"wrote .icon-a".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.starts_with("failed to crop rule .too-far"))
        );

        for part in parts.iter().filter(|p| p.name != ".too-far") {
            let file = out.join(format!("{}.png", part.name.trim_start_matches('.')));
            assert_eq!(
                dims(&file),
                (part.rect.width() as u32, part.rect.height() as u32)
            );
        }

        let icon_a = image::open(out.join("icon-a.png")).unwrap().to_rgba8();
        let src = sprite.to_rgba8();
        assert_eq!(icon_a.get_pixel(0, 0), src.get_pixel(10, 5));
        assert_eq!(icon_a.get_pixel(19, 19), src.get_pixel(29, 24));
        assert!(!out.join("too-far.png").exists());
    }

    #[test]
    fn test_named_distinct_keeps_both_copies() {
        let sheet = parse_stylesheet(SHEET).unwrap();
        let parts = distinct(find_all(&sheet).parts, true);
        assert_eq!(parts.len(), 4);
    }

    #[test]
    fn test_scaled_parts_crop_larger_regions() {
        let temp_dir = tempdir().unwrap();
        let sheet = parse_stylesheet(
            ".icon-a { width: 20px; height: 20px; background-position: -10px -5px; }",
        )
        .unwrap();
        let parts = scale(&find_all(&sheet).parts, 2).unwrap();
        assert_eq!(parts[0].rect, Rect::new(10, 5, 50, 45));

        let stats = split_parts(
            &sprite(100, 100),
            &parts,
            &SplitOptions::new(temp_dir.path()),
            |_| {},
        )
        .unwrap();
        assert_eq!(stats.written, 1);
        assert_eq!(dims(&temp_dir.path().join("icon-a.png")), (40, 40));
    }

    #[test]
    fn test_escaped_selector_is_written_inside_output_dir() {
        let temp_dir = tempdir().unwrap();
        let out = temp_dir.path().join("a/b/out");
        fs::create_dir_all(&out).unwrap();

        let sheet = parse_stylesheet(
            r".x\/\.\*\.\/\.\*\.\/escaped { width: 2px; height: 2px; background-position: 0 0 }",
        )
        .unwrap();
        let parts = find_all(&sheet).parts;
        assert_eq!(parts.len(), 1);

        let mut written = Vec::new();
        let stats = split_parts(&sprite(10, 10), &parts, &SplitOptions::new(&out), |o| {
            if let PartOutcome::Written { path, .. } = o {
                written.push(path.clone());
            }
        })
        .unwrap();

        assert_eq!(stats.written, 1);
        assert_eq!(written, vec![out.join("x/escaped.png")]);
        assert_eq!(dims(&written[0]), (2, 2));
        assert!(!temp_dir.path().join("a/b/escaped.png").exists());
        assert!(!temp_dir.path().join("a/escaped.png").exists());
    }

    fn write_inputs(dir: &Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let sprite_path = dir.join("sprite.png");
        sprite(100, 100).save(&sprite_path).unwrap();
        let css_dir = dir.join("css");
        fs::create_dir_all(&css_dir).unwrap();
        fs::write(css_dir.join("icons.css"), SHEET).unwrap();
        fs::write(
            css_dir.join("more.css"),
            ".more { width: 5px; height: 6px; background-position: 0 0; }",
        )
        .unwrap();
        (sprite_path, css_dir)
    }

    #[test]
    fn test_app_run() {
        let temp_dir = tempdir().unwrap();
        let (sprite_path, css_dir) = write_inputs(temp_dir.path());
        let config = Config {
            output_dir: temp_dir.path().join("out/nested"),
            jobs: Some(2),
            ..Config::default()
        };

        let summary = app::run(&sprite_path, &[css_dir], &config).unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.written, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(dims(&config.output_dir.join("more.png")), (5, 6));
    }

    #[test]
    fn test_app_run_strict_fails_on_bad_part() {
        let temp_dir = tempdir().unwrap();
        let (sprite_path, css_dir) = write_inputs(temp_dir.path());
        let config = Config {
            output_dir: temp_dir.path().join("out"),
            strict: true,
            ..Config::default()
        };

        let err = app::run(&sprite_path, &[css_dir], &config).unwrap_err();
        assert!(err.to_string().contains("1 of 4 parts"));
        assert!(config.output_dir.join("icon-a.png").exists());
    }

    #[test]
    fn test_app_run_setup_errors() {
        let temp_dir = tempdir().unwrap();
        let (sprite_path, css_dir) = write_inputs(temp_dir.path());
        let config = Config {
            output_dir: temp_dir.path().join("out"),
            ..Config::default()
        };

        let missing = temp_dir.path().join("missing.png");
        let err = app::run(&missing, &[css_dir.clone()], &config).unwrap_err();
        assert_eq!(err.to_string(), "error reading sprite");

        let not_image = css_dir.join("more.css");
        let err = app::run(&not_image, &[css_dir.clone()], &config).unwrap_err();
        assert_eq!(err.to_string(), "error decoding sprite");

        let bad_css = temp_dir.path().join("bad.css");
        fs::write(&bad_css, ".a { width: 1px }\n.dangling").unwrap();
        let err = app::run(&sprite_path, &[bad_css], &config).unwrap_err();
        assert!(err.to_string().starts_with("failed to parse css"));

        let bad_ratio = Config {
            ratio: 0,
            ..config.clone()
        };
        let err = app::run(&sprite_path, &[css_dir], &bad_ratio).unwrap_err();
        assert_eq!(err.to_string(), "failed to scale to ratio");
        assert!(!config.output_dir.exists());
    }
}
