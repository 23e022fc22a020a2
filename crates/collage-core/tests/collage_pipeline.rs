//! End-to-end collage tests against real files on disk.

use collage_core::{CollageCreator, CollageError, Config, OutputFormat};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::{Path, PathBuf};

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

fn write_png(dir: &Path, name: &str, size: u32, color: Rgb<u8>) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(size, size, color)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

fn four_tiles(dir: &Path) -> Vec<PathBuf> {
    vec![
        write_png(dir, "1.png", 100, RED),
        write_png(dir, "2.png", 100, GREEN),
        write_png(dir, "3.png", 100, BLUE),
        write_png(dir, "4.png", 100, BLACK),
    ]
}

#[test]
fn test_two_by_two_collage_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let paths = four_tiles(dir.path());
    let output = dir.path().join("result.tif");

    let creator = CollageCreator::new(&Config::default()).unwrap();
    let report = creator
        .create_and_save(&paths, &output, OutputFormat::Tiff)
        .unwrap();
    assert_eq!(report.image_count, 4);

    let saved = image::open(&output).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (250, 250));

    // Column-major: 1 and 2 fill the first column, 3 and 4 the second.
    assert_eq!(*saved.get_pixel(20, 20), RED);
    assert_eq!(*saved.get_pixel(20, 130), GREEN);
    assert_eq!(*saved.get_pixel(130, 20), BLUE);
    assert_eq!(*saved.get_pixel(229, 229), BLACK);

    // Margin and spacing stay white.
    assert_eq!(*saved.get_pixel(0, 0), WHITE);
    assert_eq!(*saved.get_pixel(125, 60), WHITE);
    assert_eq!(*saved.get_pixel(249, 249), WHITE);
}

#[test]
fn test_single_image_single_row() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![write_png(dir.path(), "only.png", 7, RED)];
    let output = dir.path().join("one.png");

    let mut config = Config::default();
    config.layout.rows = 1;
    config.layout.spacing = 0;
    config.layout.margin = 0;
    let creator = CollageCreator::new(&config).unwrap();
    creator
        .create_and_save(&paths, &output, OutputFormat::Png)
        .unwrap();

    let saved = image::open(&output).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (7, 7));
    assert!(saved.pixels().all(|p| *p == RED));
}

#[test]
fn test_corrupt_input_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = four_tiles(dir.path());
    let corrupt = dir.path().join("corrupt.png");
    std::fs::write(&corrupt, b"\x89PNG\r\n\x1a\nnot really").unwrap();
    paths.insert(1, corrupt);
    let output = dir.path().join("result.tif");

    let creator = CollageCreator::new(&Config::default()).unwrap();
    let err = creator
        .create_and_save(&paths, &output, OutputFormat::Tiff)
        .unwrap_err();

    assert!(matches!(err, CollageError::Source(_)));
    assert!(err.to_string().contains("corrupt.png"));
    assert!(!output.exists());
}

#[test]
fn test_empty_input_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("result.tif");

    let creator = CollageCreator::new(&Config::default()).unwrap();
    let err = creator
        .create_and_save(&[], &output, OutputFormat::Tiff)
        .unwrap_err();

    assert!(matches!(err, CollageError::Layout(_)));
    assert!(!output.exists());
}

#[test]
fn test_second_save_replaces_first() {
    let dir = tempfile::tempdir().unwrap();
    let paths = four_tiles(dir.path());
    let output = dir.path().join("out").join("result.png");
    std::fs::create_dir(output.parent().unwrap()).unwrap();

    let creator = CollageCreator::new(&Config::default()).unwrap();
    creator
        .create_and_save(&paths, &output, OutputFormat::Png)
        .unwrap();
    creator
        .create_and_save(&paths[..1], &output, OutputFormat::Png)
        .unwrap();

    let saved = image::open(&output).unwrap();
    assert_eq!((saved.width(), saved.height()), (140, 250));
    let entries = std::fs::read_dir(output.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_folder_input_expands_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    let folder = dir.path().join("photos");
    std::fs::create_dir(&folder).unwrap();
    write_png(&folder, "b.png", 10, GREEN);
    write_png(&folder, "a.png", 10, RED);
    std::fs::write(folder.join("notes.txt"), b"skip me").unwrap();

    let mut config = Config::default();
    config.layout.rows = 1;
    config.layout.spacing = 0;
    config.layout.margin = 0;
    let creator = CollageCreator::new(&config).unwrap();
    let paths = creator.discover(&[folder.clone()]);
    assert_eq!(paths, vec![folder.join("a.png"), folder.join("b.png")]);

    let output = dir.path().join("row.png");
    creator
        .create_and_save(&paths, &output, OutputFormat::Png)
        .unwrap();
    let saved = image::open(&output).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (20, 10));
    assert_eq!(*saved.get_pixel(0, 0), RED);
    assert_eq!(*saved.get_pixel(10, 0), GREEN);
}

#[tokio::test]
async fn test_concurrent_matches_sequential() {
    let dir = tempfile::tempdir().unwrap();
    let paths = four_tiles(dir.path());
    let sequential = dir.path().join("sequential.png");
    let concurrent = dir.path().join("concurrent.png");

    let creator = CollageCreator::new(&Config::default()).unwrap();
    creator
        .create_and_save(&paths, &sequential, OutputFormat::Png)
        .unwrap();
    creator
        .create_and_save_concurrent(&paths, &concurrent, OutputFormat::Png)
        .await
        .unwrap();

    let a = image::open(&sequential).unwrap().to_rgb8();
    let b = image::open(&concurrent).unwrap().to_rgb8();
    assert_eq!(a, b);
}
