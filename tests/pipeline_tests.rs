//! End-to-end pipeline tests: full dispatch runs over temporary trees

use std::fs;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use tempfile::TempDir;

use shrinkset::{Dispatcher, RunPlan};

fn write_rgb_jpeg(path: &Path, width: u32, height: u32) {
    let img: RgbImage = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 255) as u8, (y % 255) as u8, ((x + y) % 255) as u8])
    });
    img.save(path).unwrap();
}

fn write_gray_png(path: &Path, width: u32, height: u32) {
    let img: GrayImage = ImageBuffer::from_fn(width, height, |x, y| Luma([((x * y) % 255) as u8]));
    img.save(path).unwrap();
}

fn plan(root: &Path, algorithm: &str) -> RunPlan {
    RunPlan {
        input_root: root.join("in"),
        output_root: root.join("out"),
        algorithm: algorithm.to_string(),
        size: 32,
        workers: 4,
        log_file: root.join("log.txt"),
    }
}

fn assert_rgb_32x32(path: &Path) {
    let img = image::open(path).unwrap();
    assert_eq!((img.width(), img.height()), (32, 32), "{:?}", path);
    assert!(
        matches!(img, DynamicImage::ImageRgb8(_)),
        "{:?} is not three-channel color",
        path
    );
}

fn dir_entries(path: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<_> = fs::read_dir(path)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    entries.sort();
    entries
}

#[tokio::test]
async fn two_folder_scenario() {
    let dir = TempDir::new().unwrap();
    let cat_a = dir.path().join("in/catA");
    let cat_b = dir.path().join("in/catB");
    fs::create_dir_all(&cat_a).unwrap();
    fs::create_dir_all(&cat_b).unwrap();

    write_rgb_jpeg(&cat_a.join("valid.jpg"), 120, 90);
    fs::write(cat_a.join("corrupt.jpg"), b"\xff\xd8\xff truncated junk").unwrap();
    write_gray_png(&cat_b.join("gray.png"), 64, 64);

    let plan = plan(dir.path(), "box");
    let summary = Dispatcher::new(plan.clone()).run().await.unwrap();

    assert_eq!(summary.folders_completed, 2);
    assert_eq!(summary.images_resized, 2);
    assert_eq!(summary.images_failed, 1);
    assert!(summary.task_errors.is_empty());

    // catA: exactly one output, from the valid JPEG
    let cat_a_out = dir.path().join("out/catA");
    assert_eq!(dir_entries(&cat_a_out), vec![cat_a_out.join("valid.png")]);
    assert_rgb_32x32(&cat_a_out.join("valid.png"));

    // catB: the grayscale PNG came out as three-channel color
    assert_rgb_32x32(&dir.path().join("out/catB/gray.png"));

    // One log line, referencing the corrupt input path
    let log = fs::read_to_string(&plan.log_file).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("Couldn't resize: "));
    assert!(lines[0].contains("corrupt.jpg"));
}

#[tokio::test]
async fn mixed_case_algorithm_matches_lowercase() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(&class_dir).unwrap();
    write_rgb_jpeg(&class_dir.join("img.jpg"), 77, 41);

    let mut upper = plan(dir.path(), "NEAREST");
    upper.output_root = dir.path().join("out_upper");
    let mut lower = plan(dir.path(), "nearest");
    lower.output_root = dir.path().join("out_lower");

    Dispatcher::new(upper).run().await.unwrap();
    Dispatcher::new(lower).run().await.unwrap();

    let upper_bytes = fs::read(dir.path().join("out_upper/catA/img.png")).unwrap();
    let lower_bytes = fs::read(dir.path().join("out_lower/catA/img.png")).unwrap();
    assert_eq!(upper_bytes, lower_bytes);
}

#[tokio::test]
async fn unsupported_algorithm_is_complete_noop() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(&class_dir).unwrap();
    write_rgb_jpeg(&class_dir.join("img.jpg"), 50, 50);

    let plan = plan(dir.path(), "gaussian");
    let summary = Dispatcher::new(plan.clone()).run().await.unwrap();

    assert_eq!(summary.folders_skipped, 1);
    assert_eq!(summary.folders_completed, 0);
    assert_eq!(summary.images_resized, 0);

    // No output subfolder, no log entries
    assert!(!dir.path().join("out/catA").exists());
    assert!(!plan.log_file.exists());
}

#[tokio::test]
async fn rerun_is_idempotent_and_log_accumulates() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(&class_dir).unwrap();
    write_rgb_jpeg(&class_dir.join("img.jpg"), 200, 100);
    fs::write(class_dir.join("broken.png"), b"not a png").unwrap();

    let plan = plan(dir.path(), "bilinear");
    let output = dir.path().join("out/catA/img.png");

    Dispatcher::new(plan.clone()).run().await.unwrap();
    let first_bytes = fs::read(&output).unwrap();

    Dispatcher::new(plan.clone()).run().await.unwrap();
    let second_bytes = fs::read(&output).unwrap();

    // Deterministic resampling and encoding: re-runs overwrite with
    // bit-identical results
    assert_eq!(first_bytes, second_bytes);

    // The log is never deduplicated; the persistent failure doubles
    let log = fs::read_to_string(&plan.log_file).unwrap();
    assert_eq!(log.lines().count(), 2);
    for line in log.lines() {
        assert!(line.contains("broken.png"));
    }
}

#[tokio::test]
async fn existing_outputs_are_overwritten() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(&class_dir).unwrap();
    write_rgb_jpeg(&class_dir.join("img.jpg"), 64, 64);

    let stale = dir.path().join("out/catA/img.png");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, b"stale placeholder").unwrap();

    Dispatcher::new(plan(dir.path(), "box")).run().await.unwrap();

    assert_rgb_32x32(&stale);
}

#[tokio::test]
async fn non_directories_in_root_are_excluded() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("in");
    fs::create_dir_all(root.join("catA")).unwrap();
    write_rgb_jpeg(&root.join("catA/img.jpg"), 40, 40);
    // A stray file next to the class folders must not become a task
    write_rgb_jpeg(&root.join("stray.jpg"), 40, 40);

    let plan = plan(dir.path(), "box");
    let summary = Dispatcher::new(plan.clone()).run().await.unwrap();

    assert_eq!(summary.folders_completed, 1);
    assert!(dir.path().join("out/catA/img.png").exists());
    assert!(!dir.path().join("out/stray.png").exists());
    assert!(!plan.log_file.exists());
}

#[tokio::test]
async fn nested_directory_inside_class_folder_is_logged() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(class_dir.join("nested")).unwrap();
    write_rgb_jpeg(&class_dir.join("img.jpg"), 40, 40);

    let plan = plan(dir.path(), "box");
    let summary = Dispatcher::new(plan.clone()).run().await.unwrap();

    // The nested directory fails decode like any non-image entry
    assert_eq!(summary.images_resized, 1);
    assert_eq!(summary.images_failed, 1);

    let log = fs::read_to_string(&plan.log_file).unwrap();
    assert!(log.contains("nested"));
}

#[tokio::test]
async fn target_size_applies_to_all_inputs() {
    let dir = TempDir::new().unwrap();
    let class_dir = dir.path().join("in/catA");
    fs::create_dir_all(&class_dir).unwrap();
    // Wildly different input shapes all land on the same square
    write_rgb_jpeg(&class_dir.join("wide.jpg"), 300, 20);
    write_rgb_jpeg(&class_dir.join("tall.jpg"), 20, 300);
    write_rgb_jpeg(&class_dir.join("tiny.jpg"), 4, 4);

    let mut plan = plan(dir.path(), "lanczos");
    plan.size = 16;
    Dispatcher::new(plan).run().await.unwrap();

    for name in ["wide.png", "tall.png", "tiny.png"] {
        let img = image::open(dir.path().join("out/catA").join(name)).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }
}
