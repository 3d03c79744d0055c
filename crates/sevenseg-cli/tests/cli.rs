use assert_cmd::Command;
use image::RgbImage;
use predicates::prelude::*;
use std::path::Path;

fn write_blank_frame(path: &Path) {
    RgbImage::new(320, 240).save(path).unwrap();
}

#[test]
fn requires_at_least_one_image() {
    Command::cargo_bin("sevenseg")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unreadable_display_is_null_with_success_status() {
    let tmp = tempfile::tempdir().unwrap();
    let frame = tmp.path().join("blank.png");
    write_blank_frame(&frame);

    Command::cargo_bin("sevenseg")
        .unwrap()
        .arg(&frame)
        .assert()
        .success()
        .stdout("[null]\n");
}

#[test]
fn unloadable_input_is_null_with_failure_status() {
    Command::cargo_bin("sevenseg")
        .unwrap()
        .arg("/nonexistent/frame.jpg")
        .assert()
        .failure()
        .stdout("[null]\n");
}

#[test]
fn batch_continues_past_a_bad_input() {
    let tmp = tempfile::tempdir().unwrap();
    let frame = tmp.path().join("blank.png");
    write_blank_frame(&frame);

    Command::cargo_bin("sevenseg")
        .unwrap()
        .arg(&frame)
        .arg(tmp.path().join("missing.png"))
        .arg(&frame)
        .assert()
        .failure()
        .stdout("[null,null,null]\n");
}

#[test]
fn debug_dir_collects_per_input_dumps() {
    let tmp = tempfile::tempdir().unwrap();
    let frame = tmp.path().join("blank.png");
    write_blank_frame(&frame);
    let dumps = tmp.path().join("dumps");

    Command::cargo_bin("sevenseg")
        .unwrap()
        .arg("--debug-dir")
        .arg(&dumps)
        .arg(&frame)
        .assert()
        .success();

    assert!(dumps.join("blank/01-edges.png").exists());
}

#[test]
fn flood_threshold_flag_is_accepted() {
    let tmp = tempfile::tempdir().unwrap();
    let frame = tmp.path().join("blank.png");
    write_blank_frame(&frame);

    Command::cargo_bin("sevenseg")
        .unwrap()
        .arg("--flood-threshold")
        .arg("0.5")
        .arg(&frame)
        .assert()
        .success()
        .stdout("[null]\n");
}
