//! Black-box contract tests for the `docmosaic` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

fn write_png(dir: &std::path::Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 90, 160]));
    img.save(&path).expect("fixture png saves");
    path
}

fn cli() -> Command {
    Command::cargo_bin("docmosaic").expect("binary builds")
}

#[test]
fn compose_writes_a_pdf_with_one_page_per_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(dir.path(), "a.png", 320, 240);
    let b = write_png(dir.path(), "b.png", 200, 400);
    let out = dir.path().join("out.pdf");

    cli()
        .arg("compose")
        .arg(&a)
        .arg(&b)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("out.pdf"));

    let bytes = std::fs::read(&out).expect("pdf written");
    assert!(bytes.starts_with(b"%PDF"));
    let needle = b"/Count 2";
    assert!(bytes.windows(needle.len()).any(|w| w == needle));
}

#[test]
fn compose_accepts_page_size_and_orientation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let img = write_png(dir.path(), "img.png", 100, 100);
    let out = dir.path().join("letter.pdf");

    cli()
        .arg("compose")
        .arg(&img)
        .arg("--output")
        .arg(&out)
        .arg("--page-size")
        .arg("letter")
        .arg("--orientation")
        .arg("landscape")
        .assert()
        .success();

    assert!(out.exists());
}

#[test]
fn compose_fails_for_a_missing_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("out.pdf");

    cli()
        .arg("compose")
        .arg(dir.path().join("missing.png"))
        .arg("--output")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read image"));
    assert!(!out.exists());
}

#[test]
fn compose_rejects_non_image_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let junk = dir.path().join("junk.png");
    std::fs::write(&junk, b"this is not a png").expect("fixture writes");

    cli()
        .arg("compose")
        .arg(&junk)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to decode image"));
}

#[test]
fn compose_requires_at_least_one_image() {
    cli().arg("compose").assert().failure();
}

#[test]
fn estimate_prints_json_with_counts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(dir.path(), "a.png", 64, 64);
    let b = write_png(dir.path(), "b.png", 64, 64);

    let output = cli().arg("estimate").arg(&a).arg(&b).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).expect("utf8");
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");

    assert_eq!(json["pages"], 2);
    assert_eq!(json["sections"], 2);
    assert!(json["estimated_bytes"].as_u64().expect("number") > 0);
}

#[test]
fn version_prints_the_package_version() {
    cli()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
