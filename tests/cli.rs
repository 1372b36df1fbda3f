use assert_cmd::prelude::*;
use predicates::str::contains;
use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

fn scene_file(xml: &str) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("temp scene");
    tmp.write_all(xml.as_bytes()).expect("write scene");
    tmp
}

#[test]
fn headless_run_spins_torus_and_follows_scroll() {
    let mut cmd = Command::cargo_bin("scrollscape").expect("binary exists");
    cmd.args(["--headless", "--frames", "10", "--scroll", "-1000", "--stars", "5"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 10 entities (2 lights)"))
        .stdout(contains("Presented 10 frame(s)"))
        .stdout(contains("Final scene state after 10 tick(s):"))
        .stdout(contains(" - camera pos=(0.20, 0.20, 10.00)"))
        .stdout(contains(" - torus pos=(0.00, 0.00, 0.00) rot=(0.10, 0.08, 0.10)"))
        .stdout(contains(" - light-helper pos=(14.00, 16.00, 5.00)"))
        .stdout(contains(" - grid pos=(0.00, 0.00, 0.00)"))
        .stdout(contains(" - 5 star(s)"));
}

#[test]
fn tiny_scroll_never_prints_negative_zero() {
    let mut cmd = Command::cargo_bin("scrollscape").expect("binary exists");
    cmd.args(["--headless", "--frames", "1", "--scroll", "1", "--stars", "0"]);
    cmd.assert()
        .success()
        .stdout(contains(" - camera pos=(0.00, 0.00, -0.01)"));
}

#[test]
fn scene_file_overrides_defaults() {
    let scene = scene_file(
        r#"<scene>
  <stars><count>3</count></stars>
  <torus><spin>0.5 0 0</spin></torus>
  <textures enabled="false"/>
</scene>
"#,
    );
    let mut cmd = Command::cargo_bin("scrollscape").expect("binary exists");
    cmd.arg("--scene")
        .arg(scene.path())
        .args(["--headless", "--frames", "2"]);
    cmd.assert()
        .success()
        .stdout(contains("Loaded scene with 8 entities (2 lights)"))
        .stdout(contains(" - camera pos=(0.00, 0.00, 0.00)"))
        .stdout(contains(" - torus pos=(0.00, 0.00, 0.00) rot=(1.00, 0.00, 0.00)"));
}

#[test]
fn malformed_scene_file_fails() {
    let scene = scene_file("<scene><stars><count>-4</count></stars></scene>");
    let mut cmd = Command::cargo_bin("scrollscape").expect("binary exists");
    cmd.arg("--scene").arg(scene.path()).arg("--headless");
    cmd.assert().failure().stderr(contains("failed to parse"));
}

#[test]
fn unknown_flag_prints_usage() {
    let mut cmd = Command::cargo_bin("scrollscape").expect("binary exists");
    cmd.arg("--fast");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --fast"))
        .stderr(contains("Usage: scrollscape"));
}
