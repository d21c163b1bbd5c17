use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::process::Command;

#[test]
fn describe_prints_the_scene_inventory() {
    let mut cmd = Command::cargo_bin("shadowbox").expect("binary exists");
    cmd.arg("--describe");
    cmd.assert()
        .success()
        .stdout(contains("Scene contains 6 drawables"))
        .stdout(contains(" - floor: 4 vertices, 6 indices"))
        .stdout(contains(" - sphere:"))
        .stdout(contains("Directional light direction (-1.00, -1.00, -1.00)"))
        .stdout(contains("Point light orbit radius 3.0, height 3.0, speed 45.0 deg/s"));
}

#[test]
fn axes_flag_enables_the_overlay() {
    let mut cmd = Command::cargo_bin("shadowbox").expect("binary exists");
    cmd.args(["--describe", "--axes"]);
    cmd.assert()
        .success()
        .stdout(contains("Axis overlay enabled"));
}

#[test]
fn describe_omits_the_overlay_by_default() {
    let mut cmd = Command::cargo_bin("shadowbox").expect("binary exists");
    cmd.arg("--describe");
    cmd.assert()
        .success()
        .stdout(contains("Axis overlay enabled").not());
}

#[test]
fn unknown_arguments_are_rejected() {
    let mut cmd = Command::cargo_bin("shadowbox").expect("binary exists");
    cmd.arg("--bogus");
    cmd.assert()
        .failure()
        .stderr(contains("Unknown argument: --bogus"));
}
