use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use std::fs;
use tempfile::TempDir;

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("mergeFromCity_1.csv"),
        "共通ID,施設・場所名,住所,緯度,経度,受入対象者\n\
         1,Shelter A,松山市一番町,33.8120,132.7790,\n\
         2,Care Center,松山市二番町,33.8118,132.7789,要配慮者\n\
         3,Far Hall,,33.8300,132.7789,\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("matsu_hinan.csv"),
        "df2_共通ID,df2_地震,df2_津波,df2_高潮,df2_洪水,df2_土砂\n\
         1,○,✕,✕,△,-\n\
         2,○,○,○,○,○\n",
    )
    .unwrap();
    dir
}

fn cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("shelter-cli").unwrap();
    cmd.arg("--data-dir").arg(dir.path());
    cmd
}

#[test]
fn nearest_prints_rank_distance_and_tier() {
    let dir = data_dir();
    cmd(&dir)
        .args(["nearest", "33.8117,132.7789", "--hazard", "earthquake", "--level", "full", "--top", "1"])
        .assert()
        .success()
        .stdout(contains("1. Care Center").and(contains("0.0 km")).and(contains("near")));
}

#[test]
fn general_only_skips_restricted_shelters() {
    let dir = data_dir();
    cmd(&dir)
        .args(["nearest", "(33.8117, 132.7789)", "--top", "1", "--general-only"])
        .assert()
        .success()
        .stdout(contains("Shelter A").and(contains("Care Center").not()));
}

#[test]
fn no_match_is_reported_not_failed() {
    let dir = data_dir();
    cmd(&dir)
        .args(["nearest", "33.8117,132.7789", "--hazard", "地震", "--level", "partial"])
        .assert()
        .success()
        .stdout(contains("No matching shelter found"));
}

#[test]
fn json_output_is_tagged() {
    let dir = data_dir();
    cmd(&dir)
        .args(["--json", "nearest", "33.8117,132.7789", "--top", "2"])
        .assert()
        .success()
        .stdout(contains("\"status\": \"matches\"").and(contains("\"tier\": \"near\"")));
}

#[test]
fn malformed_point_fails() {
    let dir = data_dir();
    cmd(&dir)
        .args(["nearest", "33.8117"])
        .assert()
        .failure()
        .stderr(contains("lat,lon"));
}

#[test]
fn stats_and_search() {
    let dir = data_dir();
    cmd(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(contains("Locatable shelters: 3"));
    cmd(&dir)
        .args(["search", "far"])
        .assert()
        .success()
        .stdout(contains("Far Hall"));
}

#[test]
fn missing_column_fails_validation() {
    let dir = data_dir();
    fs::write(
        dir.path().join("mergeFromCity_1.csv"),
        "共通ID,施設・場所名,住所,経度\n1,Shelter A,,132.7790\n",
    )
    .unwrap();
    cmd(&dir)
        .arg("validate")
        .assert()
        .failure()
        .stderr(contains("緯度"));
}
