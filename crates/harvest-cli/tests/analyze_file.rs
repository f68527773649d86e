use assert_cmd::cargo::cargo_bin_cmd;
use harvest_lib::{metrics::discharge::DischargeAnalysis, signal::DropEvents};
use serde_json::Value;
use std::{error::Error, path::PathBuf};

#[test]
fn reference_log_report() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "analyze-file",
        "--input",
        &sample_path("test_data/reseau_20dBm_330m.csv"),
        "--threshold",
        "0.5",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&output)?;

    assert_eq!(report["source"], "reseau_20dBm_330m.csv");
    assert_eq!(report["sample_count"], 7);
    assert_eq!(report["drops"]["indices"], serde_json::json!([2, 5]));
    assert_eq!(report["cycles"][0]["peak_index"], 4);
    assert!(report["skipped"].is_null());

    let summary = &report["summary"];
    assert_eq!(summary["power_level_dbm"], 20);
    assert_eq!(summary["cycle_count"], 2);
    assert_close(summary["first_charge_h"].as_f64().unwrap(), 2.0 / 3600.0, 1e-12);
    assert_close(summary["mean_recharge_min"].as_f64().unwrap(), 0.0333, 1e-4);
    Ok(())
}

#[test]
fn default_threshold_counts_every_step_below_it() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "detect-drops",
        "--input",
        &sample_path("test_data/reseau_20dBm_330m.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let drops: DropEvents = serde_json::from_slice(&output)?;
    assert_eq!(drops.indices, vec![1, 2, 5]);
    Ok(())
}

#[test]
fn config_file_sets_threshold() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "detect-drops",
        "--input",
        &sample_path("test_data/reseau_20dBm_330m.csv"),
        "--config",
        &sample_path("test_data/strict_threshold.toml"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let drops: DropEvents = serde_json::from_slice(&output)?;
    assert_eq!(drops.indices, vec![2]);
    Ok(())
}

#[test]
fn flat_log_is_reported_as_skipped() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "analyze-file",
        "--input",
        &sample_path("test_data/rectenna_unitaire/unitaire_12dBm_330m.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let report: Value = serde_json::from_slice(&output)?;
    assert_eq!(report["skipped"], "NoDrops");
    assert!(report["summary"].is_null());
    Ok(())
}

#[test]
fn log_without_sample_interval_fails() {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "analyze-file",
        "--input",
        &sample_path("test_data/rectenna_unitaire/unitaire_20dBm_330m.csv"),
    ]);
    cmd.assert().failure();
}

#[test]
fn discharge_timing() -> Result<(), Box<dyn Error>> {
    let mut cmd = cargo_bin_cmd!("harvest");
    cmd.args([
        "discharge",
        "--input",
        &sample_path("test_data/decharge_20dBmTx_330mf.csv"),
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let analysis: DischargeAnalysis = serde_json::from_slice(&output)?;
    assert_eq!(analysis.onset_index, 3);
    assert_eq!(analysis.minimum_index, 6);
    assert_close(analysis.duration_ms, 3.0, 1e-9);
    Ok(())
}

fn assert_close(a: f64, b: f64, tol: f64) {
    let diff = (a - b).abs();
    assert!(
        diff <= tol,
        "diff {} exceeded tol {} ({} vs {})",
        diff,
        tol,
        a,
        b
    );
}

fn sample_path(relative: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .join(relative)
        .to_string_lossy()
        .to_string()
}
