//! Digest manifest utility for the bundled models.
//!
//! Writes `manifest.json` with the SHA-256 digest of every model file found
//! in the model directory, or checks the files against an existing manifest.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hash_models -- <model_dir> [--check]
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use vitalcheck::adapters::onnx::{sha256_hex, ModelManifest, MANIFEST_FILE, MANIFEST_VERSION};
use vitalcheck::domain::PredictionTask;

fn usage() -> anyhow::Error {
    anyhow!("Usage: hash_models <model_dir> [--check]")
}

fn parse_args() -> Result<(PathBuf, bool)> {
    let mut model_dir: Option<PathBuf> = None;
    let mut check = false;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--check" => check = true,
            "-h" | "--help" => return Err(usage()),
            _ if model_dir.is_none() => model_dir = Some(PathBuf::from(arg)),
            _ => return Err(usage()),
        }
    }

    Ok((model_dir.ok_or_else(usage)?, check))
}

fn main() -> Result<()> {
    let (model_dir, check) = parse_args()?;

    if check {
        let manifest = ModelManifest::load(&model_dir)?
            .ok_or_else(|| anyhow!("No {MANIFEST_FILE} in {}", model_dir.display()))?;
        for file in manifest.files.keys() {
            let bytes = fs::read(model_dir.join(file))
                .with_context(|| format!("Manifest references unreadable file {file}"))?;
            manifest.verify(file, &bytes)?;
            println!("OK       {file}");
        }
        return Ok(());
    }

    let mut files = BTreeMap::new();
    for task in PredictionTask::ALL {
        let path = model_dir.join(task.model_file());
        if !path.exists() {
            println!("MISSING  {}", task.model_file());
            continue;
        }
        let bytes =
            fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let digest = sha256_hex(&bytes);
        println!("{digest}  {}", task.model_file());
        files.insert(task.model_file().to_string(), digest);
    }

    if files.is_empty() {
        bail!("No model files found in {}", model_dir.display());
    }

    let manifest = ModelManifest {
        version: MANIFEST_VERSION,
        files,
    };
    let manifest_path = model_dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    println!("Wrote manifest: {}", manifest_path.display());
    Ok(())
}
