use anyhow::{anyhow, Context};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const DATA_ENTRY: &str = "data/dayplan_data.json";
const META_WORKSPACE_ENTRY: &str = "meta/workspace.json";
pub const BUNDLE_FORMAT_V1: &str = "dayplan-workspace-v1";
pub const RAW_JSON_FORMAT: &str = "raw-json";

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
    pub sha256: String,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Writes `data_path` into a zip bundle at `out_path`.
pub fn export_workspace_bundle(
    data_path: &Path,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let data = std::fs::read(data_path).with_context(|| {
        format!(
            "workspace data file not found: {}",
            data_path.to_string_lossy()
        )
    })?;
    let digest = sha256_hex(&data);

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let exported_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let manifest = json!({
        "format": BUNDLE_FORMAT_V1,
        "version": 1,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "exportedAt": exported_at,
        "dataSha256": digest,
    });
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    zip.start_file(DATA_ENTRY, opts)
        .context("failed to start data entry")?;
    zip.write_all(&data).context("failed to write data entry")?;

    let workspace_meta = json!({
        "sourceDataFile": data_path.to_string_lossy(),
    });
    zip.start_file(META_WORKSPACE_ENTRY, opts)
        .context("failed to start workspace metadata entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&workspace_meta)
            .context("failed to serialize workspace metadata")?
            .as_bytes(),
    )
    .context("failed to write workspace metadata entry")?;

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 3,
        sha256: digest,
    })
}

/// Restores a bundle (or a bare JSON data file) over `data_path`.
///
/// `validate` sees the incoming data before anything is written; when it
/// fails, `data_path` is left as it was.
pub fn import_workspace_bundle<F>(
    in_path: &Path,
    data_path: &Path,
    validate: F,
) -> anyhow::Result<ImportSummary>
where
    F: FnOnce(&[u8]) -> anyhow::Result<()>,
{
    if let Some(parent) = data_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create workspace {}", parent.to_string_lossy()))?;
    }

    if !is_zip_file(in_path)? {
        let bytes = std::fs::read(in_path)
            .with_context(|| format!("failed to read {}", in_path.to_string_lossy()))?;
        serde_json::from_slice::<serde_json::Value>(&bytes)
            .context("input is neither a bundle nor a JSON data file")?;
        validate(&bytes).context("imported data is not a usable planner document")?;
        replace_file(&bytes, data_path)?;
        return Ok(ImportSummary {
            bundle_format_detected: RAW_JSON_FORMAT.to_string(),
        });
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: serde_json::Value =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid JSON")?;
    let format = manifest
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    if format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", format));
    }

    let mut data = Vec::new();
    archive
        .by_name(DATA_ENTRY)
        .context("bundle missing data/dayplan_data.json")?
        .read_to_end(&mut data)
        .context("failed to extract data entry")?;

    let expected = manifest
        .get("dataSha256")
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow!("bundle manifest missing dataSha256"))?;
    let actual = sha256_hex(&data);
    if actual != expected {
        return Err(anyhow!(
            "bundle checksum mismatch: expected {}, got {}",
            expected,
            actual
        ));
    }
    validate(&data).context("bundle data is not a usable planner document")?;

    replace_file(&data, data_path)?;
    Ok(ImportSummary {
        bundle_format_detected: BUNDLE_FORMAT_V1.to_string(),
    })
}

fn replace_file(bytes: &[u8], dst: &Path) -> anyhow::Result<()> {
    let mut tmp_name = dst
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| anyhow!("invalid data path {}", dst.to_string_lossy()))?;
    tmp_name.push(".importing");
    let tmp_dst = dst.with_file_name(tmp_name);
    if tmp_dst.exists() {
        let _ = std::fs::remove_file(&tmp_dst);
    }

    let written = write_temp(bytes, &tmp_dst).and_then(|()| {
        std::fs::rename(&tmp_dst, dst).with_context(|| {
            format!(
                "failed to move imported data to {}",
                dst.to_string_lossy()
            )
        })
    });
    if written.is_err() {
        let _ = std::fs::remove_file(&tmp_dst);
    }
    written
}

fn write_temp(bytes: &[u8], tmp_dst: &Path) -> anyhow::Result<()> {
    let mut out = File::create(tmp_dst).with_context(|| {
        format!(
            "failed to create temp file {}",
            tmp_dst.to_string_lossy()
        )
    })?;
    out.write_all(bytes).context("failed to write temp file")?;
    out.sync_all().context("failed to flush temp file")?;
    Ok(())
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}
