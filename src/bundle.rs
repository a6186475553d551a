use crate::block::Workspace;
use crate::codegen::generate_program;
use crate::document;
use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::ZipArchive;

const BUNDLE_FORMAT: &str = "jbb";
const BUNDLE_VERSION: u64 = 1;

#[derive(Debug)]
pub struct Bundle {
    pub workspace: Workspace,
    pub source: String,
    // False when program.js no longer matches the manifest digest; the
    // workspace document stays authoritative either way.
    pub digest_ok: bool,
}

pub fn write_bundle_file(workspace: &Workspace, output_path: &Path) -> Result<()> {
    let bytes = build_bundle_bytes(workspace)?;
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(output_path, bytes)?;
    Ok(())
}

pub fn build_bundle_bytes(workspace: &Workspace) -> Result<Vec<u8>> {
    let source = generate_program(workspace);
    let digest = format!("{:x}", md5::compute(source.as_bytes()));

    let mut out = Cursor::new(Vec::<u8>::new());
    let mut zip = zip::ZipWriter::new(&mut out);
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let manifest = json!({
        "format": BUNDLE_FORMAT,
        "version": BUNDLE_VERSION,
        "block_count": workspace.block_count(),
        "source_digest": digest,
    });

    zip.start_file("manifest.json", opts)?;
    zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    zip.start_file("workspace.json", opts)?;
    zip.write_all(document::document_to_string(workspace)?.as_bytes())?;

    zip.start_file("program.js", opts)?;
    zip.write_all(source.as_bytes())?;

    zip.finish()?;
    Ok(out.into_inner())
}

pub fn read_bundle_file(path: &Path) -> Result<Bundle> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read '{}'.", path.display()))?;
    read_bundle_bytes(&bytes)
}

pub fn read_bundle_bytes(bytes: &[u8]) -> Result<Bundle> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))
        .map_err(|_| anyhow!("Input is not a valid .jbb archive."))?;

    let manifest_text = read_zip_entry_text(&mut zip, "manifest.json")?;
    let workspace_text = read_zip_entry_text(&mut zip, "workspace.json")?;
    let source = read_zip_entry_text(&mut zip, "program.js")?;

    let manifest: Value =
        serde_json::from_str(&manifest_text).context("Invalid manifest.json in .jbb archive.")?;
    let format = manifest
        .get("format")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if format != BUNDLE_FORMAT {
        bail!("Invalid .jbb archive format '{}'.", format);
    }
    let version = manifest
        .get("version")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    if version != BUNDLE_VERSION {
        bail!(
            "Unsupported .jbb version {} (expected {}).",
            version,
            BUNDLE_VERSION
        );
    }

    let workspace = document::load_document_str(&workspace_text)
        .context("Invalid workspace.json in .jbb archive.")?;

    let digest_ok = match manifest.get("source_digest").and_then(Value::as_str) {
        Some(expected) => expected == format!("{:x}", md5::compute(source.as_bytes())),
        None => false,
    };

    Ok(Bundle {
        workspace,
        source,
        digest_ok,
    })
}

fn read_zip_entry_text<R: Read + std::io::Seek>(
    zip: &mut ZipArchive<R>,
    name: &str,
) -> Result<String> {
    let mut entry = zip
        .by_name(name)
        .with_context(|| format!("Missing '{}' in .jbb archive.", name))?;
    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .with_context(|| format!("Failed reading '{}' from .jbb archive.", name))?;
    Ok(text)
}
