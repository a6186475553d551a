pub mod ast;
pub mod block;
pub mod bundle;
pub mod codegen;
pub mod document;
pub mod import;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod stage;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

use anyhow::{anyhow, bail, Result};
use import::ImportWarning;
use interpreter::Sandbox;
use stage::RecordingStage;
use std::path::{Path, PathBuf};

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    use std::fs;

    if args.export && args.bundle {
        bail!("--bundle cannot be used with --export.");
    }
    if args.stage_svg.is_some() && !args.run {
        bail!("--stage-svg requires --run.");
    }
    if !args.keys.is_empty() && !args.run {
        bail!("--key requires --run.");
    }

    let writes_document = !args.export && (args.output.is_some() || args.bundle);
    let total_stages = 2
        + usize::from(args.export)
        + usize::from(writes_document)
        + usize::from(args.run)
        + usize::from(args.stage_svg.is_some());
    let prefix = if args.export { "Export" } else { "Import" };
    let progress = CliProgress::new(prefix, total_stages);
    let mut stage_no = 0usize;

    stage_no += 1;
    progress.emit(stage_no, "Resolving input path");
    let input = canonicalize_file(&args.input)?;

    stage_no += 1;
    progress.emit(stage_no, "Loading workspace");
    let workspace = load_workspace_file(&input)?;

    if args.export {
        stage_no += 1;
        progress.emit(stage_no, "Generating script source");
        let source = codegen::generate_program(&workspace);
        let out_file = match &args.output {
            Some(path) => path.clone(),
            None => input.with_extension("js"),
        };
        fs::write(&out_file, source)?;
    } else if writes_document {
        stage_no += 1;
        if args.bundle {
            progress.emit(stage_no, "Writing project bundle");
            let out_file = match &args.output {
                Some(path) => path.clone(),
                None => input.with_extension("jbb"),
            };
            bundle::write_bundle_file(&workspace, &out_file)?;
        } else {
            progress.emit(stage_no, "Writing workspace document");
            let out_file = match &args.output {
                Some(path) => path.clone(),
                None => input.with_extension("json"),
            };
            fs::write(&out_file, document::document_to_string(&workspace)?)?;
        }
    }

    if args.run {
        stage_no += 1;
        progress.emit(stage_no, "Running program");
        let (width, height) = parse_stage_size(&args.stage_size)?;
        let source = codegen::generate_program(&workspace);
        let stage = run_source(&source, width, height, &args.keys)?;
        if let Some(path) = &args.stage_svg {
            stage_no += 1;
            progress.emit(stage_no, "Writing stage image");
            fs::write(path, stage.to_svg_string()?)?;
        }
    }

    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn load_workspace_file(input: &Path) -> Result<block::Workspace> {
    use std::fs;

    match input.extension().and_then(|e| e.to_str()) {
        Some("json") => {
            let text = fs::read_to_string(input)?;
            document::load_document_str(&text)
                .map_err(|e| anyhow!("Failed to load '{}': {}", input.display(), e))
        }
        Some("jbb") => {
            let bundle = bundle::read_bundle_file(input)?;
            if !bundle.digest_ok {
                eprintln!(
                    "warning: program.js in '{}' does not match its manifest digest; using the workspace document.",
                    input.display()
                );
            }
            Ok(bundle.workspace)
        }
        _ => {
            let text = fs::read_to_string(input)?;
            let (workspace, warnings) = import::import_source(&text);
            report_warnings(&warnings);
            Ok(workspace)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn report_warnings(warnings: &[ImportWarning]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}

pub fn import_source_to_document_string(source: &str) -> Result<(String, Vec<ImportWarning>)> {
    let (workspace, warnings) = import::import_source(source);
    Ok((document::document_to_string(&workspace)?, warnings))
}

pub fn export_document_string_to_source(document_json: &str) -> Result<String> {
    let workspace = document::load_document_str(document_json)?;
    Ok(codegen::generate_program(&workspace))
}

pub fn run_source(
    source: &str,
    width: f64,
    height: f64,
    pressed_keys: &[String],
) -> Result<RecordingStage> {
    let mut stage = RecordingStage::new(width, height);
    {
        let mut sandbox = Sandbox::new(&mut stage, width, height);
        for key in pressed_keys {
            sandbox.keys_mut().press(key.clone());
        }
        sandbox
            .run(source)
            .map_err(|e| anyhow!("Runtime error: {}", e))?;
    }
    Ok(stage)
}

pub fn parse_stage_size(spec: &str) -> Result<(f64, f64)> {
    let (w, h) = spec
        .split_once('x')
        .ok_or_else(|| anyhow!("Invalid stage size '{}' (expected WxH, e.g. 480x360).", spec))?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| anyhow!("Invalid stage width '{}'.", w))?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| anyhow!("Invalid stage height '{}'.", h))?;
    if width == 0 || height == 0 {
        bail!("Stage dimensions must be positive.");
    }
    Ok((width as f64, height as f64))
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
        let total = self.total;
        let step = step.clamp(1, total);
        let bar = render_progress_bar(step, total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
