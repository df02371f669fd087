//! FlyerKit command line: render documents, create projects from templates
//! and inspect saved files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use flyerkit_core::config::{ConfigError, EditorConfig};
use flyerkit_core::document::{Document, DocumentError};
use flyerkit_core::templates::Template;
use flyerkit_core::Editor;
use flyerkit_render::{
    render_to_pixmap, ExportError, ExportFormat, FontBook, FontError, RenderError, RenderOptions,
};

/// How long `render` waits for image sources to decode.
const DECODE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("cannot load document: {0}")]
    Document(#[from] DocumentError),
    #[error("cannot load config: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot load font: {0}")]
    Font(#[from] FontError),
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported output format for {0}; use .png or .pdf")]
    UnsupportedFormat(String),
    #[error("no object at index {index}; the document has {count}")]
    NoSuchObject { index: usize, count: usize },
    #[error("scale must be positive, got {0}")]
    InvalidScale(f64),
}

#[derive(Parser, Debug)]
#[command(name = "flyerkit", about = "Render and inspect FlyerKit flyer documents", version)]
struct Cli {
    /// Editor configuration file (JSON).
    #[arg(long, global = true, env = "FLYERKIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a document or project to PNG or PDF.
    Render {
        input: PathBuf,
        /// Output file; the extension picks the format.
        #[arg(short, long)]
        output: PathBuf,
        /// Output pixels per canvas unit.
        #[arg(long, default_value_t = 1.0)]
        scale: f64,
        /// Font file to use instead of the system fonts (repeatable).
        #[arg(long = "font", value_name = "FILE")]
        fonts: Vec<PathBuf>,
        /// Select the object at this paint-order index and draw its selection overlay.
        #[arg(long, value_name = "INDEX")]
        selection: Option<usize>,
    },
    /// Write a new project file from a preset layout.
    Template {
        /// One of: blank, event, sale, business.
        template: Template,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a summary of a document or project.
    Info { input: PathBuf },
}

fn main() -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Render {
            input,
            output,
            scale,
            fonts,
            selection,
        } => run_render(config, &input, &output, scale, &fonts, selection),
        Command::Template { template, output } => run_template(config, template, &output),
        Command::Info { input } => {
            println!("{}", run_info(&input)?);
            Ok(())
        }
    }
}

fn load_fonts(files: &[PathBuf]) -> Result<FontBook, CliError> {
    // Explicit font files replace system discovery
    let fonts = if files.is_empty() {
        FontBook::new()
    } else {
        FontBook::without_system_fonts()
    };
    for file in files {
        fonts.load_file(file)?;
    }
    if fonts.is_empty() {
        log::warn!("No fonts available; text objects will not be drawn");
    }
    Ok(fonts)
}

fn run_render(
    mut config: EditorConfig,
    input: &Path,
    output: &Path,
    scale: f64,
    font_files: &[PathBuf],
    selection: Option<usize>,
) -> Result<(), CliError> {
    if !(scale > 0.0 && scale.is_finite()) {
        return Err(CliError::InvalidScale(scale));
    }
    let format = ExportFormat::from_extension(output)
        .ok_or_else(|| CliError::UnsupportedFormat(output.display().to_string()))?;

    // Relative image paths resolve next to the document
    if config.image_base_dir.is_none() {
        config.image_base_dir = input.parent().map(Path::to_path_buf);
    }
    let fonts = load_fonts(font_files)?;
    let canvas = config.canvas_size();
    let options = RenderOptions::from_config(&config)
        .with_scale(scale)
        .with_selection(selection.is_some());

    let mut editor = Editor::new(config).with_measure(fonts.clone());
    editor.load_file(input)?;
    if let Some(index) = selection {
        let count = editor.scene().len();
        let id = editor
            .scene()
            .objects()
            .get(index)
            .map(flyerkit_core::ObjectTrait::id)
            .ok_or(CliError::NoSuchObject { index, count })?;
        editor.select(Some(id));
    }
    if !editor.wait_for_decodes(DECODE_TIMEOUT) {
        log::warn!("Rendering with {} images still loading", editor.pending_decodes());
    }

    let surface = render_to_pixmap(editor.scene(), canvas, &options, &fonts)?;
    let bytes = format.encode(surface.pixmap())?;
    std::fs::write(output, &bytes)?;
    log::info!(
        "Wrote {}x{} {:?} to {}",
        surface.width(),
        surface.height(),
        format,
        output.display()
    );
    Ok(())
}

fn run_template(config: EditorConfig, template: Template, output: &Path) -> Result<(), CliError> {
    let mut editor = Editor::new(config);
    editor.apply_template(template);
    editor.to_project().save(output)?;
    log::info!("Wrote {} project to {}", template, output.display());
    Ok(())
}

fn run_info(input: &Path) -> Result<String, CliError> {
    let document = Document::load(input)?;
    let kinds = document
        .kind_counts()
        .iter()
        .map(|(kind, count)| format!("{kind}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    Ok(format!(
        "{}\nobjects: {}{}\nbackground: {}",
        input.display(),
        document.objects.len(),
        if kinds.is_empty() {
            String::new()
        } else {
            format!(" ({kinds})")
        },
        document.background.kind_name()
    ))
}
