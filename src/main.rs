use anyhow::{Context, Result};
use clap::Parser;
use drawstack::config::BackendChoice;
use drawstack::draw::{Backend, CairoBackend, DocumentBackend, StateAttributes};
use drawstack::fonts::{Font, FontFamily, FontStyle, PangoFamilySource, family_cache};
use drawstack::util::Size;
use drawstack::{Config, DrawingSurface, scene};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "drawstack")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("DRAWSTACK_GIT_HASH"), ")"),
    about = "Paint save/restore scenes to Cairo surfaces or PDF page content"
)]
struct Cli {
    /// Paint the sample scene and write it to PATH
    #[arg(long, short = 'r', value_name = "PATH")]
    render: Option<PathBuf>,

    /// Output backend (overrides the config file)
    #[arg(long, short = 'b', value_enum)]
    backend: Option<BackendChoice>,

    /// Surface width (overrides the config file)
    #[arg(long)]
    width: Option<u32>,

    /// Surface height (overrides the config file)
    #[arg(long)]
    height: Option<u32>,

    /// Font family for the scene's label (overrides the config file)
    #[arg(long, short = 'f', value_name = "FAMILY")]
    font: Option<String>,

    /// Resolve font families through Pango and print the family cache.
    /// Without names, list every family the platform provides instead.
    #[arg(long, value_name = "NAME", num_args = 0..)]
    list_fonts: Option<Vec<String>>,

    /// Read configuration from PATH instead of the default location
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    apply_overrides(&mut config, &cli);

    let source = PangoFamilySource::new();
    if !config.fonts.preload.is_empty() {
        let loaded = FontFamily::preload(&config.fonts.preload, &source);
        log::info!(
            "Preloaded {} of {} font families",
            loaded.len(),
            config.fonts.preload.len()
        );
    }

    match cli.list_fonts.as_deref() {
        Some([]) => {
            println!("Available font families:");
            for name in source.available_families() {
                println!("  {name}");
            }
        }
        Some(names) => {
            for name in names {
                if let Err(err) = FontFamily::resolve(name, &source) {
                    eprintln!("warning: {name}: {err}");
                }
            }
            print!("{}", family_cache().dump_state());
        }
        None => {}
    }

    if let Some(path) = &cli.render {
        render(&config, &source, path)?;
        println!("Wrote {}", path.display());
    } else if cli.list_fonts.is_none() {
        println!("drawstack: save/restore drawing surfaces over Cairo and PDF page content");
        println!();
        println!("Usage:");
        println!("  drawstack --render out.png                 Paint the sample scene as PNG");
        println!("  drawstack --render out.pdf -b document     Write PDF page content directly");
        println!("  drawstack --list-fonts Sans Monospace      Resolve families and dump the cache");
        println!("  drawstack --list-fonts                     List the platform's font families");
        println!("  drawstack --help                           Show all options");
    }

    Ok(())
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(backend) = cli.backend {
        config.surface.backend = backend;
    }
    if let Some(width) = cli.width {
        config.surface.width = width;
    }
    if let Some(height) = cli.height {
        config.surface.height = height;
    }
    if let Some(font) = &cli.font {
        config.fonts.default_family = font.clone();
    }
    config.validate_and_clamp();
}

fn render(config: &Config, source: &PangoFamilySource, path: &Path) -> Result<()> {
    let width = config.surface.width;
    let height = config.surface.height;
    let size = Size::new(f64::from(width), f64::from(height));

    let font = match FontFamily::resolve(&config.fonts.default_family, source) {
        Ok(family) => Some(Font::new(family, config.fonts.default_size, FontStyle::REGULAR)),
        Err(err) => {
            log::warn!("Drawing without text: {}", err);
            None
        }
    };

    match config.surface.backend {
        BackendChoice::Image => {
            let backend = CairoBackend::image(width as i32, height as i32)?;
            let backend = paint(backend, config, font)?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            backend.write_png(&mut writer)?;
            writer.flush()?;
        }
        BackendChoice::Svg => {
            paint(CairoBackend::svg(path, size.width, size.height)?, config, font)?;
        }
        BackendChoice::Pdf => {
            paint(CairoBackend::pdf(path, size.width, size.height)?, config, font)?;
        }
        BackendChoice::Document => {
            let backend = DocumentBackend::with_options(
                size,
                config.document.precision,
                config.document.compress,
            );
            let page = paint(backend, config, font)?.into_page()?;
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            page.write_document(&mut writer)
                .and_then(|()| writer.flush())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    log::info!(
        "Rendered {}x{} {:?} output to {}",
        width,
        height,
        config.surface.backend,
        path.display()
    );
    Ok(())
}

fn paint<B: Backend>(backend: B, config: &Config, font: Option<Font>) -> Result<B> {
    let attrs = StateAttributes {
        antialias: config.surface.antialias.into(),
        ..StateAttributes::default()
    };
    let mut surface = DrawingSurface::with_attributes(backend, attrs);
    let report = scene::paint_sample(&mut surface, config.surface.background.to_color(), font)?;
    log::debug!("Scene report: {:?}", report);
    Ok(surface.into_backend())
}
