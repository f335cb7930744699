use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thumbdrop::app::{Capabilities, Uploader, UploaderOptions};
use thumbdrop::config::{self, AppConfig};
use thumbdrop::diagnostics::{Diagnostics, PipelineEvent};
use thumbdrop::gallery::Gallery;
use thumbdrop::imaging::RustBackend;
use thumbdrop::output;
use thumbdrop::presentation::LabeledSurface;
use thumbdrop::source::{FileCandidate, collect_files};
use thumbdrop::store::ThumbnailStore;

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(name = "thumbdrop")]
#[command(about = "Render and keep fixed-size thumbnails of PNG and JPEG files")]
#[command(long_about = "\
Render and keep fixed-size thumbnails of PNG and JPEG files

Every accepted file is scaled down to fit a fixed canvas, encoded, and stored
in a local SQLite store that survives restarts. Other file types are reported
and skipped; one bad file never stops the rest.

Store layout:

  <store dir>/<name>.sqlite3      # images(key, value)
    key:   thumbdrop_<epoch millis><1-100>:<media type>
    value: data:<media type>;base64,<thumbnail bytes>

Run 'thumbdrop gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Store directory (overrides [store] dir)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,

    /// Write an HTML gallery of every presented thumbnail to this file
    #[arg(long, global = true)]
    gallery: Option<PathBuf>,

    /// Only print failures and summaries
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render and store thumbnails for files and directories
    Ingest {
        /// Files or directories (walked recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Replay the store and write the gallery
    Show,
    /// List stored thumbnails
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Delete every stored thumbnail
    Reset,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = config::load_config(&cli.config_dir)?;
    if let Some(dir) = &cli.store_dir {
        config.store.dir = dir.to_string_lossy().into_owned();
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(cli, config))
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), BoxError> {
    if let Command::List { json } = cli.command {
        return list(&config, json).await;
    }

    let (diagnostics, mut rx) = Diagnostics::channel();
    let quiet = cli.quiet;
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match &event {
                PipelineEvent::Failed { .. } => {
                    for line in output::format_event(&event) {
                        eprintln!("{}", line);
                    }
                }
                _ if !quiet => output::print_event(&event),
                _ => {}
            }
        }
    });

    // The uploader owns every diagnostics sender; dropping it ends the printer.
    let result = execute(&cli, &config, diagnostics).await;
    printer.await?;
    result
}

async fn execute(cli: &Cli, config: &AppConfig, diagnostics: Diagnostics) -> Result<(), BoxError> {
    let gallery = Arc::new(Gallery::new());
    let options = UploaderOptions {
        drop_zone: Some(Arc::new(LabeledSurface::new("command line"))),
        picker: Some(Arc::new(LabeledSurface::new("picker"))),
        preview: Some(gallery.clone()),
        reset: Some(gallery.clone()),
    };
    let capabilities = Capabilities::detect(config);
    let uploader =
        Uploader::start(config, capabilities, options, RustBackend::new(), diagnostics).await?;

    match &cli.command {
        Command::Ingest { paths } => {
            let files = read_candidates(&collect_files(paths)).await;
            let report = uploader.on_drop(files).await;
            output::print_ingest_report(&report);
            write_gallery(&gallery, cli.gallery.as_deref())?;
        }
        Command::Show => {
            output::print_load_report(uploader.loaded());
            let path = cli
                .gallery
                .clone()
                .unwrap_or_else(|| PathBuf::from("thumbnails.html"));
            write_gallery(&gallery, Some(&path))?;
        }
        Command::Reset => {
            uploader.reset().await?;
            println!("Removed all stored thumbnails");
        }
        Command::List { .. } | Command::GenConfig => {}
    }

    Ok(())
}

/// Read files, skipping (and reporting) any that cannot be read.
async fn read_candidates(paths: &[PathBuf]) -> Vec<FileCandidate> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match FileCandidate::read(path).await {
            Ok(candidate) => files.push(candidate),
            Err(e) => eprintln!("FAILED {}: {}", path.display(), e),
        }
    }
    files
}

fn write_gallery(gallery: &Gallery, path: Option<&Path>) -> Result<(), BoxError> {
    if let Some(path) = path {
        gallery.write(path, "Thumbnails")?;
        println!("Gallery: {}", path.display());
    }
    Ok(())
}

async fn list(config: &AppConfig, json: bool) -> Result<(), BoxError> {
    let store = ThumbnailStore::new(&config.store_dir(), &config.store.name, config.store.version);
    store.open().await?;
    let records = store.enumerate_all().await?;
    store.close().await;

    if json {
        println!("{}", output::format_records_json(&records)?);
    } else {
        output::print_records(&records);
    }
    Ok(())
}
