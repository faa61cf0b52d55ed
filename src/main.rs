use clap::{Parser, Subcommand};
use session_gal::ingest::LocalFile;
use session_gal::{Session, config, fetch, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, subscriber::set_global_default, warn};
use tracing_subscriber::EnvFilter;
use url::Url;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "session-gal")]
#[command(about = "Build an image gallery page from a manifest and local files")]
#[command(long_about = "\
Build an image gallery page from a manifest and local files

Images listed in <base>/images/list.json are fetched one at a time and
embedded into a single self-contained HTML page, together with any files
passed with --add. The newest image is shown first.

Manifest format (a JSON array; entries without url or path are skipped):

  [
    { \"url\": \"photos/harbor.jpg\", \"name\": \"Harbor at dusk\", \"size\": 482133 },
    { \"path\": \"photos/dunes%20at%20noon.png\" }
  ]

Name falls back to the last path segment, size to the downloaded length.

Run 'session-gal gen-config' to generate a documented gallery.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Base location: an http(s)/file URL or a local directory
    #[arg(long, default_value = ".", global = true)]
    base: String,

    /// Local image files to add after the manifest
    #[arg(
        long = "add",
        value_name = "FILE",
        num_args = 1,
        action = clap::ArgAction::Append,
        global = true
    )]
    add: Vec<PathBuf>,

    /// Skip the manifest and use only --add files
    #[arg(long, global = true)]
    no_manifest: bool,

    /// Directory holding gallery.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease verbosity (-q)
    #[arg(short = 'q', action = clap::ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the gallery page
    Build {
        /// Output HTML file
        #[arg(long, default_value = "gallery.html")]
        output: PathBuf,
    },
    /// Print the gallery contents, newest first
    List,
    /// Save every image under its suggested filename
    Download {
        /// Target directory (created if missing)
        #[arg(long)]
        dir: PathBuf,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Build { output: path } => {
            let session = open_session(&cli).await?;
            let html = session.render_page().into_string();
            std::fs::write(path, html)?;
            println!(
                "==> Gallery written: {} ({} images)",
                path.display(),
                session.len()
            );
        }
        Command::List => {
            let session = open_session(&cli).await?;
            output::print_gallery(&session.items());
        }
        Command::Download { dir } => {
            let session = open_session(&cli).await?;
            std::fs::create_dir_all(dir)?;
            let written = write_downloads(&session, dir);
            output::print_downloads(&written, dir);
        }
    }

    Ok(())
}

/// Load config, then fill a session from the manifest and `--add` files.
async fn open_session(cli: &Cli) -> Result<Session, Box<dyn std::error::Error>> {
    let gallery_config = config::load_config(&cli.config)?;
    let base = resolve_base(&cli.base)?;
    let client = fetch::Client::new(&gallery_config.http)?;
    let session = Session::new(Arc::new(client), base, gallery_config);

    if !cli.no_manifest {
        // Failures are already logged; an unusable manifest means no images from it.
        if let Ok(report) = session.load_manifest().await {
            output::print_load_report(&report);
        }
    }
    if !cli.add.is_empty() {
        let files = read_local_files(&cli.add).await;
        session.add_files(files).await;
    }
    Ok(session)
}

/// Write every item into `dir`. Items that cannot be decoded or written are
/// logged and skipped.
fn write_downloads(session: &Session, dir: &Path) -> Vec<(String, u64)> {
    let mut written = Vec::new();
    for item in session.items() {
        let download = match session.download(&item.id) {
            Some(Ok(download)) => download,
            Some(Err(err)) => {
                warn!(id = %item.id, error = %err, "download not decodable");
                continue;
            }
            None => continue,
        };
        let path = dir.join(&download.filename);
        match std::fs::write(&path, &download.bytes) {
            Ok(()) => written.push((download.filename, download.bytes.len() as u64)),
            Err(err) => warn!(path = %path.display(), error = %err, "download not written"),
        }
    }
    written
}

/// Map `-v`/`-q` counts to a level; the default is WARN.
fn init_tracing(verbose: u8, quiet: u8) {
    let level = match 1 + i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    let _ = set_global_default(subscriber);
}

/// Accept a URL or a local directory as the base location.
fn resolve_base(raw: &str) -> Result<Url, Box<dyn std::error::Error>> {
    if let Ok(url) = Url::parse(raw) {
        if matches!(url.scheme(), "http" | "https" | "file") {
            return Ok(url);
        }
    }
    let dir = std::fs::canonicalize(raw)?;
    Url::from_directory_path(&dir)
        .map_err(|()| format!("cannot use {} as a base location", dir.display()).into())
}

/// Read `--add` files. Unreadable files are logged and left out.
async fn read_local_files(paths: &[PathBuf]) -> Vec<LocalFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::read(path).await {
            Ok(bytes) => files.push(LocalFile {
                name: file_name(path),
                content_type: fetch::guess_content_type(path),
                bytes,
            }),
            Err(err) => warn!(path = %path.display(), error = %err, "file not readable"),
        }
    }
    files
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
