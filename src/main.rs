use anyhow::Result;
use clap::Parser;
use pagegen::build::build_pages;
use pagegen::config::Config;
use pagegen::sink::ManifestSink;
use pagegen::source::{JsonSource, MarkdownSource};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Creates the post, tag and article listing pages of a blog and writes
/// them out as a JSON page manifest.
#[derive(Parser)]
#[command(name = "pagegen", version, about)]
struct Cli {
    /// Directory to start searching for `pagegen.yaml` from.
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Read a saved query response instead of the posts directory.
    #[arg(long, value_name = "FILE")]
    from_json: Option<PathBuf>,

    /// Where to write the page manifest. Defaults to stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log what is being created.
    #[arg(short, long)]
    verbose: bool,

    /// Log filter, e.g. `info` or `pagegen=trace`.
    #[arg(long, env = "PAGEGEN_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    pagegen::logging::init(cli.verbose, cli.log_level.as_deref())?;

    let config = Config::from_directory(&cli.project)?;

    let mut sink = ManifestSink::new(config.templates.clone());
    let (query, settings) = (&config.query, &config.settings);
    let report = match &cli.from_json {
        Some(path) => {
            let source = JsonSource::new(path);
            build_pages(&source, query, settings, &mut sink).await?
        }
        None => {
            let source = MarkdownSource::new(&config.posts_directory);
            build_pages(&source, query, settings, &mut sink).await?
        }
    };

    match &cli.output {
        Some(path) => {
            let mut w = BufWriter::new(File::create(path)?);
            sink.finish(&mut w)?;
            w.flush()?;
            tracing::info!(
                pages = report.total(),
                output = %path.display(),
                "wrote page manifest"
            );
        }
        None => sink.finish(io::stdout().lock())?,
    }
    Ok(())
}
