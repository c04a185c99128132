use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use webresource::{resolve, Bundle, BundleConfig, BundleError};

#[derive(Parser)]
#[command(name = "webresource")]
#[command(about = "Resolve asset modules and bundle their files")]
#[command(version)]
struct Cli {
    /// Bundle configuration file (TOML)
    #[arg()]
    config: PathBuf,

    /// Extension of the files to bundle, overriding the config (e.g. ".css")
    #[arg(long = "ext")]
    ext: Option<String>,

    /// Write the bundle to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Gzip the bundle
    #[arg(long = "gzip")]
    gzip: bool,

    /// Print the resolved module list instead of the bundle
    #[arg(long = "list")]
    list: bool,

    /// Print a JSON summary instead of the bundle
    #[arg(long = "json")]
    json: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    log_level: String,
}

fn main() {
    let cli = Cli::parse();

    let log_level: tracing::Level = cli.log_level.parse().unwrap_or(tracing::Level::WARN);
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BundleError> {
    let config = BundleConfig::from_file(&cli.config)?;
    let modules = resolve(config.build_modules()?);

    if cli.list {
        println!("{}", modules);
        return Ok(());
    }

    let ext = cli.ext.as_deref().unwrap_or(&config.ext);
    let bundle = Bundle::collect(&modules, ext, &config.separator)?;

    if cli.json {
        let summary = serde_json::to_string_pretty(&bundle.summary(&modules))
            .map_err(std::io::Error::other)?;
        println!("{}", summary);
        return Ok(());
    }

    let bytes = if cli.gzip {
        bundle.gzip()?
    } else {
        bundle.into_content()
    };

    match cli.output {
        Some(path) => std::fs::write(&path, bytes)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
