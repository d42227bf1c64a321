//! Command line front end: reads a registry, writes bindings.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vk_bindgen::emit::Generator;
use vk_bindgen::Config;

#[derive(Parser)]
#[command(name = "vk-bindgen", version, about = "Generate bindings from the Vulkan registry")]
struct Args {
    /// Path to vk.xml
    #[arg(long, default_value = "vk.xml")]
    registry: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target API, overrides the configuration
    #[arg(long)]
    api: Option<String>,

    /// Allowed platform, may be repeated; overrides the configuration
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Also write the resolved registry as RON to this path
    #[cfg(feature = "serialize")]
    #[arg(long)]
    dump_ron: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut config = match args.config.as_ref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(api) = args.api {
        config.api = api;
    }
    if !args.platforms.is_empty() {
        config.platforms = args.platforms;
    }

    let registry = vk_bindgen::parse_file(&args.registry, &config.api)?;

    #[cfg(feature = "serialize")]
    {
        if let Some(path) = args.dump_ron.as_ref() {
            let text = ron::ser::to_string_pretty(&registry, ron::ser::PrettyConfig::new())?;
            std::fs::write(path, text)?;
            tracing::info!("wrote {}", path.display());
        }
    }

    let written = Generator::new(&registry, &config)?.write_all(&args.out)?;
    tracing::info!("generated {} files in {}", written.len(), args.out.display());
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "vk_bindgen=debug"
    } else {
        "vk_bindgen=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        let mut source = e.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
