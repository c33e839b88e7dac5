use clap::{Parser, Subcommand};
use lazyframe::directive::{ImageDirective, Loading};
use lazyframe::types::Manifest;
use lazyframe::{config, generate, imaging, output, scan, simulate};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("LAZYFRAME_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("LAZYFRAME_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "lazyframe")]
#[command(about = "Static gallery builder with deferred, format-negotiated images")]
#[command(long_about = "\
Static gallery builder with deferred, format-negotiated images

Every image in the assets directory becomes a placeholder frame that swaps
in the real picture once it scrolls near the viewport. Modern formats that
sit next to a jpg/png are offered first through <picture>.

Assets structure:

  assets/
  ├── config.toml                  # Site config (optional)
  ├── 001-hero.jpg                 # Primary (numbered = page order)
  ├── 001-hero.avif                # Alternate formats, offered first
  ├── 001-hero.webp
  ├── 001-hero.toml                # Overrides: loading, priority, sizes, ...
  ├── 010-kitchen/
  │   ├── 001-cabinets.png
  │   └── 001-cabinets.txt         # Alt text
  └── logo.svg                     # Unnumbered = after numbered images

Alt text resolution (first available wins):
  sidecar .toml alt → sidecar .txt → filename (001-Front-Porch.jpg → \"Front Porch\")

Run 'lazyframe gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Assets directory
    #[arg(long, default_value = "assets", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".lazyframe-temp", global = true)]
    temp_dir: PathBuf,

    /// Show debug diagnostics
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the assets directory into a manifest
    Scan,
    /// Produce the page from a scanned manifest
    Generate,
    /// Run the full pipeline: scan → generate
    Build,
    /// Validate assets without building, including alternate aspect ratios
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
    /// Replay visibility and load events against a single image
    Simulate(SimulateArgs),
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Primary image URL
    #[arg(long)]
    src: String,

    #[arg(long, default_value = "")]
    alt: String,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// eager or lazy
    #[arg(long, default_value = "lazy")]
    loading: Loading,

    #[arg(long)]
    priority: bool,

    #[arg(long)]
    sizes: Option<String>,

    /// Alternate format, e.g. --format avif=/a.avif (repeatable)
    #[arg(long = "format", value_parser = parse_format)]
    formats: Vec<(String, String)>,

    /// Model a host without visibility detection
    #[arg(long)]
    no_observer: bool,

    /// Comma-separated events: intersect, leave, load, error, unmount
    #[arg(long, default_value = "")]
    events: String,
}

fn parse_format(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, url)) if !name.trim().is_empty() && !url.trim().is_empty() => {
            Ok((name.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(format!("expected name=url, got '{s}'")),
    }
}

/// Install the tracing subscriber. `LAZYFRAME_LOG` wins over the flags.
fn init_tracing(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("LAZYFRAME_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Command::Scan => {
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);
        }
        Command::Generate => {
            let manifest_path = cli.temp_dir.join("manifest.json");
            let site = generate::generate(&manifest_path, &cli.source, &cli.output)?;
            output::print_generate_output(&site, &cli.output);
        }
        Command::Build => {
            println!("==> Stage 1: Scanning {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            write_manifest(&manifest, &cli.temp_dir)?;
            output::print_scan_output(&manifest, &cli.source);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            let site = generate::generate_site(&manifest, &cli.source, &cli.output)?;
            output::print_generate_output(&site, &cli.output);

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            output::print_scan_output(&manifest, &cli.source);
            let report = scan::check_alternates(&cli.source, &manifest, &imaging::RustProbe::new());
            let alternates = manifest.images.iter().map(|i| i.alternates.len()).sum();
            println!();
            output::print_check_output(&report, alternates);
            println!("==> Assets are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
        Command::Simulate(args) => {
            let site_config = config::load_config(&cli.source)?;
            let events = simulate::parse_events(&args.events)?;
            let directive = args.to_directive(&site_config);
            let report = simulate::run(directive, &site_config, !args.no_observer, &events);
            output::print_simulation(&report);
        }
    }

    Ok(())
}

impl SimulateArgs {
    /// Build the directive from flags; `sizes` falls back to the site default.
    fn to_directive(&self, site_config: &config::SiteConfig) -> ImageDirective {
        let sizes = self
            .sizes
            .clone()
            .unwrap_or_else(|| site_config.images.sizes.clone());
        let mut directive = ImageDirective::new(&self.src)
            .with_alt(&self.alt)
            .with_loading(self.loading)
            .with_priority(self.priority)
            .with_sizes(sizes);
        directive.width = self.width;
        directive.height = self.height;
        for (name, url) in &self.formats {
            directive = directive.with_format(name, url);
        }
        directive
    }
}

fn write_manifest(manifest: &Manifest, temp_dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(temp_dir)?;
    let json = serde_json::to_string_pretty(manifest)?;
    std::fs::write(temp_dir.join("manifest.json"), json)?;
    Ok(())
}
