use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use tileset_minimiser::{
    logging, minimise_image_file, minimise_map_file, minimise_tileset_file, ImageCodec,
    MinimiseConfig, MinimiseError, Outcome, OutputFormat,
};

/// Removes duplicate and flipped-duplicate tiles from Tiled tilesets
#[derive(Parser)]
#[command(name = "tileset_minimiser", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Command {
    /// Minimise a bare tileset image
    Image { path: PathBuf },
    /// Minimise a .tsj/.json tileset and its image
    Tileset { path: PathBuf },
    /// Minimise every tileset of a .tmj/.json map and rewrite its layers
    Map { path: PathBuf },
}

#[derive(Args)]
struct Options {
    /// Tile side length in pixels
    #[arg(long, global = true, default_value_t = 8)]
    cell_size: u32,

    /// Format of repacked tileset images
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Bmp)]
    format: OutputFormat,

    /// Optimise PNG output with oxipng
    #[arg(long, global = true)]
    optimise: bool,

    /// Drop tiles no layer references (map only)
    #[arg(long, global = true)]
    prune_unused: bool,

    /// Report the reduction without writing files
    #[arg(long, global = true)]
    dry_run: bool,

    /// Write a JSON summary of the run to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

impl Options {
    fn config(&self) -> MinimiseConfig {
        MinimiseConfig {
            cell_size: self.cell_size,
            output_format: self.format,
            optimise_png: self.optimise,
            prune_unused: self.prune_unused,
            dry_run: self.dry_run,
        }
    }
}

fn run(cli: &Cli) -> Result<Outcome, MinimiseError> {
    let config = cli.options.config();
    let codec = ImageCodec::new(config.optimise_png);

    let outcome = match &cli.command {
        Command::Image { path } => minimise_image_file(path, &config, &codec)?,
        Command::Tileset { path } => minimise_tileset_file(path, &config, &codec)?,
        Command::Map { path } => minimise_map_file(path, &config, &codec)?,
    };

    if let (Outcome::Minimised(report), Some(report_path)) = (&outcome, &cli.options.report) {
        let json = serde_json::to_string_pretty(report).map_err(|source| MinimiseError::Parse {
            path: report_path.clone(),
            source,
        })?;
        fs::write(report_path, json).map_err(|source| MinimiseError::Io {
            path: report_path.clone(),
            source,
        })?;
    }

    Ok(outcome)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_subscriber(logging::level_for(cli.options.verbose, cli.options.quiet));

    match run(&cli) {
        Ok(Outcome::AlreadyMinimal) => ExitCode::SUCCESS,
        Ok(Outcome::Minimised(report)) => {
            for path in &report.written {
                info!("Wrote {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
