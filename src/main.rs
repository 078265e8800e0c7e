use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use clap::Parser;
use log::{info, LevelFilter};
use thiserror::Error;
use placegrid::{generate_layout, DirectionPolicy, LayoutConfig, LayoutFailure, LayoutSuccess};

/// Lay out a list of words as a crossword-style grid.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Words to lay out
    words: Vec<String>,

    /// File with one word per line (blank lines are skipped)
    #[arg(short = 'f', long)]
    word_file: Option<PathBuf>,

    /// JSON file with layout settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the first attempt; attempt n uses seed + n
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of attempts before giving up
    #[arg(short = 'n', long, default_value_t = 1)]
    attempts: u32,

    /// Reject layouts wider than this and try again
    #[arg(long)]
    max_width: Option<usize>,

    /// Reject layouts taller than this and try again
    #[arg(long)]
    max_height: Option<usize>,

    /// Try both directions at every crossing instead of inferring one
    #[arg(long)]
    try_both_directions: bool,

    /// Print the layout as JSON instead of a text grid
    #[arg(long)]
    json: bool,

    /// Also write the rendered grid to this file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log the search at debug level (RUST_LOG overrides this)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Couldn't read {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Couldn't write {}: {source}", .path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("Invalid settings in {}: {source}", .path.display())]
    Config { path: PathBuf, source: serde_json::Error },
    #[error(transparent)]
    Layout(#[from] LayoutFailure),
    #[error("No layout found in {attempts} attempt(s).")]
    NoLayout { attempts: u32 },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn init_logger(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.init();
}

fn read_to_string(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read { path: path.to_owned(), source })
}

fn load_words(cli: &Cli) -> Result<Vec<String>, CliError> {
    let mut words = cli.words.clone();

    if let Some(path) = &cli.word_file {
        words.extend(
            read_to_string(path)?
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }

    Ok(words)
}

fn load_config(cli: &Cli) -> Result<LayoutConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => serde_json::from_str(&read_to_string(path)?)
            .map_err(|source| CliError::Config { path: path.clone(), source })?,
        None => LayoutConfig::default(),
    };

    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if cli.try_both_directions {
        config.direction_policy = DirectionPolicy::TryBoth;
    }

    Ok(config)
}

/// Call the generator until it produces a layout that fits, moving to a fresh seed each time.
fn find_layout(cli: &Cli, words: &[String], config: &LayoutConfig) -> Result<LayoutSuccess, CliError> {
    let attempts = cli.attempts.max(1);

    for attempt in 0..attempts {
        let attempt_config = LayoutConfig {
            seed: config.seed.map(|seed| seed.wrapping_add(attempt as u64)),
            ..config.clone()
        };

        match generate_layout(words, &attempt_config) {
            Ok(success) => {
                let layout = &success.layout;
                let too_wide = cli.max_width.map_or(false, |max| layout.width > max);
                let too_tall = cli.max_height.map_or(false, |max| layout.height > max);

                if !too_wide && !too_tall {
                    return Ok(success);
                }

                info!("Attempt {}: {}x{} grid is too big", attempt + 1, layout.width, layout.height);
            }
            // Retrying can't help with these.
            Err(failure @ (LayoutFailure::NoWords | LayoutFailure::EmptyWord { .. })) => {
                return Err(failure.into());
            }
            Err(failure) => info!("Attempt {}: {}", attempt + 1, failure),
        }
    }

    Err(CliError::NoLayout { attempts })
}

fn try_main(cli: &Cli) -> Result<(), CliError> {
    let words = load_words(cli)?;
    let config = load_config(cli)?;

    info!("Laying out {} words", words.len());

    let result = find_layout(cli, &words, &config)?;
    let display_grid = result.layout.to_string();

    info!("{:?}", result.statistics);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result.layout)?);
    } else {
        println!("{}", display_grid);
    }

    if let Some(path) = &cli.output {
        fs::write(path, &display_grid)
            .map_err(|source| CliError::Write { path: path.clone(), source })?;
        info!("Wrote grid to {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
