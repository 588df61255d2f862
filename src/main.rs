use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{error, info, LevelFilter};

use dwin_ico::config::ToolConfig;
use dwin_ico::ico_creator::IcoCreator;
use dwin_ico::ico_extractor::IcoExtractor;

/// Extract and create icon libraries for DWIN LCD panels.
///
/// Passing a single `.ICO` file extracts it into `out/`; passing a directory packs its
/// `<index>_*.jpg` files into `<dir>.ICO`.
#[derive(Parser, Debug)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// An .ICO file to extract or a directory to pack
    path: Option<PathBuf>,

    /// JSON settings file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write every icon in a container to its own file
    Extract {
        ico: PathBuf,
        #[arg(short, long, default_value = "out")]
        output: PathBuf,
        /// Name files `<index>.<ext>` instead of after the stock icon
        #[arg(long)]
        no_names: bool,
        /// Extension for extracted files
        #[arg(long)]
        extension: Option<String>,
        /// Skip writing manifest.json
        #[arg(long)]
        no_manifest: bool,
    },
    /// Pack `<index>_*` files from a directory into a container
    Create {
        dir: PathBuf,
        /// Output file (defaults to `<dir>.ICO`)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Reject images whose dimensions cannot be read
        #[arg(long)]
        strict: bool,
    },
    /// Show the directory of a container
    List {
        ico: PathBuf,
        #[arg(long)]
        json: bool,
        /// Hash payloads and report duplicates
        #[arg(long)]
        hashes: bool,
    },
    /// Check that every payload lies inside the file and decodes to its recorded size
    Verify { ico: PathBuf },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ToolConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ToolConfig::default(),
    };
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(config.log_level)
        .parse_default_env()
        .init();

    match cli.command {
        Some(Command::Extract {
            ico,
            output,
            no_names,
            extension,
            no_manifest,
        }) => {
            if no_names {
                config.use_icon_names = false;
            }
            if let Some(extension) = extension {
                config.extension = extension;
            }
            if no_manifest {
                config.write_manifest = false;
            }
            extract(&ico, &output, &config)
        }
        Some(Command::Create {
            dir,
            output,
            strict,
        }) => {
            if strict {
                config.strict_dimensions = true;
            }
            create(&dir, output.as_deref(), &config)
        }
        Some(Command::List { ico, json, hashes }) => list(&ico, json, hashes),
        Some(Command::Verify { ico }) => verify(&ico),
        None => match cli.path {
            Some(path) => open(&path, &config),
            None => bail!("No path given. Pass an .ICO file to extract or a directory to pack."),
        },
    }
}

/// Drag-and-drop behaviour: files are extracted, directories are packed.
fn open(path: &Path, config: &ToolConfig) -> Result<ExitCode> {
    if path.is_file() {
        let is_ico = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("ico"))
            .unwrap_or(false);
        if !is_ico {
            bail!("File extension must be .ICO: {}", path.display());
        }
        extract(path, Path::new("out"), config)
    } else if path.is_dir() {
        create(path, None, config)
    } else {
        bail!("The directory or file specified does not exist: {}", path.display())
    }
}

fn extract(ico: &Path, output: &Path, config: &ToolConfig) -> Result<ExitCode> {
    let mut extractor = IcoExtractor::new(ico)
        .with_context(|| format!("Failed to open {}", ico.display()))?;
    extractor
        .extract_to_dir(output, config)
        .with_context(|| format!("Failed to extract {}", ico.display()))?;

    info!(
        "All files are inside {}. Pass that directory back in to create a new ICO file.",
        output.display()
    );
    Ok(ExitCode::SUCCESS)
}

fn create(dir: &Path, output: Option<&Path>, config: &ToolConfig) -> Result<ExitCode> {
    let mut creator = IcoCreator::from_dir(dir, config)
        .with_context(|| format!("Failed to collect icons from {}", dir.display()))?;
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => creator.default_output_path(),
    };

    creator
        .write(&output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(ExitCode::SUCCESS)
}

fn list(ico: &Path, json: bool, hashes: bool) -> Result<ExitCode> {
    let mut extractor = IcoExtractor::new(ico)
        .with_context(|| format!("Failed to open {}", ico.display()))?;

    let manifest = if hashes {
        extractor.list_with_hashes()?
    } else {
        extractor.list()
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} ({} bytes)", manifest.source, manifest.total_len);
    for entry in &manifest.entries {
        print!(
            "Index: {} - {}x{} - {} bytes - offset: {}",
            entry.index, entry.width, entry.height, entry.length, entry.offset
        );
        if let Some(name) = entry.name {
            print!(" [{}]", name);
        }
        if let Some(hash) = &entry.xxh64 {
            print!(" xxh64={}", hash);
        }
        println!();
    }

    for group in manifest.duplicates() {
        println!("Identical payloads: {:?}", group);
    }
    Ok(ExitCode::SUCCESS)
}

fn verify(ico: &Path) -> Result<ExitCode> {
    let mut extractor = IcoExtractor::new(ico)
        .with_context(|| format!("Failed to open {}", ico.display()))?;
    let findings = extractor.verify()?;

    if findings.is_empty() {
        info!("{}: no problems found", ico.display());
        return Ok(ExitCode::SUCCESS);
    }

    for finding in &findings {
        error!("{}", finding);
    }
    Ok(ExitCode::FAILURE)
}
