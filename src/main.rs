use imbinning::compare::{compare_features, MatchThresholds};
use imbinning::errors::{ImBinningError, Result};
use imbinning::io::containers::{read_features_csv, read_spectra, write_spectra};
use imbinning::io::{ArtifactLayout, SerializationFormat, TdfReader};
use imbinning::{AdaptivePeakPicker, BinningConfig, BinningPipeline, PeakPickerConfig, Spectrum};

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::subscriber::set_global_default;
use tracing::{error, info};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_chrome::ChromeLayerBuilder;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Also write a chrome trace (trace-*.json) of the run.
    #[arg(long, global = true)]
    chrome_trace: bool,
}

#[derive(Parser, Debug)]
struct BinArgs {
    /// A timsTOF `.d` directory or a `.json`/`.msgpack` spectra container.
    #[arg(short, long)]
    raw_file_path: PathBuf,

    /// The path to the json file with the binning settings.
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Number of ion mobility bins, overrides the settings file.
    #[arg(short, long)]
    num_bins: Option<usize>,

    /// Peak pick the bin spectra before finding features.
    #[arg(long)]
    peak_pick: bool,

    /// Directory the artifacts are written to, created if missing.
    #[arg(short, long)]
    output_dir: PathBuf,

    /// Prefix of every artifact. Defaults to the input file stem.
    #[arg(long)]
    name: Option<String>,

    #[arg(short, long, value_enum)]
    format: Option<SerializationFormat>,

    // Whether the output json should be pretty printed.
    #[arg(short, long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct PeakPickArgs {
    /// A timsTOF `.d` directory or a `.json`/`.msgpack` spectra container.
    #[arg(short, long)]
    raw_file_path: PathBuf,

    /// The path to the json file with the peak picker settings.
    #[arg(short, long)]
    config_path: Option<PathBuf>,

    /// Output spectra container (`.json` or `.msgpack`).
    #[arg(short, long)]
    output_path: PathBuf,

    #[arg(short, long)]
    pretty: bool,
}

#[derive(Parser, Debug)]
struct CompareArgs {
    /// Found features, csv with rt, m/z and ion mobility columns.
    #[arg(short, long = "in")]
    input: PathBuf,

    /// Reference features, same layout.
    #[arg(short, long = "ref")]
    reference: PathBuf,

    /// Output group name, reports go to `{out}-summary.txt` and `{out}-multiple.txt`.
    #[arg(short, long)]
    out: String,

    #[arg(short = 't', long, default_value_t = 5.0)]
    rt: f64,

    #[arg(short, long, default_value_t = 0.1)]
    mz: f64,

    #[arg(short = 'z', long, default_value_t = 0.031)]
    im: f64,
}

#[derive(Parser, Debug)]
struct WriteTemplateArgs {
    /// The path to the output files.
    #[arg(short, long)]
    output_path: PathBuf,

    /// Number of bins written in the template.
    #[arg(short, long, default_value_t = 4)]
    num_bins: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bin the run by ion mobility and find features in every bin.
    Bin(BinArgs),
    /// Peak pick every MS1 spectrum of a run.
    PeakPick(PeakPickArgs),
    /// Compare found features against reference features.
    Compare(CompareArgs),
    WriteTemplate(WriteTemplateArgs),
}

fn main() {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("imbinning".into(), std::io::stdout);
    let (chrome_layer, _guard) = if args.chrome_trace {
        let (layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
        .with(chrome_layer);

    if let Err(e) = set_global_default(subscriber) {
        eprintln!("Setting default subscriber failed: {}", e);
    }

    let res = match args.command {
        Some(Commands::Bin(args)) => main_bin(args),
        Some(Commands::PeakPick(args)) => main_peak_pick(args),
        Some(Commands::Compare(args)) => main_compare(args),
        Some(Commands::WriteTemplate(args)) => main_write_template(args),
        None => {
            println!("No command provided");
            Ok(())
        }
    };

    if let Err(e) = res {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

fn is_tdf_dir(path: &Path) -> bool {
    path.is_dir() || path.extension().is_some_and(|x| x == "d")
}

fn load_spectra(path: &Path) -> Result<Vec<Spectrum>> {
    if is_tdf_dir(path) {
        TdfReader::from_path(path)?.read_ms1_spectra()
    } else {
        read_spectra(path)
    }
}

fn main_bin(args: BinArgs) -> Result<()> {
    let mut config = match (&args.config_path, args.num_bins) {
        (Some(path), _) => read_json::<BinningConfig>(path)?,
        (None, Some(num_bins)) => BinningConfig::new(num_bins),
        (None, None) => {
            return Err(ImBinningError::custom(
                "Either --num-bins or --config-path is required",
            ))
        }
    };
    if let Some(num_bins) = args.num_bins {
        config.num_bins = num_bins;
    }
    config.peak_pick |= args.peak_pick;
    config.output.pretty |= args.pretty;
    if let Some(format) = args.format {
        config.output.format = format;
    }
    let pipeline = BinningPipeline::new(config)?;

    let spectra = load_spectra(&args.raw_file_path)?;
    let outputs = pipeline.run(&spectra)?;

    let name = match args.name {
        Some(name) => name,
        None => args
            .raw_file_path
            .file_stem()
            .map(|x| x.to_string_lossy().to_string())
            .unwrap_or_else(|| "run".to_string()),
    };
    let layout = ArtifactLayout::new(&args.output_dir, name, pipeline.config().output.format);
    pipeline.write_outputs(&outputs, &layout)
}

fn main_peak_pick(args: PeakPickArgs) -> Result<()> {
    let config = match &args.config_path {
        Some(path) => read_json::<PeakPickerConfig>(path)?,
        None => PeakPickerConfig::default(),
    };
    let picker = AdaptivePeakPicker::new(config)?;
    let spectra = load_spectra(&args.raw_file_path)?;
    let picked = picker.pick_spectra(&spectra)?;
    info!(
        "Peak picked {} spectra into {}",
        picked.len(),
        args.output_path.display()
    );
    write_spectra(&args.output_path, &picked, args.pretty)
}

fn main_compare(args: CompareArgs) -> Result<()> {
    let found = read_features_csv(&args.input)?;
    let reference = read_features_csv(&args.reference)?;
    let thresholds = MatchThresholds {
        rt: args.rt,
        mz: args.mz,
        im: args.im,
    };
    info!(
        "Comparing {} found features against {} reference features",
        found.len(),
        reference.len()
    );
    let comparison = compare_features(&found, &reference, &thresholds);
    println!("{}", comparison.summary.to_table());
    comparison.write_reports(&args.out)?;
    Ok(())
}

fn main_write_template(args: WriteTemplateArgs) -> Result<()> {
    let config = BinningConfig::new(args.num_bins);
    let config_json = serde_json::to_string_pretty(&config)?;
    let picker_json = serde_json::to_string_pretty(&PeakPickerConfig::default())?;

    std::fs::create_dir_all(&args.output_path)?;
    println!("Writing to {}", args.output_path.display());
    let config_path = args.output_path.join("binning_config.json");
    let picker_path = args.output_path.join("peak_picker_config.json");
    std::fs::write(&config_path, config_json)?;
    std::fs::write(&picker_path, picker_json)?;
    println!(
        "use as `imbinning bin --output-dir '.' --raw-file-path 'your_file.d' --config-path {:#?}`",
        config_path,
    );
    Ok(())
}
