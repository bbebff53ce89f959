use crate::dataset::DatasetConfig;
use crate::enhancement::EnhanceParams;
use crate::error::EnhanceError;
use crate::model::TrainingConfig;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sr-enhance")]
#[command(about = "Image enhancement pipeline, super-resolution trainer and demo server")]
#[command(version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run only the classical enhancement pipeline on one image
    Enhance(EnhanceArgs),
    /// Build the paired dataset from a folder and train the model
    Train(TrainArgs),
    /// Run a trained model on one image
    Predict(PredictArgs),
    /// Serve the upload-and-view demo
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct EnhanceArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    /// JSON file overriding enhancement parameters
    #[arg(long)]
    pub params: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Folder of JPEG/PNG training images
    #[arg(long)]
    pub data: PathBuf,

    /// Where to write the trained weights (extension becomes .mpk)
    #[arg(long, default_value = "enhance_model.mpk")]
    pub model: PathBuf,

    #[arg(long, default_value = "50")]
    pub epochs: usize,

    #[arg(long, default_value = "16")]
    pub batch_size: usize,

    #[arg(long, default_value = "0.0001")]
    pub learning_rate: f64,

    /// Seed for the train/validation split and batch order
    #[arg(long, default_value = "42")]
    pub seed: u64,

    #[arg(long, default_value = "0.8")]
    pub train_fraction: f64,

    /// Size of both pair members, WIDTHxHEIGHT
    #[arg(long, default_value = "128x128", value_parser = parse_size)]
    pub target_size: (u32, u32),

    /// Intermediate size of the degradation round trip, WIDTHxHEIGHT
    #[arg(long, default_value = "64x64", value_parser = parse_size)]
    pub low_res_size: (u32, u32),

    /// JSON file overriding enhancement parameters
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Directory for low | predicted | high preview strips
    #[arg(long, default_value = "samples")]
    pub samples_dir: PathBuf,

    /// Number of validation previews to write
    #[arg(long, default_value = "3")]
    pub samples: usize,
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    #[arg(long, default_value = "enhance_model.mpk")]
    pub model: PathBuf,

    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, default_value = "128x128", value_parser = parse_size)]
    pub target_size: (u32, u32),

    #[arg(long, default_value = "64x64", value_parser = parse_size)]
    pub low_res_size: (u32, u32),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long, env = "SR_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "SR_PORT", default_value = "8501")]
    pub port: u16,

    /// Maximum upload size in bytes (default: 20MB)
    #[arg(long, env = "SR_MAX_FILE_SIZE", default_value = "20971520")]
    pub max_file_size: usize,

    #[arg(long, env = "SR_MODEL", default_value = "enhance_model.mpk")]
    pub model: PathBuf,

    #[arg(long, default_value = "128x128", value_parser = parse_size)]
    pub target_size: (u32, u32),

    #[arg(long, default_value = "64x64", value_parser = parse_size)]
    pub low_res_size: (u32, u32),
}

/// Parse `WIDTHxHEIGHT`
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {:?}", s))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width {:?}: {}", w, e))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height {:?}: {}", h, e))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got {}x{}", w, h));
    }
    Ok((w, h))
}

/// Defaults unless a JSON override file is given
pub fn load_params(path: Option<&Path>) -> Result<EnhanceParams, EnhanceError> {
    match path {
        Some(p) => EnhanceParams::from_json_file(p),
        None => Ok(EnhanceParams::default()),
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub max_file_size: usize,
    pub model_path: PathBuf,
    pub dataset: DatasetConfig,
}

impl From<ServeArgs> for ServeConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            host: args.host,
            port: args.port,
            max_file_size: args.max_file_size,
            model_path: args.model,
            dataset: DatasetConfig {
                target_size: args.target_size,
                low_res_size: args.low_res_size,
            },
        }
    }
}

impl From<&TrainArgs> for TrainingConfig {
    fn from(args: &TrainArgs) -> Self {
        Self {
            epochs: args.epochs,
            batch_size: args.batch_size,
            learning_rate: args.learning_rate,
            train_fraction: args.train_fraction,
            seed: args.seed,
        }
    }
}

impl From<&TrainArgs> for DatasetConfig {
    fn from(args: &TrainArgs) -> Self {
        Self {
            target_size: args.target_size,
            low_res_size: args.low_res_size,
        }
    }
}

impl From<&PredictArgs> for DatasetConfig {
    fn from(args: &PredictArgs) -> Self {
        Self {
            target_size: args.target_size,
            low_res_size: args.low_res_size,
        }
    }
}
