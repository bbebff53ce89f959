use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sr_enhance::config::{self, Cli, Command, EnhanceArgs, PredictArgs, ServeConfig, TrainArgs};
use sr_enhance::model::{self, Enhancer, InferBackend, TrainBackend, TrainingConfig};
use sr_enhance::{build_dataset, visualize, DatasetConfig, Pipeline};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting sr-enhance v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Enhance(args) => run_enhance(args),
        Command::Train(args) => tokio::task::spawn_blocking(move || run_train(args)).await?,
        Command::Predict(args) => run_predict(args),
        Command::Serve(args) => {
            let config = ServeConfig::from(args);
            tracing::info!("Binding to {}:{}", config.host, config.port);
            sr_enhance::server::run(config).await
        }
    }
}

fn run_enhance(args: EnhanceArgs) -> anyhow::Result<()> {
    let params = config::load_params(args.params.as_deref())?;
    let pipeline = Pipeline::new(params)?;

    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;
    let result = pipeline.process(image.into_rgb8())?;

    for step in &result.steps {
        tracing::info!("{}: {}ms", step.name, step.time_ms);
    }
    result
        .image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {} in {}ms", args.output.display(), result.total_time_ms);
    Ok(())
}

fn run_train(args: TrainArgs) -> anyhow::Result<()> {
    let params = config::load_params(args.params.as_deref())?;
    let pipeline = Pipeline::new(params)?;
    let dataset_config = DatasetConfig::from(&args);
    let training_config = TrainingConfig::from(&args);

    let dataset = build_dataset(&args.data, &dataset_config, &pipeline)?;
    if dataset.is_empty() {
        anyhow::bail!("No usable images found in {}", args.data.display());
    }

    let mut rng = StdRng::seed_from_u64(training_config.seed);
    let split = dataset.split(training_config.train_fraction, &mut rng);
    tracing::info!(
        "Split {} pairs into {} training / {} validation",
        dataset.len(),
        split.train.len(),
        split.validation.len()
    );

    let device = Default::default();
    let (trained, history) =
        model::train::<TrainBackend>(&dataset, &split, &training_config, &device)?;

    let model_path = model::save_model(trained, &args.model)?;
    let history_path = model_path.with_extension("history.json");
    history.save_json(&history_path)?;
    tracing::info!(
        "Saved model to {} and history to {}",
        model_path.display(),
        history_path.display()
    );

    // Preview on held-out pairs, or training pairs when nothing was held out
    let preview = if split.validation.is_empty() {
        &split.train
    } else {
        &split.validation
    };
    let inference_model = model::load_model::<InferBackend>(&model_path, &device)?;
    visualize::save_comparisons(
        &inference_model,
        &dataset,
        preview,
        args.samples,
        &args.samples_dir,
        &device,
    )?;

    Ok(())
}

fn run_predict(args: PredictArgs) -> anyhow::Result<()> {
    let enhancer = Enhancer::load(&args.model, DatasetConfig::from(&args))?;
    let image = image::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let output = enhancer.enhance(&image)?;
    output
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    tracing::info!("Wrote {}", args.output.display());
    Ok(())
}
