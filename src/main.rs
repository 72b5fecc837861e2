use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stipple::api::{build_layers, DetectResponse};
use stipple::models::{AppConfig, Preset};
use stipple::rendering::{decode_png, encode_png};
use stipple::server;
use stipple::services::DitherWorker;
use stipple_dither::{Algorithm, ColorMode, PixelBuffer, RegionList, Request, Response, Warning};

#[derive(Parser)]
#[command(name = "stipple")]
#[command(about = "Stipple - selective dithering and halftoning")]
struct Cli {
    /// YAML configuration file (falls back to $STIPPLE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen address, overrides $BIND_ADDR and the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Dither a whole PNG
    Process {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// Start from a configured preset
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        overrides: ParamOverrides,
    },
    /// Dither a PNG with per-region algorithms read from a YAML list
    Selective {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        output: PathBuf,

        /// YAML list of mask regions, later entries on top
        #[arg(long)]
        regions: PathBuf,

        /// Preset used outside every region
        #[arg(long)]
        preset: Option<String>,

        #[command(flatten)]
        overrides: ParamOverrides,
    },
    /// Print edge-bounded regions of a PNG as JSON
    Detect {
        #[arg(short, long)]
        input: PathBuf,

        /// Gradient magnitude below which a pixel counts as flat
        #[arg(long)]
        sensitivity: Option<f32>,

        /// Smallest region reported, in pixels
        #[arg(long)]
        min_size: Option<usize>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ColorModeArg {
    Bw,
    Cmyk,
    Rgb,
    Custom,
}

impl From<ColorModeArg> for ColorMode {
    fn from(arg: ColorModeArg) -> Self {
        match arg {
            ColorModeArg::Bw => ColorMode::Bw,
            ColorModeArg::Cmyk => ColorMode::Cmyk,
            ColorModeArg::Rgb => ColorMode::Rgb,
            ColorModeArg::Custom => ColorMode::Custom,
        }
    }
}

/// Command-line tweaks applied on top of a preset.
#[derive(clap::Args)]
struct ParamOverrides {
    /// Algorithm tag, e.g. floydSteinberg or directBinarySearch
    #[arg(short, long)]
    algorithm: Option<Algorithm>,

    #[arg(long, value_enum)]
    color_mode: Option<ColorModeArg>,

    /// Custom palette as comma-separated hex colors (implies --color-mode custom)
    #[arg(long, value_delimiter = ',')]
    colors: Option<Vec<String>>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    dot_size: Option<u32>,

    /// Halftone screen angle in degrees
    #[arg(long)]
    angle: Option<f32>,

    /// Quantizer contrast, 0..100 with 50 neutral
    #[arg(long)]
    contrast: Option<f32>,

    #[arg(long)]
    tone_levels: Option<u32>,

    /// Brightness adjustment, -100..100
    #[arg(long)]
    brightness: Option<f32>,

    #[arg(long)]
    gamma: Option<f32>,

    #[arg(long)]
    invert: bool,
}

impl ParamOverrides {
    fn apply(self, preset: &mut Preset) {
        let Preset {
            algorithm,
            params,
            adjustments,
        } = preset;

        if let Some(a) = self.algorithm {
            *algorithm = a;
        }
        if let Some(colors) = self.colors {
            params.custom_colors = colors;
            params.color_mode = ColorMode::Custom;
        }
        if let Some(mode) = self.color_mode {
            params.color_mode = mode.into();
        }
        apply_some(&mut params.seed, self.seed);
        apply_some(&mut params.dot_size, self.dot_size);
        apply_some(&mut params.angle, self.angle);
        apply_some(&mut params.contrast, self.contrast);
        apply_some(&mut params.tone_levels, self.tone_levels);
        apply_some(&mut adjustments.brightness, self.brightness);
        apply_some(&mut adjustments.gamma, self.gamma);
        adjustments.invert |= self.invert;
    }
}

fn apply_some<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var("STIPPLE_CONFIG").ok().map(PathBuf::from));

    match cli.command {
        Commands::Serve { bind } => {
            init_tracing("stipple=info,tower_http=info", true);
            let config = AppConfig::load(config_path.as_deref());
            run_server(config, bind).await
        }
        Commands::Process {
            input,
            output,
            preset,
            overrides,
        } => {
            init_tracing("stipple=warn", false);
            let config = AppConfig::load(config_path.as_deref());
            run_process_command(&config, &input, &output, preset, overrides).await
        }
        Commands::Selective {
            input,
            output,
            regions,
            preset,
            overrides,
        } => {
            init_tracing("stipple=warn", false);
            let config = AppConfig::load(config_path.as_deref());
            run_selective_command(&config, &input, &output, &regions, preset, overrides).await
        }
        Commands::Detect {
            input,
            sensitivity,
            min_size,
        } => {
            init_tracing("stipple=warn", false);
            let config = AppConfig::load(config_path.as_deref());
            run_detect_command(&config, &input, sensitivity, min_size).await
        }
    }
}

fn init_tracing(default_filter: &str, with_time: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    if with_time {
        registry.with(tracing_subscriber::fmt::layer()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().without_time())
            .init();
    }
}

async fn run_server(config: AppConfig, bind: Option<String>) -> anyhow::Result<()> {
    let bind_addr = bind
        .or_else(|| std::env::var("BIND_ADDR").ok())
        .unwrap_or_else(|| config.server.bind.clone());

    let state = server::create_app_state(config);
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {bind_addr}"))?;
    tracing::info!(addr = %bind_addr, "Stipple server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn resolve_preset(config: &AppConfig, name: Option<String>) -> anyhow::Result<Preset> {
    match name {
        Some(name) => config
            .preset(&name)
            .cloned()
            .with_context(|| format!("Unknown preset: {name}")),
        None => Ok(Preset::default()),
    }
}

fn read_png(config: &AppConfig, path: &Path) -> anyhow::Result<PixelBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(decode_png(&bytes, config.limits.max_pixels)?)
}

fn write_png(path: &Path, pixels: &PixelBuffer) -> anyhow::Result<()> {
    let bytes = encode_png(pixels)?;
    std::fs::write(path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {}x{} image to {} ({} bytes)",
        pixels.width(),
        pixels.height(),
        path.display(),
        bytes.len()
    );
    Ok(())
}

async fn run_image_request(request: Request) -> anyhow::Result<(PixelBuffer, Vec<Warning>)> {
    match DitherWorker::spawn(0).submit(request).await? {
        Response::Image { pixels, warnings } => Ok((pixels, warnings)),
        Response::Failed(e) => Err(e.into()),
        Response::Regions(_) => anyhow::bail!("Dither worker returned regions for an image request"),
    }
}

fn report_warnings(warnings: &[Warning]) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }
}

async fn run_process_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    preset: Option<String>,
    overrides: ParamOverrides,
) -> anyhow::Result<()> {
    let mut preset = resolve_preset(config, preset)?;
    overrides.apply(&mut preset);

    let pixels = read_png(config, input)?;
    config
        .limits
        .check_dbs([preset.algorithm], pixels.pixel_count() as u64)?;
    let (pixels, warnings) = run_image_request(Request::ProcessImage {
        pixels,
        algorithm: preset.algorithm,
        params: preset.params,
        adjustments: preset.adjustments,
    })
    .await?;

    report_warnings(&warnings);
    write_png(output, &pixels)
}

async fn run_selective_command(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    regions_path: &Path,
    preset: Option<String>,
    overrides: ParamOverrides,
) -> anyhow::Result<()> {
    let mut preset = resolve_preset(config, preset)?;
    overrides.apply(&mut preset);

    let content = std::fs::read_to_string(regions_path)
        .with_context(|| format!("Failed to read {}", regions_path.display()))?;
    let regions: RegionList = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse regions in {}", regions_path.display()))?;

    config.limits.check_regions(regions.as_slice().len())?;

    let pixels = read_png(config, input)?;
    config.limits.check_dbs(
        std::iter::once(preset.algorithm).chain(regions.as_slice().iter().map(|r| r.algorithm)),
        pixels.pixel_count() as u64,
    )?;
    let layers = build_layers(regions.as_slice(), pixels.width(), pixels.height())?;

    let (pixels, warnings) = run_image_request(Request::ProcessSelective {
        pixels,
        layers,
        default_algorithm: preset.algorithm,
        default_params: preset.params,
        adjustments: preset.adjustments,
    })
    .await?;

    report_warnings(&warnings);
    write_png(output, &pixels)
}

async fn run_detect_command(
    config: &AppConfig,
    input: &Path,
    sensitivity: Option<f32>,
    min_size: Option<usize>,
) -> anyhow::Result<()> {
    let pixels = read_png(config, input)?;
    let request = Request::DetectRegions {
        pixels,
        sensitivity: sensitivity.unwrap_or(config.detection.sensitivity),
        min_size: min_size.unwrap_or(config.detection.min_size),
    };

    let regions = match DitherWorker::spawn(0).submit(request).await? {
        Response::Regions(regions) => regions,
        Response::Failed(e) => return Err(e.into()),
        Response::Image { .. } => anyhow::bail!("Dither worker returned an image for a detect request"),
    };

    println!("{}", serde_json::to_string_pretty(&DetectResponse { regions })?);
    Ok(())
}
