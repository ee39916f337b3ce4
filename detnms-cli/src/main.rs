use clap::Parser;
use detnms::io::image_size;
use detnms::{decode, decode_batch, DecodeConfig, Detections, NmsConfig, NmsMode, NmsStrategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode detector output and suppress overlapping boxes")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Log decode and suppression spans to stderr.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawFormat {
    #[default]
    F32Le,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyConfig {
    Greedy,
    Sorted,
}

impl From<StrategyConfig> for NmsStrategy {
    fn from(value: StrategyConfig) -> Self {
        match value {
            StrategyConfig::Greedy => NmsStrategy::Greedy,
            StrategyConfig::Sorted => NmsStrategy::Sorted,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    Global,
    ClassAware,
}

impl From<ModeConfig> for NmsMode {
    fn from(value: ModeConfig) -> Self {
        match value {
            ModeConfig::Global => NmsMode::Global,
            ModeConfig::ClassAware => NmsMode::ClassAware,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct NmsConfigJson {
    iou_threshold: f32,
    strategy: StrategyConfig,
    mode: ModeConfig,
    max_detections: Option<usize>,
}

impl Default for NmsConfigJson {
    fn default() -> Self {
        let cfg = NmsConfig::default();
        Self {
            iou_threshold: cfg.iou_threshold,
            strategy: StrategyConfig::Greedy,
            mode: ModeConfig::Global,
            max_detections: cfg.max_detections,
        }
    }
}

impl From<NmsConfigJson> for NmsConfig {
    fn from(value: NmsConfigJson) -> Self {
        Self {
            iou_threshold: value.iou_threshold,
            strategy: value.strategy.into(),
            mode: value.mode.into(),
            max_detections: value.max_detections,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecodeConfigJson {
    score_threshold: f32,
    record_width: usize,
    parallel: bool,
    nms: NmsConfigJson,
}

impl Default for DecodeConfigJson {
    fn default() -> Self {
        let cfg = DecodeConfig::default();
        Self {
            score_threshold: cfg.score_threshold,
            record_width: cfg.record_width,
            parallel: cfg.parallel,
            nms: NmsConfigJson::default(),
        }
    }
}

impl From<DecodeConfigJson> for DecodeConfig {
    fn from(value: DecodeConfigJson) -> Self {
        Self {
            score_threshold: value.score_threshold,
            nms: value.nms.into(),
            record_width: value.record_width,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    raw_path: String,
    raw_format: RawFormat,
    image_path: Option<String>,
    image_width: u32,
    image_height: u32,
    batch_sizes: Vec<[u32; 2]>,
    output_path: Option<String>,
    decode: DecodeConfigJson,
}

#[derive(Debug, Serialize)]
struct DetectionRecord {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    score: f32,
    class_id: u32,
}

#[derive(Debug, Serialize)]
struct ImageRecord {
    width: u32,
    height: u32,
    detections: Vec<DetectionRecord>,
}

impl ImageRecord {
    fn new((width, height): (u32, u32), detections: &Detections) -> Self {
        let detections = detections
            .iter()
            .map(|det| DetectionRecord {
                x: det.rect.x,
                y: det.rect.y,
                width: det.rect.width,
                height: det.rect.height,
                score: det.score,
                class_id: det.class_id,
            })
            .collect();
        Self {
            width,
            height,
            detections,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    images: Vec<ImageRecord>,
}

fn read_raw(path: &str, format: &RawFormat) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    match format {
        RawFormat::Json => {
            let text = fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        RawFormat::F32Le => {
            let bytes = fs::read(path)?;
            if bytes.len() % 4 != 0 {
                return Err(format!(
                    "{path}: {} bytes is not a whole number of f32 values",
                    bytes.len()
                )
                .into());
            }
            Ok(bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
    }
}

fn single_image_size(config: &Config) -> Result<(u32, u32), Box<dyn std::error::Error>> {
    match &config.image_path {
        Some(path) => Ok(image_size(path)?),
        None if config.image_width > 0 && config.image_height > 0 => {
            Ok((config.image_width, config.image_height))
        }
        None => Err("set image_path or both image_width and image_height".into()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("detnms=debug".parse()?))
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.raw_path.is_empty() {
        return Err("raw_path must be set in the config".into());
    }

    let raw = read_raw(&config.raw_path, &config.raw_format)?;
    let images = if config.batch_sizes.is_empty() {
        let size = single_image_size(&config)?;
        let decode_cfg = DecodeConfig::from(config.decode);
        let detections = decode(&raw, size.0, size.1, &decode_cfg)?;
        vec![ImageRecord::new(size, &detections)]
    } else {
        let sizes: Vec<(u32, u32)> = config.batch_sizes.iter().map(|&[w, h]| (w, h)).collect();
        let decode_cfg = DecodeConfig::from(config.decode);
        let batch = decode_batch(&raw, &sizes, &decode_cfg)?;
        sizes
            .iter()
            .zip(&batch)
            .map(|(&size, detections)| ImageRecord::new(size, detections))
            .collect()
    };

    let total: usize = images.iter().map(|img| img.detections.len()).sum();
    tracing::info!(images = images.len(), detections = total, "decoded");

    let json = serde_json::to_string_pretty(&Output { images })?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
