//! `prospect` - prospectivity heatmap pipeline CLI.
//!
//! Reads two WKT polygon files, runs the scoring pipeline, and writes the
//! finished grid table as CSV (and optionally JSON Lines).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use prospectivity::{
    BoundingBox, CellCache, FsCellCache, PipelineConfig, ProspectError, ingest, persist, pipeline,
};

#[derive(Parser, Debug)]
#[command(
    name = "prospect",
    about = "Score proximity to a geological contact zone on a hex grid"
)]
struct Args {
    /// WKT file with rock type A polygons (WGS84 lon/lat degrees).
    #[arg(long, value_name = "FILE")]
    rock_a: PathBuf,

    /// WKT file with rock type B polygons (WGS84 lon/lat degrees).
    #[arg(long, value_name = "FILE")]
    rock_b: PathBuf,

    /// JSON configuration file; built-in defaults apply when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Explicit bounding box, WEST,SOUTH,EAST,NORTH in degrees.
    /// Defaults to the union of both polygon sets' extents.
    #[arg(long, value_name = "W,S,E,N")]
    bbox: Option<String>,

    /// Directory for memoized polygon-to-cell results.
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Output CSV path.
    #[arg(long, value_name = "FILE")]
    out: PathBuf,

    /// Optional JSON Lines output path.
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> prospectivity::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let bbox = args.bbox.as_deref().map(parse_bbox).transpose()?;

    let rock_a = ingest::read_wkt_file(&args.rock_a, "a")?;
    let rock_b = ingest::read_wkt_file(&args.rock_b, "b")?;

    let cache = args.cache_dir.map(FsCellCache::new);
    let cache_ref = cache.as_ref().map(|c| c as &dyn CellCache);

    let grid = pipeline::run(&rock_a, &rock_b, bbox, &config, cache_ref)?;

    persist::write_csv(&grid, &args.out)?;
    info!("wrote {} cells to {}", grid.len(), args.out.display());
    if let Some(json_path) = args.json {
        persist::write_jsonl(&grid, &json_path)?;
        info!("wrote JSON Lines to {}", json_path.display());
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> prospectivity::Result<PipelineConfig> {
    match path {
        None => Ok(PipelineConfig::default()),
        Some(path) => {
            let text = fs::read_to_string(path)?;
            serde_json::from_str(&text).map_err(|err| {
                ProspectError::Config(format!("cannot parse {}: {err}", path.display()))
            })
        }
    }
}

fn parse_bbox(input: &str) -> prospectivity::Result<BoundingBox> {
    let edges: Vec<f64> = input
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|err| ProspectError::Config(format!("invalid bbox '{input}': {err}")))?;
    if edges.len() != 4 {
        return Err(ProspectError::Config(format!(
            "invalid bbox '{input}': expected WEST,SOUTH,EAST,NORTH"
        )));
    }
    Ok(BoundingBox::new(edges[0], edges[1], edges[2], edges[3]))
}
