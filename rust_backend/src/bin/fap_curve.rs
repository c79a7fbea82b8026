//! Periodogram and FAP curve for a light curve stored as JSON.
//!
//! Usage: `keeplerite-fap <light_curve.json> [config.toml]`
//!
//! Without a config path the default `keeplerite.toml` lookup applies.
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use keeplerite::config::ExplorerConfig;
use keeplerite::fap::estimate_fap_curve;
use keeplerite::parsing::parse_light_curve_json;
use keeplerite::periodogram::{LombScargle, SpectralTransform};
use keeplerite::transformations::{filter_outliers, partition_valid, ValidityReport};

#[derive(Debug, Serialize)]
struct Peak {
    frequency: f64,
    power: f64,
    signal_to_noise: f64,
}

#[derive(Debug, Serialize)]
struct Summary {
    target: String,
    bins: usize,
    realizations: usize,
    validity: ValidityReport,
    noise_level: Option<f64>,
    peak: Option<Peak>,
}

fn run(light_curve_path: &Path, config: &ExplorerConfig) -> Result<Summary> {
    let mut lc = parse_light_curve_json(light_curve_path)?;
    if let Some(percent) = config.light_curve.outlier_filter() {
        lc = filter_outliers(&lc, percent)?;
    }

    let request = config.periodogram.request();
    let realizations = config.periodogram.fap_realizations;
    let mut rng = match config.periodogram.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let estimate = estimate_fap_curve(&lc, &LombScargle, &request, realizations, &mut rng)?;
    let (valid, _) = partition_valid(&lc);
    let spectrum = LombScargle.power_spectrum(&valid.times(), &valid.fluxes(), &request)?;
    let snr = spectrum.signal_to_noise(&estimate.curve)?;

    let peak = spectrum.peak().and_then(|(frequency, power)| {
        let index = spectrum.frequency.iter().position(|&f| f == frequency)?;
        Some(Peak {
            frequency,
            power,
            signal_to_noise: snr[index],
        })
    });

    Ok(Summary {
        target: lc.target.clone(),
        bins: spectrum.len(),
        realizations,
        validity: estimate.validity,
        noise_level: estimate.curve.median_level(),
        peak,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(light_curve_path) = args.get(1) else {
        bail!("usage: keeplerite-fap <light_curve.json> [config.toml]");
    };
    let config = match args.get(2) {
        Some(path) => ExplorerConfig::from_file(path)?,
        None => ExplorerConfig::from_default_location()?,
    };

    tracing::info!(path = %light_curve_path, "Computing FAP curve");
    let summary = run(Path::new(light_curve_path), &config)
        .with_context(|| format!("FAP estimation failed for {}", light_curve_path))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
