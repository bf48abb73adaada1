use std::time::Instant;

use ctbayes::aggregation::{EffectSource, MemoryCache, run_batch_cached};
use ctbayes::calibration::calibrate;
use ctbayes::config::SimulationConfig;
use ctbayes::curve::estimate_curve;
use ctbayes::error::CtbayesErr;
use ctbayes::inference::AncovaEngine;
use ctbayes::sequential::run_sequential_batch;
use ctbayes::study::Study;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    if let Err(e) = run() {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CtbayesErr> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_path(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(threads) = config.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            tracing::warn!(%e, "could not size the worker pool");
        }
    }

    let engine = AncovaEngine;
    let study = Study::new(&engine, config.model, &config.outcomes, config.generator)?;
    let cache = MemoryCache::default();

    //----------------------------------------
    // Fixed-effect batches
    let mut start = Instant::now();
    let power = run_batch_cached(
        &cache,
        &study,
        &EffectSource::Fixed(config.effect),
        &config.batch,
    )?;
    println!("Power ({:?}): {power}", start.elapsed());

    start = Instant::now();
    let type_1 = run_batch_cached(
        &cache,
        &study,
        &EffectSource::Null(config.effect),
        &config.batch,
    )?;
    println!("Type I error ({:?}): {type_1}", start.elapsed());

    if let Some(prior) = config.design_prior {
        start = Instant::now();
        let assurance = run_batch_cached(
            &cache,
            &study,
            &EffectSource::Prior {
                base: config.effect,
                prior,
            },
            &config.batch,
        )?;
        println!("Assurance ({:?}): {assurance}", start.elapsed());
    }

    println!("----------------------------------------");

    //----------------------------------------
    // Sample size curve
    start = Instant::now();
    let curve = estimate_curve(
        &study,
        &EffectSource::Fixed(config.effect),
        &config.batch,
        &config.curve.sample_sizes,
        config.curve.target,
        Some(&cache),
    )?;
    println!("Sample size curve ({:?}):", start.elapsed());
    for point in &curve.points {
        println!("  {point}");
    }
    println!(
        "Required N for {:.2}: {:.1} [{:.1}, {:.1}]",
        curve.required.target, curve.required.estimate, curve.required.lower, curve.required.upper
    );
    if !cache.is_empty() {
        println!("Batches cached: {}", cache.len());
    }

    println!("----------------------------------------");

    //----------------------------------------
    // Threshold calibration
    start = Instant::now();
    let calibration = calibrate(&study, &config.effect, &config.calibration)?;
    println!(
        "Calibrated threshold ({:?}): {:.4} (alpha {:.4}, converged: {}, {} steps)",
        start.elapsed(),
        calibration.threshold,
        calibration.achieved_alpha,
        calibration.converged,
        calibration.history.len()
    );

    println!("----------------------------------------");

    //----------------------------------------
    // Sequential design
    start = Instant::now();
    let sequential = run_sequential_batch(
        &study,
        &EffectSource::Fixed(config.effect),
        &config.sequential,
    )?;
    println!("Sequential design ({:?}): {sequential:#?}", start.elapsed());
    Ok(())
}
