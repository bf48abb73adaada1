use itertools::Itertools;
use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::error::CtbayesErr;
use crate::sequential::error::SequentialError;
use crate::sequential::types::{
    ReasonProbabilities, SequentialRun, SequentialSummary, StageRow, StopReason,
};

/// Reduces sequential runs to stopping-reason probabilities, stopping
/// sample size moments and a per-look stopping table
pub fn summarize(
    schedule: &[usize],
    runs: &[SequentialRun],
) -> Result<SequentialSummary, CtbayesErr> {
    if runs.is_empty() {
        return Err(SequentialError::NoRuns.into());
    }
    let total = runs.len() as f64;

    let by_reason = runs.iter().map(|r| r.reason).counts();
    let share = |reason: StopReason| by_reason.get(&reason).copied().unwrap_or(0) as f64 / total;
    let reasons = ReasonProbabilities {
        efficacy: share(StopReason::Efficacy),
        futility: share(StopReason::Futility),
        success: share(StopReason::Success),
        failure: share(StopReason::Failure),
        model_failed: share(StopReason::ModelFailed),
    };

    //----------------------------------------
    // Stopping sample size
    let sizes: Vec<f64> = runs
        .iter()
        .map(|r| r.stopping_sample_size as f64)
        .collect();
    let mean_sample_size = sizes.iter().mean();
    let sd_sample_size = if runs.len() > 1 {
        sizes.iter().std_dev()
    } else {
        0.0
    };
    let median_sample_size = Data::new(sizes).median();

    //----------------------------------------
    // Per-look table
    let by_size = runs.iter().map(|r| r.stopping_sample_size).counts();
    if let Some(&off) = by_size.keys().find(|n| !schedule.contains(n)) {
        return Err(SequentialError::OffSchedule(off).into());
    }
    let stages: Vec<StageRow> = schedule
        .iter()
        .scan(0_usize, |cumulative, &sample_size| {
            let stopped = by_size.get(&sample_size).copied().unwrap_or(0);
            *cumulative += stopped;
            Some(StageRow {
                sample_size,
                stopped,
                proportion: stopped as f64 / total,
                cumulative: *cumulative as f64 / total,
            })
        })
        .collect();

    Ok(SequentialSummary {
        runs: runs.len(),
        reasons,
        mean_sample_size,
        median_sample_size,
        sd_sample_size,
        stages,
        model_failed_looks: runs.iter().map(SequentialRun::model_failures).sum(),
    })
}
