//! Stationarity tests for time series.
//!
//! The Augmented Dickey-Fuller test (constant only, AIC lag selection) and
//! the KPSS test around a linear trend. The two tests have opposite null
//! hypotheses: ADF calls a series stationary when it rejects the unit root,
//! KPSS when it fails to reject stationarity.

use crate::error::{PanelError, Result};
use crate::utils::ols::{ols_fit, ols_residuals};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

/// Result of a stationarity test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityResult {
    /// Test statistic
    pub statistic: f64,
    /// P-value
    pub p_value: f64,
    /// Number of lags used
    pub lags: usize,
    /// Observations in the final regression
    pub nobs: usize,
    /// Whether series appears stationary at the requested level
    pub is_stationary: bool,
    /// Critical values at common significance levels
    pub critical_values: CriticalValues,
}

/// Critical values for stationarity tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CriticalValues {
    /// Critical value at 1% significance
    pub cv_1pct: f64,
    /// Critical value at 5% significance
    pub cv_5pct: f64,
    /// Critical value at 10% significance
    pub cv_10pct: f64,
}

/// MacKinnon (1994) bounds and coefficients, constant-only, one variable.
const ADF_TAU_MAX: f64 = 2.74;
const ADF_TAU_MIN: f64 = -18.83;
const ADF_TAU_STAR: f64 = -1.61;
const ADF_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const ADF_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// MacKinnon (2010) response surface for the critical values.
const ADF_CRIT_1: [f64; 4] = [-3.43035, -6.5393, -16.786, -79.433];
const ADF_CRIT_5: [f64; 4] = [-2.86154, -2.8903, -4.234, -40.040];
const ADF_CRIT_10: [f64; 4] = [-2.56677, -1.5384, -2.809, 0.0];

/// KPSS trend-stationarity table (Kwiatkowski et al. 1992).
const KPSS_CRIT: [f64; 4] = [0.119, 0.146, 0.176, 0.216];
const KPSS_P: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

/// Augmented Dickey-Fuller test for a unit root.
///
/// Regresses `Δy_t` on a constant, `y_{t-1}` and up to `max_lags` lagged
/// differences, picking the lag count with the lowest AIC over a common
/// sample, then refitting on the largest sample for that lag count.
///
/// # Arguments
/// * `series` - Time series data
/// * `max_lags` - Maximum augmentation lags (default: `ceil(12 * (n/100)^(1/4))`)
/// * `alpha` - Significance level; stationary when `p_value < alpha`
pub fn adf_test(series: &[f64], max_lags: Option<usize>, alpha: f64) -> Result<StationarityResult> {
    let n = series.len();
    check_testable(series, 4)?;

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let max_lags = max_lags.unwrap_or(default_lags).min(n / 2 - 2);

    let diff: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best_lag = 0;
    if max_lags > 0 {
        let mut best_aic = f64::INFINITY;
        for lag in 0..=max_lags {
            let (y, design) = adf_design(series, &diff, lag, max_lags);
            let aic = match ols_fit(&y, &design) {
                Ok(fit) => fit.aic(),
                Err(_) => continue,
            };
            if aic < best_aic {
                best_aic = aic;
                best_lag = lag;
            }
        }
    }

    let (y, design) = adf_design(series, &diff, best_lag, best_lag);
    let fit = ols_fit(&y, &design)?;
    let statistic = fit.t_stat(1).ok_or_else(|| {
        PanelError::ComputationError("ADF regression has no residual variance".into())
    })?;

    let nobs = fit.nobs;
    let p_value = mackinnon_p(statistic)?;
    let critical_values = CriticalValues {
        cv_1pct: response_surface(&ADF_CRIT_1, nobs),
        cv_5pct: response_surface(&ADF_CRIT_5, nobs),
        cv_10pct: response_surface(&ADF_CRIT_10, nobs),
    };

    Ok(StationarityResult {
        statistic,
        p_value,
        lags: best_lag,
        nobs,
        is_stationary: p_value < alpha,
        critical_values,
    })
}

/// Design for the ADF regression with `lag` lagged differences, on the
/// sample that `sample_lags` lags would leave.
///
/// Columns are `[1, y_{t-1}, Δy_{t-1}, .., Δy_{t-lag}]`.
fn adf_design(level: &[f64], diff: &[f64], lag: usize, sample_lags: usize) -> (Vec<f64>, Vec<Vec<f64>>) {
    let rows = sample_lags..diff.len();
    let y: Vec<f64> = diff[rows.clone()].to_vec();

    let mut design = Vec::with_capacity(lag + 2);
    design.push(vec![1.0; y.len()]);
    design.push(rows.clone().map(|t| level[t]).collect());
    for j in 1..=lag {
        design.push(rows.clone().map(|t| diff[t - j]).collect());
    }
    (y, design)
}

/// MacKinnon approximate p-value for the ADF statistic.
fn mackinnon_p(statistic: f64) -> Result<f64> {
    if statistic > ADF_TAU_MAX {
        return Ok(1.0);
    }
    if statistic < ADF_TAU_MIN {
        return Ok(0.0);
    }
    let coefficients: &[f64] = if statistic <= ADF_TAU_STAR {
        &ADF_SMALL_P
    } else {
        &ADF_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, &c| acc * statistic + c);

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| PanelError::ComputationError(format!("normal distribution: {}", e)))?;
    Ok(normal.cdf(z))
}

/// `b0 + b1/n + b2/n^2 + b3/n^3`
fn response_surface(b: &[f64; 4], nobs: usize) -> f64 {
    let inv = 1.0 / nobs as f64;
    b.iter().rev().fold(0.0, |acc, &c| acc * inv + c)
}

/// KPSS test for trend stationarity.
///
/// Tests the null hypothesis that the series is stationary around a linear
/// trend. Rejection implies non-stationarity.
///
/// # Arguments
/// * `series` - Time series data
/// * `lags` - Bartlett lags for the long-run variance (default: `ceil(12 * (n/100)^(1/4))`)
/// * `alpha` - Significance level; stationary when `p_value >= alpha`
pub fn kpss_test(series: &[f64], lags: Option<usize>, alpha: f64) -> Result<StationarityResult> {
    let n = series.len();
    check_testable(series, 4)?;

    let default_lags = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let lags = lags.unwrap_or(default_lags).min(n - 1);

    let design = vec![vec![1.0; n], (1..=n).map(|t| t as f64).collect()];
    let fit = ols_fit(series, &design)?;
    let residuals = ols_residuals(series, &design, &fit)?;

    let mut cumsum = 0.0;
    let eta = residuals
        .iter()
        .map(|r| {
            cumsum += r;
            cumsum * cumsum
        })
        .sum::<f64>()
        / (n * n) as f64;

    // Long-run variance with Bartlett weights.
    let mut s_hat: f64 = residuals.iter().map(|r| r * r).sum();
    for j in 1..=lags {
        let weight = 1.0 - j as f64 / (lags + 1) as f64;
        let autocovar: f64 = residuals[j..]
            .iter()
            .zip(&residuals[..n - j])
            .map(|(a, b)| a * b)
            .sum();
        s_hat += 2.0 * weight * autocovar;
    }
    let s_hat = s_hat / n as f64;

    if s_hat <= 0.0 || !s_hat.is_finite() {
        return Err(PanelError::DegenerateSeries(
            "KPSS long-run variance is not positive".into(),
        ));
    }

    let statistic = eta / s_hat;
    let p_value = kpss_p_value(statistic);

    Ok(StationarityResult {
        statistic,
        p_value,
        lags,
        nobs: n,
        is_stationary: p_value >= alpha,
        critical_values: CriticalValues {
            cv_1pct: KPSS_CRIT[3],
            cv_5pct: KPSS_CRIT[1],
            cv_10pct: KPSS_CRIT[0],
        },
    })
}

/// Linear interpolation in the KPSS table, clipped to `[0.01, 0.10]`.
fn kpss_p_value(statistic: f64) -> f64 {
    if statistic <= KPSS_CRIT[0] {
        return KPSS_P[0];
    }
    for i in 1..KPSS_CRIT.len() {
        if statistic <= KPSS_CRIT[i] {
            let t = (statistic - KPSS_CRIT[i - 1]) / (KPSS_CRIT[i] - KPSS_CRIT[i - 1]);
            return KPSS_P[i - 1] + t * (KPSS_P[i] - KPSS_P[i - 1]);
        }
    }
    KPSS_P[KPSS_P.len() - 1]
}

fn check_testable(series: &[f64], needed: usize) -> Result<()> {
    if series.len() < needed {
        return Err(PanelError::InsufficientData {
            needed,
            got: series.len(),
        });
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(PanelError::InvalidParameter(
            "stationarity tests need finite values".into(),
        ));
    }
    let first = series[0];
    if series.iter().all(|&v| v == first) {
        return Err(PanelError::DegenerateSeries(format!(
            "constant series (value {})",
            first
        )));
    }
    Ok(())
}

/// Which results decide the gating verdicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationarityGate {
    /// One test on the whole target column in `(timestamp, series)` order.
    #[default]
    Pooled,
    /// Every series must pass on its own.
    PerSeries,
}

/// Test outcomes for one series. `None` means the test was undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStationarity {
    pub key: String,
    pub adf: Option<StationarityResult>,
    pub kpss: Option<StationarityResult>,
}

/// Verdicts that gate the difference and log transforms, with the pooled
/// and per-series results behind them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StationarityReport {
    /// The target rejected the unit root under `gate`.
    pub adf_stationary: bool,
    /// The target did not reject trend stationarity under `gate`.
    pub kpss_stationary: bool,
    pub gate: StationarityGate,
    /// ADF on the pooled target column.
    pub adf: Option<StationarityResult>,
    /// KPSS on the pooled target column.
    pub kpss: Option<StationarityResult>,
    pub series: Vec<SeriesStationarity>,
    pub warnings: Vec<String>,
}

impl StationarityReport {
    /// "stationary", "non_stationary" or "inconclusive" when the tests disagree.
    pub fn conclusion(&self) -> &'static str {
        match (self.adf_stationary, self.kpss_stationary) {
            (true, true) => "stationary",
            (false, false) => "non_stationary",
            _ => "inconclusive",
        }
    }
}

/// Interleave series into `(timestamp, series)` order.
///
/// Series of unequal length contribute while they have values left.
pub fn pooled_column(series: &[(String, Vec<f64>)]) -> Vec<f64> {
    let longest = series.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
    let mut pooled = Vec::with_capacity(series.iter().map(|(_, v)| v.len()).sum());
    for t in 0..longest {
        for (_, values) in series {
            if let Some(&v) = values.get(t) {
                pooled.push(v);
            }
        }
    }
    pooled
}

fn run_tests(
    label: &str,
    values: &[f64],
    adf_max_lags: Option<usize>,
    kpss_lags: Option<usize>,
    alpha: f64,
) -> (Option<StationarityResult>, Option<StationarityResult>, Vec<String>) {
    let clean: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let mut warnings = Vec::new();

    let adf = adf_test(&clean, adf_max_lags, alpha)
        .map_err(|e| warnings.push(format!("{}: ADF test skipped: {}", label, e)))
        .ok();
    let kpss = kpss_test(&clean, kpss_lags, alpha)
        .map_err(|e| warnings.push(format!("{}: KPSS test skipped: {}", label, e)))
        .ok();
    (adf, kpss, warnings)
}

/// Run both tests on the pooled target column and on every series.
///
/// `series` holds the target of each series in panel order. The verdicts
/// come from the pooled column or, with [`StationarityGate::PerSeries`],
/// require every series to pass. Missing values are skipped. An undefined
/// test (constant, too short) is reported in `warnings` and counts as
/// non-stationary wherever it feeds the verdict.
pub fn analyze_stationarity(
    series: &[(String, Vec<f64>)],
    adf_max_lags: Option<usize>,
    kpss_lags: Option<usize>,
    alpha: f64,
    gate: StationarityGate,
    parallel: bool,
) -> StationarityReport {
    let run = |(key, values): &(String, Vec<f64>)| {
        let label = format!("series '{}'", key);
        let (adf, kpss, warnings) = run_tests(&label, values, adf_max_lags, kpss_lags, alpha);
        (
            SeriesStationarity {
                key: key.clone(),
                adf,
                kpss,
            },
            warnings,
        )
    };

    let outcomes: Vec<(SeriesStationarity, Vec<String>)> = if parallel {
        series.par_iter().map(run).collect()
    } else {
        series.iter().map(run).collect()
    };

    let mut report = StationarityReport {
        gate,
        ..StationarityReport::default()
    };

    let (adf, kpss, warnings) = run_tests(
        "pooled target",
        &pooled_column(series),
        adf_max_lags,
        kpss_lags,
        alpha,
    );
    for message in warnings {
        warn!("{}", message);
        report.warnings.push(message);
    }
    report.adf = adf;
    report.kpss = kpss;
    for (result, warnings) in outcomes {
        for message in warnings {
            warn!("{}", message);
            report.warnings.push(message);
        }
        if let (Some(adf), Some(kpss)) = (&result.adf, &result.kpss) {
            debug!(
                series = %result.key,
                adf_stat = adf.statistic,
                adf_p = adf.p_value,
                adf_lags = adf.lags,
                kpss_stat = kpss.statistic,
                kpss_p = kpss.p_value,
                "stationarity"
            );
        }
        report.series.push(result);
    }

    match gate {
        StationarityGate::Pooled => {
            report.adf_stationary = passes(report.adf.as_ref());
            report.kpss_stationary = passes(report.kpss.as_ref());
        }
        StationarityGate::PerSeries => {
            report.adf_stationary = all_pass(&report.series, |s| s.adf.as_ref());
            report.kpss_stationary = all_pass(&report.series, |s| s.kpss.as_ref());
        }
    }
    report
}

fn passes(result: Option<&StationarityResult>) -> bool {
    result.map(|r| r.is_stationary).unwrap_or(false)
}

fn all_pass<F>(series: &[SeriesStationarity], pick: F) -> bool
where
    F: Fn(&SeriesStationarity) -> Option<&StationarityResult>,
{
    !series.is_empty()
        && series
            .iter()
            .all(|s| passes(pick(s)))
}
