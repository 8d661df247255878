//! Ordinary Least Squares (OLS) regression.
//!
//! Used by the stationarity tests: the ADF regression needs coefficient
//! standard errors, the KPSS test needs residuals from a linear detrend.

use crate::error::{PanelError, Result};

/// OLS fit of `y = X @ beta`.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// One coefficient per design column.
    pub coefficients: Vec<f64>,
    /// Standard error of each coefficient.
    pub std_errors: Vec<f64>,
    /// Residual sum of squares.
    pub rss: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OLSResult {
    /// t-statistic of coefficient `i`.
    pub fn t_stat(&self, i: usize) -> Option<f64> {
        let se = *self.std_errors.get(i)?;
        if se > 0.0 && se.is_finite() {
            Some(self.coefficients[i] / se)
        } else {
            None
        }
    }

    /// Akaike information criterion from the Gaussian log-likelihood.
    pub fn aic(&self) -> f64 {
        let n = self.nobs as f64;
        let llf = -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.rss / n).ln() + 1.0);
        -2.0 * llf + 2.0 * self.coefficients.len() as f64
    }

    /// Fitted values for a design given as columns.
    pub fn predict(&self, columns: &[Vec<f64>]) -> Result<Vec<f64>> {
        if columns.len() != self.coefficients.len() {
            return Err(PanelError::DimensionMismatch {
                expected: self.coefficients.len(),
                got: columns.len(),
            });
        }
        let n = columns.first().map(Vec::len).unwrap_or(0);
        let mut fitted = vec![0.0; n];
        for (beta, column) in self.coefficients.iter().zip(columns) {
            if column.len() != n {
                return Err(PanelError::DimensionMismatch {
                    expected: n,
                    got: column.len(),
                });
            }
            for (f, x) in fitted.iter_mut().zip(column) {
                *f += beta * x;
            }
        }
        Ok(fitted)
    }
}

/// Fit OLS on a design given as columns. Include a column of ones for an
/// intercept.
///
/// Uses Cholesky decomposition to solve the normal equations.
pub fn ols_fit(y: &[f64], columns: &[Vec<f64>]) -> Result<OLSResult> {
    let n = y.len();
    let k = columns.len();

    if k == 0 {
        return Err(PanelError::InvalidParameter(
            "OLS needs at least one design column".into(),
        ));
    }
    if n <= k {
        return Err(PanelError::InsufficientData {
            needed: k + 1,
            got: n,
        });
    }
    for column in columns {
        if column.len() != n {
            return Err(PanelError::DimensionMismatch {
                expected: n,
                got: column.len(),
            });
        }
    }

    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];
    for i in 0..k {
        for j in 0..=i {
            let s: f64 = columns[i].iter().zip(&columns[j]).map(|(a, b)| a * b).sum();
            xtx[i][j] = s;
            xtx[j][i] = s;
        }
        xty[i] = columns[i].iter().zip(y).map(|(a, b)| a * b).sum();
    }

    let l = cholesky(&xtx).ok_or_else(|| {
        PanelError::ComputationError("OLS regression failed: design matrix is singular".into())
    })?;
    let beta = cholesky_solve(&l, &xty);

    let mut rss = 0.0;
    for (obs, &y_obs) in y.iter().enumerate() {
        let fitted: f64 = (0..k).map(|j| beta[j] * columns[j][obs]).sum();
        let r = y_obs - fitted;
        rss += r * r;
    }

    // Diagonal of (X'X)^-1, one unit vector at a time.
    let sigma_sq = rss / (n - k) as f64;
    let std_errors = (0..k)
        .map(|i| {
            let mut e = vec![0.0; k];
            e[i] = 1.0;
            let col = cholesky_solve(&l, &e);
            (sigma_sq * col[i]).max(0.0).sqrt()
        })
        .collect();

    Ok(OLSResult {
        coefficients: beta,
        std_errors,
        rss,
        nobs: n,
    })
}

/// Compute residuals after removing an OLS fit.
pub fn ols_residuals(y: &[f64], columns: &[Vec<f64>], result: &OLSResult) -> Result<Vec<f64>> {
    let fitted = result.predict(columns)?;
    if fitted.len() != y.len() {
        return Err(PanelError::DimensionMismatch {
            expected: y.len(),
            got: fitted.len(),
        });
    }
    Ok(y.iter().zip(&fitted).map(|(yi, fi)| yi - fi).collect())
}

/// Cholesky factor `L` of a symmetric positive definite matrix, `A = L @ L'`.
fn cholesky(a: &[Vec<f64>]) -> Option<Vec<Vec<f64>>> {
    let n = a.len();
    let mut l = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }

            if i == j {
                // Relative pivot tolerance catches rank deficiency.
                if sum <= a[i][i].abs() * 1e-12 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }
    Some(l)
}

/// Solve `L @ L' @ x = b` by forward and backward substitution.
fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let n = b.len();

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }
    x
}
