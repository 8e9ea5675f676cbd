//! Ordinary least squares regression
//!
//! Dense solver used by the unit-root test and the ARIMA estimator.
//! Design matrices are row-major (`rows[i][j]` is regressor `j` of
//! observation `i`). The system is solved through a singular value
//! decomposition of the design itself, so nearly collinear regressors
//! yield the minimum-norm solution instead of a singular normal matrix.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest are treated as zero
const RANK_TOLERANCE: f64 = 1e-10;

/// Result of an ordinary least squares fit
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// In-sample residuals (response - fitted)
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations used
    pub nobs: usize,
    /// Numerical rank of the design matrix
    pub rank: usize,
}

impl OlsFit {
    /// Whether every coefficient is identified by the data
    pub fn is_full_rank(&self) -> bool {
        self.rank == self.coefficients.len()
    }

    /// Residual variance with degrees-of-freedom correction
    pub fn sigma2(&self) -> f64 {
        let dof = self.nobs.saturating_sub(self.coefficients.len()).max(1);
        self.ssr / dof as f64
    }

    /// Gaussian log-likelihood evaluated at the maximum-likelihood variance
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }

    /// t-statistic of coefficient `index`
    ///
    /// Undefined for rank-deficient designs, where coefficients are not
    /// identified.
    pub fn t_stat(&self, index: usize) -> Result<f64> {
        let (Some(coefficient), Some(&std_error)) =
            (self.coefficients.get(index), self.std_errors.get(index))
        else {
            return Err(MathError::InvalidInput(format!(
                "No coefficient at index {}",
                index
            )));
        };
        if !self.is_full_rank() {
            return Err(MathError::CalculationError(format!(
                "Design matrix has rank {} for {} regressors",
                self.rank,
                self.coefficients.len()
            )));
        }
        if !(std_error.is_finite() && std_error > 0.0) {
            return Err(MathError::CalculationError(format!(
                "Degenerate standard error for coefficient {}",
                index
            )));
        }
        Ok(coefficient / std_error)
    }
}

/// Fit `response = rows * beta + e` by least squares
pub fn ols(rows: &[Vec<f64>], response: &[f64]) -> Result<OlsFit> {
    if rows.len() != response.len() {
        return Err(MathError::InvalidInput(format!(
            "Design has {} rows but response has {} values",
            rows.len(),
            response.len()
        )));
    }

    let k = rows.first().map(Vec::len).unwrap_or(0);
    if k == 0 {
        return Err(MathError::InvalidInput(
            "Design matrix has no columns".to_string(),
        ));
    }
    if rows.iter().any(|row| row.len() != k) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have differing lengths".to_string(),
        ));
    }
    let n = rows.len();
    if n <= k {
        return Err(MathError::InsufficientData(format!(
            "Need more than {} observations for {} regressors, have {}",
            k, k, n
        )));
    }
    if rows.iter().flatten().chain(response).any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Regression input contains non-finite values".to_string(),
        ));
    }

    let design = DMatrix::from_fn(n, k, |i, j| rows[i][j]);
    let y = DVector::from_column_slice(response);

    let svd = design.clone().svd(true, true);
    let largest = svd.singular_values.max();
    if !(largest.is_finite() && largest > 0.0) {
        return Err(MathError::CalculationError("Matrix is singular".to_string()));
    }
    let tolerance = largest * RANK_TOLERANCE;
    let rank = svd.rank(tolerance);

    let beta = svd
        .solve(&y, tolerance)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;
    if beta.iter().any(|c| !c.is_finite()) {
        return Err(MathError::CalculationError(
            "Least squares produced non-finite coefficients".to_string(),
        ));
    }

    // (X'X)^+ = V diag(1 / s^2) V'
    let v_t = svd.v_t.as_ref().ok_or_else(|| {
        MathError::CalculationError("Decomposition did not produce V".to_string())
    })?;
    let inverse_squares = svd
        .singular_values
        .map(|s| if s > tolerance { 1.0 / (s * s) } else { 0.0 });
    let covariance = v_t.transpose() * DMatrix::from_diagonal(&inverse_squares) * v_t;

    let residuals = &y - &design * &beta;
    let ssr = residuals.norm_squared();

    let mut fit = OlsFit {
        coefficients: beta.as_slice().to_vec(),
        std_errors: Vec::new(),
        residuals: residuals.as_slice().to_vec(),
        ssr,
        nobs: n,
        rank,
    };
    let sigma2 = fit.sigma2();
    fit.std_errors = (0..k).map(|i| (sigma2 * covariance[(i, i)]).sqrt()).collect();

    Ok(fit)
}
