//! Linear regressors solved via normal equations

use crate::error::{CostwiseError, Result};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Cholesky solve of a symmetric positive-definite system `Ax = b`.
/// Returns `None` if the matrix is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Gauss-Jordan solve, the fallback for near-singular systems.
fn gauss_jordan_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }
        if max_row != col {
            for j in 0..=n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }
        if aug[[col, col]].abs() < 1e-12 {
            return None;
        }
        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }
        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..=n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut x = Array1::zeros(n);
    for i in 0..n {
        x[i] = aug[[i, n]];
    }
    Some(x)
}

/// Solve `(X^T X + alpha I) w = X^T y`, preferring Cholesky with a
/// regularized retry before falling back to Gauss-Jordan.
fn solve_normal_equations(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<Array1<f64>> {
    let n_features = x.ncols();
    let mut xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    if alpha > 0.0 {
        for i in 0..n_features {
            xtx[[i, i]] += alpha;
        }
    }

    if let Some(w) = cholesky_solve(&xtx, &xty) {
        return Ok(w);
    }

    // Near-singular: add a small jitter proportional to the diagonal scale
    let jitter = 1e-8 * xtx.diag().iter().map(|v| v.abs()).sum::<f64>() / n_features.max(1) as f64;
    let mut regularized = xtx.clone();
    for i in 0..n_features {
        regularized[[i, i]] += jitter.max(1e-12);
    }
    if let Some(w) = cholesky_solve(&regularized, &xty) {
        return Ok(w);
    }

    gauss_jordan_solve(&xtx, &xty)
        .ok_or_else(|| CostwiseError::TrainingError("singular normal-equation system".to_string()))
}

/// Shared fit: center, solve, recover intercept.
fn fit_centered(x: &Array2<f64>, y: &Array1<f64>, alpha: f64) -> Result<(Array1<f64>, f64)> {
    if x.nrows() != y.len() {
        return Err(CostwiseError::SchemaMismatch {
            expected: format!("{} target rows", x.nrows()),
            actual: format!("{} target rows", y.len()),
        });
    }
    if x.nrows() == 0 {
        return Err(CostwiseError::TrainingError("empty training set".to_string()));
    }

    let x_mean = x
        .mean_axis(Axis(0))
        .ok_or_else(|| CostwiseError::TrainingError("empty feature matrix".to_string()))?;
    let y_mean = y.mean().unwrap_or(0.0);

    let x_centered = x - &x_mean.clone().insert_axis(Axis(0));
    let y_centered = y - y_mean;

    let coefficients = solve_normal_equations(&x_centered, &y_centered, alpha)?;
    let intercept = y_mean - coefficients.dot(&x_mean);
    Ok((coefficients, intercept))
}

fn predict_linear(
    x: &Array2<f64>,
    coefficients: &Option<Array1<f64>>,
    intercept: f64,
) -> Result<Array1<f64>> {
    let coefficients = coefficients.as_ref().ok_or(CostwiseError::NotFitted)?;
    if x.ncols() != coefficients.len() {
        return Err(CostwiseError::SchemaMismatch {
            expected: format!("{} features", coefficients.len()),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(x.dot(coefficients) + intercept)
}

/// Ordinary least squares regression.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let (coefficients, intercept) = fit_centered(x, y, 0.0)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        predict_linear(x, &self.coefficients, self.intercept)
    }
}

/// Ridge regression: OLS with an L2 penalty on the coefficients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub alpha: f64,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            coefficients: None,
            intercept: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if self.alpha < 0.0 {
            return Err(CostwiseError::InvalidParameter {
                name: "alpha".to_string(),
                value: self.alpha.to_string(),
                reason: "must be non-negative".to_string(),
            });
        }
        let (coefficients, intercept) = fit_centered(x, y, self.alpha)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        predict_linear(x, &self.coefficients, self.intercept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_linear_recovers_line() {
        // y = 2x + 1
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let pred = model.predict(&array![[5.0]]).unwrap();
        assert!((pred[0] - 11.0).abs() < 1e-8);
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];

        let mut ols = LinearRegression::new();
        ols.fit(&x, &y).unwrap();
        let mut ridge = RidgeRegression::new(10.0);
        ridge.fit(&x, &y).unwrap();

        let ols_pred = ols.predict(&array![[10.0]]).unwrap();
        let ridge_pred = ridge.predict(&array![[10.0]]).unwrap();
        // The penalized slope is smaller, so the extrapolated value is lower
        assert!(ridge_pred[0] < ols_pred[0]);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LinearRegression::new();
        assert!(matches!(
            model.predict(&array![[1.0]]),
            Err(CostwiseError::NotFitted)
        ));
    }

    #[test]
    fn test_feature_count_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let y = array![1.0, 2.0, 3.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();

        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert!(matches!(err, CostwiseError::SchemaMismatch { .. }));
    }
}
