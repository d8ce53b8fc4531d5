

// Soft-margin SVM with an RBF kernel, fit by simplified SMO: sweep the
// examples, pick a KKT violator, pair it with a random second multiplier,
// and solve the two-variable subproblem analytically. Gamma follows the
// `scale` heuristic, 1 / (n_features * var(X)).

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::models::accuracy;

const TOL: f32 = 1e-3;
const MAX_PASSES: usize = 5;
const MAX_SWEEPS: usize = 200;
const ALPHA_EPS: f32 = 1e-8;

pub struct SvmClassifier {
    pub support_vectors: Array2<f32>,
    pub dual_coef: Vec<f32>,
    pub intercept: f32,
    pub support: Vec<usize>,
    pub classes: Vec<usize>,
    pub kernel: String,
    gamma: f32,
}

impl SvmClassifier {

    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, c: f32, seed: u64) -> SvmClassifier {

        assert_eq!(classes.len(), 2, "the rbf svm here is binary only");
        let (n, d) = x.dim();
        assert_eq!(n, y.len(), "inconsistent number of rows and targets");

        // +-1 encoding against the class list
        let signs: Array1<f32> = y.mapv(|v| if v as usize == classes[1] { 1.0 } else { -1.0 });

        let variance = x.std_axis(ndarray::Axis(0), 0.0).mapv(|s| s * s).mean().unwrap();
        let gamma = if variance > 0.0 { 1.0 / (d as f32 * variance) } else { 1.0 };

        let kernel_matrix = SvmClassifier::kernel_matrix(x, gamma);

        let mut alphas: Array1<f32> = Array1::zeros(n);
        let mut b: f32 = 0.0;
        let mut rng = StdRng::seed_from_u64(seed);

        let decision = |alphas: &Array1<f32>, b: f32, i: usize| -> f32 {
            let mut sum = b;
            for j in 0..n {
                if alphas[j] > 0.0 {
                    sum += alphas[j] * signs[j] * kernel_matrix[[j, i]];
                }
            }
            sum
        };

        let mut passes = 0;
        let mut sweeps = 0;
        while passes < MAX_PASSES && sweeps < MAX_SWEEPS {
            sweeps += 1;
            let mut num_changed = 0;

            for i in 0..n {

                let error_i = decision(&alphas, b, i) - signs[i];
                let violates = (signs[i] * error_i < -TOL && alphas[i] < c)
                    || (signs[i] * error_i > TOL && alphas[i] > 0.0);
                if !violates {
                    continue
                }

                // random second multiplier distinct from i
                let mut j = rng.gen_range(0..n - 1);
                if j >= i {
                    j += 1;
                }
                let error_j = decision(&alphas, b, j) - signs[j];

                let (alpha_i_old, alpha_j_old) = (alphas[i], alphas[j]);
                let (low, high) = if signs[i] != signs[j] {
                    ((alpha_j_old - alpha_i_old).max(0.0), (c + alpha_j_old - alpha_i_old).min(c))
                } else {
                    ((alpha_i_old + alpha_j_old - c).max(0.0), (alpha_i_old + alpha_j_old).min(c))
                };
                if low == high {
                    continue
                }

                let eta = 2.0 * kernel_matrix[[i, j]] - kernel_matrix[[i, i]] - kernel_matrix[[j, j]];
                if eta >= 0.0 {
                    continue
                }

                let mut alpha_j = alpha_j_old - signs[j] * (error_i - error_j) / eta;
                alpha_j = alpha_j.clamp(low, high);
                if (alpha_j - alpha_j_old).abs() < 1e-5 {
                    continue
                }
                let alpha_i = alpha_i_old + signs[i] * signs[j] * (alpha_j_old - alpha_j);

                let b1 = b - error_i
                    - signs[i] * (alpha_i - alpha_i_old) * kernel_matrix[[i, i]]
                    - signs[j] * (alpha_j - alpha_j_old) * kernel_matrix[[i, j]];
                let b2 = b - error_j
                    - signs[i] * (alpha_i - alpha_i_old) * kernel_matrix[[i, j]]
                    - signs[j] * (alpha_j - alpha_j_old) * kernel_matrix[[j, j]];
                b = if alpha_i > 0.0 && alpha_i < c {
                    b1
                } else if alpha_j > 0.0 && alpha_j < c {
                    b2
                } else {
                    (b1 + b2) / 2.0
                };

                alphas[i] = alpha_i;
                alphas[j] = alpha_j;
                num_changed += 1;

            }

            if num_changed == 0 { passes += 1 } else { passes = 0 }
        }

        // only the multipliers that stayed positive define the model
        let support: Vec<usize> = (0..n).filter(|i| alphas[*i] > ALPHA_EPS).collect();
        let support_vectors = x.select(ndarray::Axis(0), &support);
        let dual_coef: Vec<f32> = support.iter().map(|i| alphas[*i] * signs[*i]).collect();

        Self {
            support_vectors: support_vectors,
            dual_coef: dual_coef,
            intercept: b,
            support: support,
            classes: classes,
            kernel: "rbf".to_string(),
            gamma: gamma,
        }

    }

    fn kernel_matrix(x: &Array2<f32>, gamma: f32) -> Array2<f32> {
        let n = x.dim().0;
        let mut k = Array2::zeros((n, n));
        for i in 0..n {
            for j in i..n {
                let value = SvmClassifier::rbf(x.row(i), x.row(j), gamma);
                k[[i, j]] = value;
                k[[j, i]] = value;
            }
        }
        k
    }

    fn rbf(a: ArrayView1<f32>, b: ArrayView1<f32>, gamma: f32) -> f32 {
        let squared: f32 = a.iter().zip(b.iter()).map(|(u, v)| (u - v).powi(2)).sum();
        (-gamma * squared).exp()
    }

    pub fn decision_function(&self, row: ArrayView1<f32>) -> f32 {
        let mut sum = self.intercept;
        for (coef, sv) in self.dual_coef.iter().zip(self.support_vectors.outer_iter()) {
            sum += coef * SvmClassifier::rbf(sv, row, self.gamma);
        }
        sum
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        Array1::from_iter(x.outer_iter().map(|row| {
            if self.decision_function(row) >= 0.0 {
                self.classes[1] as f32
            } else {
                self.classes[0] as f32
            }
        }))
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

}
