

// Multi-layer perceptron classifier: relu hidden layers, softmax output,
// cross-entropy loss, full-batch Adam updates, Glorot-uniform init. Weight
// matrices are stored input-major, (fan_in, fan_out) per layer, which is
// also the layout the export record ships.

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use ndarray_stats::QuantileExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use crate::models::accuracy;

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const EPS: f32 = 1e-8;

pub struct MlpClassifier {
    pub coefs: Vec<Array2<f32>>,
    pub intercepts: Vec<Array1<f32>>,
    pub n_layers: usize,
    pub n_outputs: usize,
    pub classes: Vec<usize>,
    pub hidden_layer_sizes: Vec<usize>,
}

impl MlpClassifier {

    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, hidden_layer_sizes: &[usize],
        learning_rate: f32, max_iter: usize, seed: u64) -> MlpClassifier {

        let (n, d) = x.dim();
        assert_eq!(n, y.len(), "inconsistent number of rows and targets");
        let n_outputs = classes.len();

        // layer widths, input to output
        let mut sizes = vec![d];
        sizes.extend_from_slice(hidden_layer_sizes);
        sizes.push(n_outputs);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut coefs: Vec<Array2<f32>> = Vec::new();
        let mut intercepts: Vec<Array1<f32>> = Vec::new();
        for l in 0..sizes.len() - 1 {
            let (fan_in, fan_out) = (sizes[l], sizes[l + 1]);
            let bound = (6.0 / (fan_in + fan_out) as f32).sqrt();
            coefs.push(Array2::random_using((fan_in, fan_out), Uniform::new(-bound, bound), &mut rng));
            intercepts.push(Array1::zeros(fan_out));
        }

        // one-hot targets against the class list
        let mut onehot: Array2<f32> = Array2::zeros((n, n_outputs));
        for (i, label) in y.iter().enumerate() {
            let class = classes.iter().position(|c| *c == *label as usize).expect("label outside the class list");
            onehot[[i, class]] = 1.0;
        }

        // Adam state per parameter
        let mut m_w: Vec<Array2<f32>> = coefs.iter().map(|w| Array2::zeros(w.dim())).collect();
        let mut v_w: Vec<Array2<f32>> = coefs.iter().map(|w| Array2::zeros(w.dim())).collect();
        let mut m_b: Vec<Array1<f32>> = intercepts.iter().map(|b| Array1::zeros(b.dim())).collect();
        let mut v_b: Vec<Array1<f32>> = intercepts.iter().map(|b| Array1::zeros(b.dim())).collect();

        let n_weight_layers = coefs.len();
        for step in 1..=max_iter {

            // forward pass, keeping the pre-activations for backprop
            let mut activations: Vec<Array2<f32>> = vec![x.clone()];
            let mut pre_activations: Vec<Array2<f32>> = Vec::new();
            for l in 0..n_weight_layers {
                let z = activations[l].dot(&coefs[l]) + &intercepts[l];
                let a = if l == n_weight_layers - 1 {
                    MlpClassifier::softmax_rows(&z)
                } else {
                    z.mapv(|v| v.max(0.0))
                };
                pre_activations.push(z);
                activations.push(a);
            }

            // backward pass
            let mut delta = (&activations[n_weight_layers] - &onehot) / n as f32;
            for l in (0..n_weight_layers).rev() {

                let grad_w = activations[l].t().dot(&delta);
                let grad_b = delta.sum_axis(Axis(0));

                if l > 0 {
                    delta = delta.dot(&coefs[l].t())
                        * pre_activations[l - 1].mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                }

                // bias-corrected Adam moments
                let correction1 = 1.0 - BETA1.powi(step as i32);
                let correction2 = 1.0 - BETA2.powi(step as i32);

                m_w[l] = BETA1 * &m_w[l] + (1.0 - BETA1) * &grad_w;
                v_w[l] = BETA2 * &v_w[l] + (1.0 - BETA2) * &grad_w.mapv(|g| g * g);
                let step_w = learning_rate * &m_w[l].mapv(|v| v / correction1)
                    / &v_w[l].mapv(|v| (v / correction2).sqrt() + EPS);
                coefs[l] = &coefs[l] - &step_w;

                m_b[l] = BETA1 * &m_b[l] + (1.0 - BETA1) * &grad_b;
                v_b[l] = BETA2 * &v_b[l] + (1.0 - BETA2) * &grad_b.mapv(|g| g * g);
                let step_b = learning_rate * &m_b[l].mapv(|v| v / correction1)
                    / &v_b[l].mapv(|v| (v / correction2).sqrt() + EPS);
                intercepts[l] = &intercepts[l] - &step_b;

            }
        }

        Self {
            coefs: coefs,
            intercepts: intercepts,
            n_layers: sizes.len(),
            n_outputs: n_outputs,
            classes: classes,
            hidden_layer_sizes: hidden_layer_sizes.to_vec(),
        }

    }

    fn softmax_rows(z: &Array2<f32>) -> Array2<f32> {
        let mut out = z.clone();
        for mut row in out.axis_iter_mut(Axis(0)) {
            let max = *row.max().unwrap();
            row.mapv_inplace(|v| (v - max).exp());
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        out
    }

    fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        let n_weight_layers = self.coefs.len();
        let mut a = x.clone();
        for l in 0..n_weight_layers {
            let z = a.dot(&self.coefs[l]) + &self.intercepts[l];
            a = if l == n_weight_layers - 1 {
                MlpClassifier::softmax_rows(&z)
            } else {
                z.mapv(|v| v.max(0.0))
            };
        }
        a
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        let probs = self.forward(x);
        Array1::from_iter(probs.outer_iter().map(|row| {
            let best = row.argmax().unwrap();
            self.classes[best] as f32
        }))
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{Array1, Array2};

    // three gaussian-ish blobs, 30 samples each, standardized scale
    fn blobs() -> (Array2<f32>, Array1<f32>) {
        let centers = [(-2.0_f32, 0.0_f32), (2.0, 2.0), (0.0, -2.5)];
        let mut rows: Vec<f32> = Vec::new();
        let mut labels: Vec<f32> = Vec::new();
        for (class, (cx, cy)) in centers.iter().enumerate() {
            for i in 0..30 {
                let angle = i as f32 * 0.43;
                rows.extend_from_slice(&[cx + angle.cos() * 0.4, cy + angle.sin() * 0.4]);
                labels.push(class as f32);
            }
        }
        (Array2::from_shape_vec((90, 2), rows).unwrap(), Array1::from_vec(labels))
    }

    #[test]
    fn learns_three_blobs() {
        let (x, y) = blobs();
        let model = MlpClassifier::fit(&x, &y, vec![0, 1, 2], &[10, 5], 0.01, 500, 42);
        assert!(model.score(&x, &y) >= 0.95);
    }

    #[test]
    fn layer_shapes_follow_architecture() {
        let (x, y) = blobs();
        let model = MlpClassifier::fit(&x, &y, vec![0, 1, 2], &[10, 5], 0.01, 10, 42);

        assert_eq!(model.n_layers, 4);
        assert_eq!(model.n_outputs, 3);
        assert_eq!(model.hidden_layer_sizes, vec![10, 5]);

        assert_eq!(model.coefs.len(), 3);
        assert_eq!(model.coefs[0].dim(), (2, 10));
        assert_eq!(model.coefs[1].dim(), (10, 5));
        assert_eq!(model.coefs[2].dim(), (5, 3));
        assert_eq!(model.intercepts[0].len(), 10);
        assert_eq!(model.intercepts[2].len(), 3);
    }

    #[test]
    fn probabilities_are_normalized() {
        let (x, y) = blobs();
        let model = MlpClassifier::fit(&x, &y, vec![0, 1, 2], &[10, 5], 0.01, 50, 42);
        let probs = model.forward(&x);
        for row in probs.outer_iter() {
            let sum: f32 = row.sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!(row.iter().all(|p| *p >= 0.0));
        }
    }

    #[test]
    fn fit_is_deterministic_per_seed() {
        let (x, y) = blobs();
        let a = MlpClassifier::fit(&x, &y, vec![0, 1, 2], &[4], 0.01, 50, 11);
        let b = MlpClassifier::fit(&x, &y, vec![0, 1, 2], &[4], 0.01, 50, 11);
        assert_eq!(a.coefs[0], b.coefs[0]);
        assert_eq!(a.intercepts[1], b.intercepts[1]);
    }

}
