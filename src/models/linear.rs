

// Linear and logistic regression, fit by full-batch gradient descent on
// standardized features. Standardization keeps the problem well conditioned
// enough that a fixed learning rate converges.

use ndarray::{Array1, Array2};
use crate::models::{accuracy, r2_score};

pub struct LinearRegression {
    pub coefficients: Array1<f32>,
    pub intercept: f32,
}

impl LinearRegression {

    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, learning_rate: f32, max_iter: usize) -> LinearRegression {

        let (n, d) = x.dim();
        assert_eq!(n, y.len(), "inconsistent number of rows and targets");

        let mut w: Array1<f32> = Array1::zeros(d);
        let mut b: f32 = 0.0;

        for _epoch in 0..max_iter {
            // residuals of the current fit, shape (n,)
            let residuals = &x.dot(&w) + b - y;
            let grad_w = x.t().dot(&residuals) / n as f32;
            let grad_b = residuals.mean().unwrap();
            w = w - learning_rate * &grad_w;
            b -= learning_rate * grad_b;
        }

        Self {
            coefficients: w,
            intercept: b,
        }
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        x.dot(&self.coefficients) + self.intercept
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        r2_score(&self.predict(x), y)
    }

}

pub struct LogisticRegression {
    pub coefficients: Array1<f32>,
    pub intercept: f32,
    pub classes: Vec<usize>,
}

impl LogisticRegression {

    fn sigmoid(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    /// Binary classifier; `classes` are the two target labels ascending, the
    /// decision boundary maps below 0.5 to the first and above to the second.
    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, learning_rate: f32, max_iter: usize) -> LogisticRegression {

        assert_eq!(classes.len(), 2, "logistic regression here is binary only");
        let (n, d) = x.dim();
        assert_eq!(n, y.len(), "inconsistent number of rows and targets");

        // 0/1 encoding against the class list
        let targets: Array1<f32> = y.mapv(|v| if v as usize == classes[1] { 1.0 } else { 0.0 });

        let mut w: Array1<f32> = Array1::zeros(d);
        let mut b: f32 = 0.0;

        for _epoch in 0..max_iter {
            let probs = (&x.dot(&w) + b).mapv(LogisticRegression::sigmoid);
            let residuals = &probs - &targets;
            let grad_w = x.t().dot(&residuals) / n as f32;
            let grad_b = residuals.mean().unwrap();
            w = w - learning_rate * &grad_w;
            b -= learning_rate * grad_b;
        }

        Self {
            coefficients: w,
            intercept: b,
            classes: classes,
        }
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        (x.dot(&self.coefficients) + self.intercept).mapv(|z| {
            if LogisticRegression::sigmoid(z) >= 0.5 {
                self.classes[1] as f32
            } else {
                self.classes[0] as f32
            }
        })
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{array, Array1, Array2};
    use ndarray_rand::RandomExt;
    use ndarray_rand::rand_distr::Uniform;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn recovers_known_linear_coefficients() {
        let mut rng = StdRng::seed_from_u64(0);
        let x: Array2<f32> = Array2::random_using((200, 2), Uniform::new(-1.0, 1.0), &mut rng);
        // y = 3*x0 - 2*x1 + 1, no noise
        let y: Array1<f32> = x.column(0).mapv(|v| 3.0 * v) - x.column(1).mapv(|v| 2.0 * v) + 1.0;

        let model = LinearRegression::fit(&x, &y, 0.1, 2000);
        assert!((model.coefficients[0] - 3.0).abs() < 1e-2);
        assert!((model.coefficients[1] + 2.0).abs() < 1e-2);
        assert!((model.intercept - 1.0).abs() < 1e-2);
        assert!(model.score(&x, &y) > 0.999);
    }

    #[test]
    fn separates_two_blobs() {
        // two clearly separated blobs on the first feature
        let mut rows: Vec<f32> = Vec::new();
        let mut labels: Vec<f32> = Vec::new();
        for i in 0..40 {
            let jitter = (i % 7) as f32 * 0.05;
            rows.extend_from_slice(&[-2.0 + jitter, 0.3 * jitter]);
            labels.push(0.0);
            rows.extend_from_slice(&[2.0 - jitter, -0.3 * jitter]);
            labels.push(1.0);
        }
        let x = Array2::from_shape_vec((80, 2), rows).unwrap();
        let y = Array1::from_vec(labels);

        let model = LogisticRegression::fit(&x, &y, vec![0, 1], 0.5, 500);
        assert_eq!(model.score(&x, &y), 1.0);
        assert_eq!(model.classes, vec![0, 1]);
    }

    #[test]
    fn logistic_prediction_maps_to_class_labels() {
        let x = array![[-3.0_f32], [3.0]];
        let y = array![2.0_f32, 5.0];
        let model = LogisticRegression::fit(&x, &y, vec![2, 5], 0.5, 500);
        let pred = model.predict(&x);
        assert_eq!(pred, array![2.0_f32, 5.0]);
    }

}
