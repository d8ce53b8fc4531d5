

pub mod linear;
pub mod tree;
pub mod forest;
pub mod kmeans;
pub mod knn;
pub mod svm;
pub mod mlp;

use ndarray::Array1;

/// Fraction of matching labels.
pub fn accuracy(predictions: &Array1<f32>, truth: &Array1<f32>) -> f32 {
    assert_eq!(predictions.len(), truth.len(), "inconsistent number of predictions and labels");
    let hits = predictions.iter().zip(truth.iter()).filter(|(p, t)| p == t).count();
    hits as f32 / truth.len() as f32
}

/// Coefficient of determination of a regression prediction.
pub fn r2_score(predictions: &Array1<f32>, truth: &Array1<f32>) -> f32 {
    assert_eq!(predictions.len(), truth.len(), "inconsistent number of predictions and labels");
    let mean = truth.mean().expect("cannot score an empty target");
    let ss_res: f32 = truth.iter().zip(predictions.iter()).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f32 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    1.0 - ss_res / ss_tot
}
