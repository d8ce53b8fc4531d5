

use ndarray::{Array1, Array2, Axis};

/// Per-feature standardization fit on the training partition. The fitted
/// mean and scale are part of the export record for the kinds that need to
/// standardize inputs at prediction time.
pub struct StandardScaler {
    pub mean: Array1<f32>,
    pub scale: Array1<f32>,
}

impl StandardScaler {

    pub fn fit(x: &Array2<f32>) -> StandardScaler {

        let mean = x.mean_axis(Axis(0)).expect("cannot standardize an empty matrix");
        let mut scale = x.std_axis(Axis(0), 0.0);

        // constant features would divide by zero
        scale.mapv_inplace(|s| if s == 0.0 { 1.0 } else { s });

        Self {
            mean: mean,
            scale: scale,
        }
    }

    pub fn transform(&self, x: &Array2<f32>) -> Array2<f32> {
        (x - &self.mean) / &self.scale
    }

    pub fn fit_transform(x: &Array2<f32>) -> (StandardScaler, Array2<f32>) {
        let scaler = StandardScaler::fit(x);
        let scaled = scaler.transform(x);
        (scaler, scaled)
    }

}
