

// Bundled benchmark datasets. Each dataset is an offline csv snapshot under
// the data directory, header row naming the features, last column the target.
// Loading any other name is an error.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::SeedableRng;
use std::error::Error;

pub struct Dataset {
    pub name: String,
    pub feature_names: Vec<String>,
    pub target_names: Option<Vec<String>>,
    pub x: Array2<f32>,
    pub y: Array1<f32>,
}

pub fn load_dataset(name: &str, data_dir: &str) -> Result<Dataset, Box<dyn Error>> {

    let target_names: Option<Vec<&str>> = match name {
        "iris" => Some(vec!["setosa", "versicolor", "virginica"]),
        "wine" => Some(vec!["class_0", "class_1", "class_2"]),
        "breast_cancer" => Some(vec!["malignant", "benign"]),
        "california_housing" => None,
        _ => return Err(format!("unknown dataset name: {}", name).into())
    };

    let path = format!("{}/{}.csv", data_dir, name);
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(&path)?;

    let headers = reader.headers()?.clone();
    let n_columns = headers.len();
    if n_columns < 2 {
        return Err(format!("dataset {} has no feature columns", name).into());
    }
    let feature_names: Vec<String> = headers.iter().take(n_columns - 1).map(|h| h.to_string()).collect();

    let mut xs: Vec<f32> = Vec::new();
    let mut ys: Vec<f32> = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.len() != n_columns {
            return Err(format!("dataset {} has a row with {} fields, expected {}", name, record.len(), n_columns).into());
        }
        for (i, field) in record.iter().enumerate() {
            let value: f32 = field.trim().parse()?;
            if i == n_columns - 1 { ys.push(value) } else { xs.push(value) }
        }
    }

    let n_rows = ys.len();
    let x = Array2::from_shape_vec((n_rows, n_columns - 1), xs)?;
    let y = Array1::from_vec(ys);

    Ok(Dataset {
        name: name.to_string(),
        feature_names: feature_names,
        target_names: target_names.map(|names| names.iter().map(|n| n.to_string()).collect()),
        x: x,
        y: y,
    })

}

/// Seeded shuffle split into train and test partitions. The same seed always
/// yields the same partition.
pub fn train_test_split(x: &Array2<f32>, y: &Array1<f32>, test_fraction: f32, seed: u64)
    -> (Array2<f32>, Array2<f32>, Array1<f32>, Array1<f32>) {

    let n = x.dim().0;
    let n_test = ((n as f32) * test_fraction).round() as usize;

    let mut order = (0..n).collect::<Vec<usize>>();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let test_indexes = &order[..n_test];
    let train_indexes = &order[n_test..];

    let x_train = x.select(Axis(0), train_indexes);
    let x_test = x.select(Axis(0), test_indexes);
    let y_train = y.select(Axis(0), train_indexes);
    let y_test = y.select(Axis(0), test_indexes);

    (x_train, x_test, y_train, y_test)

}

/// Samples up to `limit` rows of the evaluation data, without replacement.
pub fn sample_rows(x: &Array2<f32>, y: &Array1<f32>, limit: usize, rng: &mut StdRng)
    -> (Array2<f32>, Array1<f32>) {

    let n = x.dim().0;
    let k = limit.min(n);
    let indexes = (0..n).choose_multiple(rng, k);

    (x.select(Axis(0), &indexes), y.select(Axis(0), &indexes))

}

/// The distinct class labels of an integer-coded target column, ascending.
pub fn class_labels(y: &Array1<f32>) -> Vec<usize> {
    let mut classes: Vec<usize> = y.iter().map(|v| *v as usize).collect();
    classes.sort();
    classes.dedup();
    classes
}
