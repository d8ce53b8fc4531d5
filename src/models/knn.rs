

// K-nearest-neighbors keeps the training partition as-is; prediction is a
// majority vote over the k rows closest in euclidean distance. The stored
// data is what the export record ships.

use ndarray::{Array1, Array2, ArrayView1};
use crate::models::accuracy;

pub struct KNearestNeighbors {
    pub training_data: Array2<f32>,
    pub training_labels: Array1<f32>,
    pub n_neighbors: usize,
    pub classes: Vec<usize>,
}

impl KNearestNeighbors {

    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, n_neighbors: usize) -> KNearestNeighbors {
        assert!(n_neighbors > 0, "n_neighbors must be positive");
        assert!(n_neighbors <= x.dim().0, "more neighbors than training rows");
        Self {
            training_data: x.clone(),
            training_labels: y.clone(),
            n_neighbors: n_neighbors,
            classes: classes,
        }
    }

    pub fn predict_row(&self, row: ArrayView1<f32>) -> f32 {

        // rank training rows by distance, ascending
        let mut ranked: Vec<(f32, usize)> = self.training_data.outer_iter().enumerate()
            .map(|(i, train_row)| {
                let dist: f32 = train_row.iter().zip(row.iter()).map(|(a, b)| (a - b).powi(2)).sum();
                (dist, self.training_labels[i] as usize)
            })
            .collect();
        ranked.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        let mut votes = vec![0usize; self.classes.len()];
        for (_, label) in ranked.iter().take(self.n_neighbors) {
            let class = self.classes.iter().position(|c| c == label).expect("label outside the class list");
            votes[class] += 1;
        }

        // ties break to the lower class label
        let winner = votes.iter().enumerate().max_by_key(|&(i, v)| (*v, self.classes.len() - i)).unwrap().0;
        self.classes[winner] as f32

    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        Array1::from_iter(x.outer_iter().map(|row| self.predict_row(row)))
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{array, Array1, Array2};

    fn toy() -> (Array2<f32>, Array1<f32>) {
        let x = Array2::from_shape_vec((6, 2), vec![
            0.0, 0.0, 0.1, 0.2, 0.2, 0.1,
            5.0, 5.0, 5.1, 4.9, 4.8, 5.2,
        ]).unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn votes_with_nearest_neighbors() {
        let (x, y) = toy();
        let model = KNearestNeighbors::fit(&x, &y, vec![0, 1], 3);
        let pred = model.predict(&array![[0.05_f32, 0.05], [5.05, 5.05]]);
        assert_eq!(pred, array![0.0_f32, 1.0]);
        assert_eq!(model.score(&x, &y), 1.0);
    }

    #[test]
    fn stores_training_partition_untouched() {
        let (x, y) = toy();
        let model = KNearestNeighbors::fit(&x, &y, vec![0, 1], 3);
        assert_eq!(model.training_data, x);
        assert_eq!(model.training_labels, y);
        assert_eq!(model.n_neighbors, 3);
    }

    #[test]
    fn single_neighbor_memorizes() {
        let (x, y) = toy();
        let model = KNearestNeighbors::fit(&x, &y, vec![0, 1], 1);
        assert_eq!(model.score(&x, &y), 1.0);
    }

}
