

// Bagged CART trees. Each estimator fits a bootstrap resample of the rows
// and considers sqrt(n_features) random features per split; prediction is a
// majority vote. Per-tree rngs derive from the base seed and the tree index
// so a fixed seed reproduces the whole forest.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::models::accuracy;
use crate::models::tree::DecisionTree;

pub struct RandomForest {
    pub trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub classes: Vec<usize>,
}

impl RandomForest {

    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>,
        n_estimators: usize, max_depth: usize, seed: u64) -> RandomForest {

        let (n, d) = x.dim();
        let max_features = ((d as f32).sqrt().round() as usize).max(1);

        let mut trees: Vec<DecisionTree> = Vec::with_capacity(n_estimators);
        for t in 0..n_estimators {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = DecisionTree::fit_on(x, y, classes.clone(), bootstrap,
                max_depth, Some(max_features), &mut rng);
            trees.push(tree);
        }

        Self {
            trees: trees,
            n_estimators: n_estimators,
            classes: classes,
        }
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {

        let n_classes = self.classes.len();
        let per_tree: Vec<Array1<f32>> = self.trees.iter().map(|tree| tree.predict(x)).collect();

        Array1::from_iter((0..x.dim().0).map(|row| {
            let mut votes = vec![0usize; n_classes];
            for pred in &per_tree {
                let class = self.classes.iter().position(|c| *c == pred[row] as usize).unwrap();
                votes[class] += 1;
            }
            let winner = votes.iter().enumerate().max_by_key(|(_, v)| **v).unwrap().0;
            self.classes[winner] as f32
        }))

    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

}
