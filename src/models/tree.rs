

// CART classification tree with Gini impurity. The fitted tree is kept
// directly in the flattened array layout the export record needs: nodes in
// depth-first preorder, children before siblings. Leaves hold -1 in both
// child arrays, -2 in `feature` and -2.0 in `threshold`.

use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use crate::export::TreeStructure;
use crate::models::accuracy;

pub const LEAF: i32 = -1;
pub const UNDEFINED_FEATURE: i32 = -2;
pub const UNDEFINED_THRESHOLD: f32 = -2.0;

pub struct DecisionTree {
    pub children_left: Vec<i32>,
    pub children_right: Vec<i32>,
    pub feature: Vec<i32>,
    pub threshold: Vec<f32>,
    pub value: Vec<Vec<f32>>,
    pub n_node_samples: Vec<usize>,
    pub classes: Vec<usize>,
}

impl DecisionTree {

    /// Fits on the whole training partition.
    pub fn fit(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, max_depth: usize) -> DecisionTree {
        let indexes = (0..x.dim().0).collect::<Vec<usize>>();
        // feature subsampling is a forest concern, the rng goes unused here
        let mut rng = <StdRng as rand::SeedableRng>::seed_from_u64(0);
        DecisionTree::fit_on(x, y, classes, indexes, max_depth, None, &mut rng)
    }

    /// Fits on a row subset, optionally considering only `max_features`
    /// random features per split (used by the forest).
    pub fn fit_on(x: &Array2<f32>, y: &Array1<f32>, classes: Vec<usize>, indexes: Vec<usize>,
        max_depth: usize, max_features: Option<usize>, rng: &mut StdRng) -> DecisionTree {

        let mut tree = Self {
            children_left: Vec::new(),
            children_right: Vec::new(),
            feature: Vec::new(),
            threshold: Vec::new(),
            value: Vec::new(),
            n_node_samples: Vec::new(),
            classes: classes,
        };
        tree.grow(x, y, indexes, 0, max_depth, max_features, rng);
        tree
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn class_index(&self, label: f32) -> usize {
        self.classes.iter().position(|c| *c == label as usize)
            .expect("label outside the class list")
    }

    fn gini(counts: &[f32], total: f32) -> f32 {
        if total == 0.0 {
            return 0.0
        }
        1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f32>()
    }

    // appends the subtree rooted at `indexes` and returns its node id
    fn grow(&mut self, x: &Array2<f32>, y: &Array1<f32>, indexes: Vec<usize>, depth: usize,
        max_depth: usize, max_features: Option<usize>, rng: &mut StdRng) -> usize {

        let n_classes = self.classes.len();
        let node_id = self.node_count();

        let mut counts = vec![0.0_f32; n_classes];
        for i in &indexes {
            counts[self.class_index(y[*i])] += 1.0;
        }

        // node starts out as a leaf, split fields are patched in below
        self.children_left.push(LEAF);
        self.children_right.push(LEAF);
        self.feature.push(UNDEFINED_FEATURE);
        self.threshold.push(UNDEFINED_THRESHOLD);
        self.n_node_samples.push(indexes.len());
        let is_pure = counts.iter().filter(|c| **c > 0.0).count() <= 1;
        self.value.push(counts.clone());

        if depth >= max_depth || indexes.len() < 2 || is_pure {
            return node_id
        }

        let split = match self.best_split(x, y, &indexes, &counts, max_features, rng) {
            Some(split) => split,
            None => return node_id
        };

        let (left_indexes, right_indexes): (Vec<usize>, Vec<usize>) =
            indexes.into_iter().partition(|i| x[[*i, split.0]] <= split.1);

        let left_id = self.grow(x, y, left_indexes, depth + 1, max_depth, max_features, rng);
        let right_id = self.grow(x, y, right_indexes, depth + 1, max_depth, max_features, rng);

        self.children_left[node_id] = left_id as i32;
        self.children_right[node_id] = right_id as i32;
        self.feature[node_id] = split.0 as i32;
        self.threshold[node_id] = split.1;

        node_id

    }

    // the (feature, midpoint threshold) pair minimizing weighted Gini
    // impurity, or None when no candidate improves on the node impurity
    fn best_split(&self, x: &Array2<f32>, y: &Array1<f32>, indexes: &[usize], counts: &[f32],
        max_features: Option<usize>, rng: &mut StdRng) -> Option<(usize, f32)> {

        let d = x.dim().1;
        let n = indexes.len() as f32;
        let n_classes = self.classes.len();
        let node_impurity = DecisionTree::gini(counts, n);

        let candidate_features: Vec<usize> = match max_features {
            Some(m) => (0..d).choose_multiple(rng, m.min(d)),
            None => (0..d).collect()
        };

        let mut best: Option<(usize, f32)> = None;
        let mut best_impurity = node_impurity - 1e-7;

        for f in candidate_features {

            let mut ordered: Vec<(f32, usize)> = indexes.iter()
                .map(|i| (x[[*i, f]], self.class_index(y[*i])))
                .collect();
            ordered.sort_by(|(a, _), (b, _)| a.total_cmp(b));

            let mut left_counts = vec![0.0_f32; n_classes];
            let mut right_counts = counts.to_vec();

            for pos in 0..ordered.len() - 1 {
                let (val, class) = ordered[pos];
                left_counts[class] += 1.0;
                right_counts[class] -= 1.0;

                let next_val = ordered[pos + 1].0;
                if val == next_val {
                    continue
                }

                let n_left = (pos + 1) as f32;
                let n_right = n - n_left;
                let weighted = (n_left * DecisionTree::gini(&left_counts, n_left)
                    + n_right * DecisionTree::gini(&right_counts, n_right)) / n;

                if weighted < best_impurity {
                    best_impurity = weighted;
                    best = Some((f, (val + next_val) / 2.0));
                }
            }
        }

        best

    }

    pub fn predict_row(&self, row: ArrayView1<f32>) -> f32 {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            node = if row[self.feature[node] as usize] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        let counts = &self.value[node];
        let best = counts.iter().enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap();
        self.classes[best] as f32
    }

    pub fn predict(&self, x: &Array2<f32>) -> Array1<f32> {
        Array1::from_iter(x.outer_iter().map(|row| self.predict_row(row)))
    }

    pub fn score(&self, x: &Array2<f32>, y: &Array1<f32>) -> f32 {
        accuracy(&self.predict(x), y)
    }

    /// The flattened arrays in export layout. Forest trees drop the
    /// per-node sample counts, matching the original export.
    pub fn to_structure(&self, with_node_samples: bool) -> TreeStructure {
        TreeStructure {
            children_left: self.children_left.clone(),
            children_right: self.children_right.clone(),
            feature: self.feature.clone(),
            threshold: self.threshold.clone(),
            value: self.value.iter().map(|counts| vec![counts.clone()]).collect(),
            n_node_samples: if with_node_samples { Some(self.n_node_samples.clone()) } else { None },
        }
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{Array1, Array2};

    // xor-free toy set: feature 0 below 0 is class 0, above is class 1
    fn toy() -> (Array2<f32>, Array1<f32>) {
        let x = Array2::from_shape_vec((8, 2), vec![
            -2.0, 1.0, -1.5, -1.0, -1.0, 2.0, -0.5, 0.0,
             0.5, 1.0,  1.0, -2.0,  1.5, 0.5,  2.0, 1.0,
        ]).unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn splits_separable_data_perfectly() {
        let (x, y) = toy();
        let tree = DecisionTree::fit(&x, &y, vec![0, 1], 3);
        assert_eq!(tree.score(&x, &y), 1.0);

        // one split on feature 0 is enough
        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.feature[0], 0);
        assert!(tree.threshold[0] > -0.5 && tree.threshold[0] < 0.5);
    }

    #[test]
    fn arrays_are_consistent() {
        let (x, y) = toy();
        let tree = DecisionTree::fit(&x, &y, vec![0, 1], 3);
        let n = tree.node_count();
        assert_eq!(tree.children_left.len(), n);
        assert_eq!(tree.children_right.len(), n);
        assert_eq!(tree.feature.len(), n);
        assert_eq!(tree.threshold.len(), n);
        assert_eq!(tree.value.len(), n);
        assert_eq!(tree.n_node_samples.len(), n);

        for node in 0..n {
            let is_leaf = tree.children_left[node] == LEAF;
            assert_eq!(tree.children_right[node] == LEAF, is_leaf);
            if is_leaf {
                assert_eq!(tree.feature[node], UNDEFINED_FEATURE);
                assert_eq!(tree.threshold[node], UNDEFINED_THRESHOLD);
            } else {
                // preorder: children come after their parent
                assert!(tree.children_left[node] as usize > node);
                assert!(tree.children_right[node] as usize > tree.children_left[node] as usize);
            }
            // class counts at the node sum to its sample count
            let total: f32 = tree.value[node].iter().sum();
            assert_eq!(total as usize, tree.n_node_samples[node]);
        }

        // root sees every sample
        assert_eq!(tree.n_node_samples[0], 8);
    }

    #[test]
    fn depth_zero_is_a_single_leaf() {
        let (x, y) = toy();
        let tree = DecisionTree::fit(&x, &y, vec![0, 1], 0);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.children_left[0], LEAF);
    }

    #[test]
    fn max_depth_bounds_node_count() {
        let (x, y) = toy();
        let tree = DecisionTree::fit(&x, &y, vec![0, 1], 2);
        assert!(tree.node_count() <= 2usize.pow(3) - 1);
    }

    #[test]
    fn export_structure_nests_value() {
        let (x, y) = toy();
        let tree = DecisionTree::fit(&x, &y, vec![0, 1], 3);

        let with = tree.to_structure(true);
        assert!(with.n_node_samples.is_some());
        assert_eq!(with.value[0].len(), 1);
        assert_eq!(with.value[0][0].len(), 2);

        let without = tree.to_structure(false);
        assert!(without.n_node_samples.is_none());
    }

}
