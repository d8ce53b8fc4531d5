

// The export record is the json document the visualization front end loads
// for one fitted model: a model-kind tag plus that kind's fixed set of
// fitted numeric attributes, shared metadata, and a bounded sample of the
// evaluation data. Field names are the wire contract.

use ndarray::Array2;
use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    LogisticRegression,
    DecisionTree,
    RandomForest,
    Kmeans,
    Knn,
    Svm,
    NeuralNetwork,
}

impl ModelKind {

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::LogisticRegression => "logistic_regression",
            ModelKind::DecisionTree => "decision_tree",
            ModelKind::RandomForest => "random_forest",
            ModelKind::Kmeans => "kmeans",
            ModelKind::Knn => "knn",
            ModelKind::Svm => "svm",
            ModelKind::NeuralNetwork => "neural_network",
        }
    }

    /// File stem of the export, e.g. `decision_tree_model` -> decision_tree_model.json
    pub fn file_stem(&self) -> String {
        format!("{}_model", self.as_str())
    }

}

/// Flattened tree arrays, nodes in depth-first preorder. Leaves hold -1 in
/// both child arrays, -2 in `feature` and -2.0 in `threshold`; `value` keeps
/// per-node class counts shaped [n_nodes][1][n_classes].
#[derive(Serialize, Clone, Debug)]
pub struct TreeStructure {
    pub children_left: Vec<i32>,
    pub children_right: Vec<i32>,
    pub feature: Vec<i32>,
    pub threshold: Vec<f32>,
    pub value: Vec<Vec<Vec<f32>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_node_samples: Option<Vec<usize>>,
}

#[derive(Serialize, Clone, Debug)]
pub struct SampleData {
    #[serde(rename = "X")]
    pub x: Vec<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<usize>>,
    pub feature_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_names: Option<Vec<String>>,
}

/// The per-kind fitted attributes. Serialized untagged and flattened into
/// the record, so each kind contributes its fields at the top level of the
/// json document.
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum ModelParams {
    LinearRegression {
        coefficients: Vec<f32>,
        intercept: f32,
        scaler_mean: Vec<f32>,
        scaler_scale: Vec<f32>,
    },
    LogisticRegression {
        coefficients: Vec<f32>,
        intercept: f32,
        classes: Vec<usize>,
        scaler_mean: Vec<f32>,
        scaler_scale: Vec<f32>,
    },
    DecisionTree {
        tree_structure: TreeStructure,
        classes: Vec<usize>,
    },
    RandomForest {
        n_estimators: usize,
        trees: Vec<TreeStructure>,
        classes: Vec<usize>,
    },
    Kmeans {
        n_clusters: usize,
        centroids: Vec<Vec<f32>>,
        n_iter: usize,
    },
    Knn {
        training_data: Vec<Vec<f32>>,
        training_labels: Vec<f32>,
        n_neighbors: usize,
        classes: Vec<usize>,
    },
    Svm {
        support_vectors: Vec<Vec<f32>>,
        dual_coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
        support: Vec<usize>,
        classes: Vec<usize>,
        kernel: String,
    },
    NeuralNetwork {
        coefs: Vec<Vec<Vec<f32>>>,
        intercepts: Vec<Vec<f32>>,
        n_layers: usize,
        n_outputs: usize,
        classes: Vec<usize>,
        hidden_layer_sizes: Vec<usize>,
    },
}

#[derive(Serialize, Clone, Debug)]
pub struct ExportRecord {
    #[serde(rename = "type")]
    pub kind: ModelKind,
    pub dataset: String,
    pub feature_names: Vec<String>,
    #[serde(flatten)]
    pub params: ModelParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_data: Option<SampleData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_names: Option<Vec<String>>,
}

/// Rows of a matrix as nested vectors, the layout json understands.
pub fn to_rows(x: &Array2<f32>) -> Vec<Vec<f32>> {
    x.outer_iter().map(|row| row.to_vec()).collect()
}
