

// Runs the eight (dataset, algorithm) pairs sequentially:
// -> configuration of arguments
// -> per pair: load, split, scale where the recipe says so, fit, score,
//    sample evaluation rows, save the export record

use crate::config::{files_handling, Config, Settings, TrainSettings};
use crate::datasets::{self, Dataset};
use crate::export::{to_rows, ExportRecord, ModelKind, ModelParams, SampleData};
use crate::models::linear::{LinearRegression, LogisticRegression};
use crate::models::tree::DecisionTree;
use crate::models::forest::RandomForest;
use crate::models::kmeans::KMeans;
use crate::models::knn::KNearestNeighbors;
use crate::models::svm::SvmClassifier;
use crate::models::mlp::MlpClassifier;
use crate::scaling::StandardScaler;

use core::panic;
use log::info;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::env;
use std::error::Error;
use std::time::Instant;

// descent hyperparameters of the in-crate fitters; the original delegated
// these to its numerical library
const LINEAR_LEARNING_RATE: f32 = 0.1;
const LINEAR_MAX_ITER: usize = 1000;
const LOGISTIC_LEARNING_RATE: f32 = 0.1;
const MLP_LEARNING_RATE: f32 = 1e-3;

pub struct Pipeline {}

impl Pipeline {

    pub fn run() {

        info!("entering program...");
        let args: Vec<String> = env::args().collect();

        info!("building parameters...");
        let params = match Config::new(&args) {
            Ok(config) => config.get_params(),
            Err(e) => panic!("{}", e)
        };
        info!("{}", params);

        let jobs: [(&str, fn(&Settings) -> Result<f32, Box<dyn Error>>, &str); 8] = [
            ("Linear Regression", Pipeline::linear_regression, "R^2"),
            ("Logistic Regression", Pipeline::logistic_regression, "Accuracy"),
            ("Decision Tree", Pipeline::decision_tree, "Accuracy"),
            ("Random Forest", Pipeline::random_forest, "Accuracy"),
            ("K-Means", Pipeline::kmeans, "Inertia"),
            ("KNN", Pipeline::knn, "Accuracy"),
            ("SVM", Pipeline::svm, "Accuracy"),
            ("Neural Network", Pipeline::neural_network, "Accuracy"),
        ];

        for (name, job, metric) in jobs {
            let timer = Instant::now();
            info!("training {}...", name);
            let score = match job(&params) {
                Ok(score) => score,
                Err(e) => panic!("{}", e)
            };
            info!("{} - {}: {:.4}, took {} seconds...", name, metric, score, timer.elapsed().as_secs());
        }

        info!("all models trained and exported");

    }

    // target names ride along only for the jobs whose records ship them
    fn sample(x_test: &Array2<f32>, y_test: &Array1<f32>, ds: &Dataset, train: &TrainSettings,
        target_names: Option<Vec<String>>) -> SampleData {
        let mut rng = StdRng::seed_from_u64(train.seed);
        let (sx, sy) = datasets::sample_rows(x_test, y_test, train.sample_limit, &mut rng);
        SampleData {
            x: to_rows(&sx),
            y: Some(sy.to_vec()),
            labels: None,
            feature_names: ds.feature_names.clone(),
            target_names: target_names,
        }
    }

    fn linear_regression(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("california_housing", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let (scaler, x_train_scaled) = StandardScaler::fit_transform(&x_train);
        let model = LinearRegression::fit(&x_train_scaled, &y_train, LINEAR_LEARNING_RATE, LINEAR_MAX_ITER);
        let score = model.score(&scaler.transform(&x_test), &y_test);

        let record = ExportRecord {
            kind: ModelKind::LinearRegression,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::LinearRegression {
                coefficients: model.coefficients.to_vec(),
                intercept: model.intercept,
                scaler_mean: scaler.mean.to_vec(),
                scaler_scale: scaler.scale.to_vec(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, None)),
            target_names: None,
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::LinearRegression.file_stem(), record)?;
        Ok(score)

    }

    fn logistic_regression(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("breast_cancer", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let (scaler, x_train_scaled) = StandardScaler::fit_transform(&x_train);
        let model = LogisticRegression::fit(&x_train_scaled, &y_train, classes,
            LOGISTIC_LEARNING_RATE, train.logistic_max_iter);
        let score = model.score(&scaler.transform(&x_test), &y_test);

        let record = ExportRecord {
            kind: ModelKind::LogisticRegression,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::LogisticRegression {
                coefficients: model.coefficients.to_vec(),
                intercept: model.intercept,
                classes: model.classes.clone(),
                scaler_mean: scaler.mean.to_vec(),
                scaler_scale: scaler.scale.to_vec(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, None)),
            target_names: None,
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::LogisticRegression.file_stem(), record)?;
        Ok(score)

    }

    fn decision_tree(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("iris", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let model = DecisionTree::fit(&x_train, &y_train, classes, train.tree_max_depth);
        let score = model.score(&x_test, &y_test);

        let record = ExportRecord {
            kind: ModelKind::DecisionTree,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::DecisionTree {
                tree_structure: model.to_structure(true),
                classes: model.classes.clone(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, ds.target_names.clone())),
            target_names: ds.target_names.clone(),
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::DecisionTree.file_stem(), record)?;
        Ok(score)

    }

    fn random_forest(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("wine", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let model = RandomForest::fit(&x_train, &y_train, classes,
            train.forest_n_estimators, train.forest_max_depth, train.seed);
        let score = model.score(&x_test, &y_test);

        let record = ExportRecord {
            kind: ModelKind::RandomForest,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::RandomForest {
                n_estimators: model.n_estimators,
                trees: model.trees.iter().map(|tree| tree.to_structure(false)).collect(),
                classes: model.classes.clone(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, ds.target_names.clone())),
            target_names: ds.target_names.clone(),
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::RandomForest.file_stem(), record)?;
        Ok(score)

    }

    fn kmeans(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        // clustering uses the full dataset, no split
        let train = &settings.train;
        let ds = datasets::load_dataset("iris", &settings.data_dir)?;
        let (_scaler, x_scaled) = StandardScaler::fit_transform(&ds.x);

        let model = KMeans::fit(&x_scaled, train.kmeans_n_clusters, train.kmeans_n_init, train.seed);

        let record = ExportRecord {
            kind: ModelKind::Kmeans,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::Kmeans {
                n_clusters: model.n_clusters,
                centroids: to_rows(&model.centroids),
                n_iter: model.n_iter,
            },
            // the sample here is the full unscaled data with fitted labels
            sample_data: Some(SampleData {
                x: to_rows(&ds.x),
                y: None,
                labels: Some(model.labels.clone()),
                feature_names: ds.feature_names.clone(),
                target_names: None,
            }),
            target_names: None,
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::Kmeans.file_stem(), record)?;
        Ok(model.inertia)

    }

    fn knn(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("iris", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let model = KNearestNeighbors::fit(&x_train, &y_train, classes, train.knn_n_neighbors);
        let score = model.score(&x_test, &y_test);

        let record = ExportRecord {
            kind: ModelKind::Knn,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::Knn {
                training_data: to_rows(&model.training_data),
                training_labels: model.training_labels.to_vec(),
                n_neighbors: model.n_neighbors,
                classes: model.classes.clone(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, ds.target_names.clone())),
            target_names: ds.target_names.clone(),
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::Knn.file_stem(), record)?;
        Ok(score)

    }

    fn svm(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("breast_cancer", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let (scaler, x_train_scaled) = StandardScaler::fit_transform(&x_train);
        let model = SvmClassifier::fit(&x_train_scaled, &y_train, classes, train.svm_c, train.seed);
        let score = model.score(&scaler.transform(&x_test), &y_test);

        let record = ExportRecord {
            kind: ModelKind::Svm,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::Svm {
                support_vectors: to_rows(&model.support_vectors),
                dual_coef: vec![model.dual_coef.clone()],
                intercept: vec![model.intercept],
                support: model.support.clone(),
                classes: model.classes.clone(),
                kernel: model.kernel.clone(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, None)),
            target_names: None,
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::Svm.file_stem(), record)?;
        Ok(score)

    }

    fn neural_network(settings: &Settings) -> Result<f32, Box<dyn Error>> {

        let train = &settings.train;
        let ds = datasets::load_dataset("iris", &settings.data_dir)?;
        let (x_train, x_test, y_train, y_test) =
            datasets::train_test_split(&ds.x, &ds.y, train.test_fraction, train.seed);

        let classes = datasets::class_labels(&ds.y);
        let (scaler, x_train_scaled) = StandardScaler::fit_transform(&x_train);
        let model = MlpClassifier::fit(&x_train_scaled, &y_train, classes,
            &train.mlp_hidden_layer_sizes, MLP_LEARNING_RATE, train.mlp_max_iter, train.seed);
        let score = model.score(&scaler.transform(&x_test), &y_test);

        let record = ExportRecord {
            kind: ModelKind::NeuralNetwork,
            dataset: ds.name.clone(),
            feature_names: ds.feature_names.clone(),
            params: ModelParams::NeuralNetwork {
                coefs: model.coefs.iter().map(to_rows).collect(),
                intercepts: model.intercepts.iter().map(|b| b.to_vec()).collect(),
                n_layers: model.n_layers,
                n_outputs: model.n_outputs,
                classes: model.classes.clone(),
                hidden_layer_sizes: model.hidden_layer_sizes.clone(),
            },
            sample_data: Some(Pipeline::sample(&x_test, &y_test, &ds, train, ds.target_names.clone())),
            target_names: ds.target_names.clone(),
        };
        files_handling::save_output(&settings.output_dir, &ModelKind::NeuralNetwork.file_stem(), record)?;
        Ok(score)

    }

}


#[cfg(test)]
mod tests {

    use super::Pipeline;
    use crate::config::{files_handling, Config};
    use serde_json::Value;

    fn settings_for(output_dir: &str) -> crate::config::Settings {
        let args = vec!["model_exporter".to_string()];
        let mut params = Config::new(&args).unwrap().get_params();
        params.output_dir = std::env::temp_dir().join(output_dir).display().to_string();
        params
    }

    fn reload(output_dir: &str, stem: &str) -> Value {
        let path = std::env::temp_dir().join(output_dir).join(stem).display().to_string();
        files_handling::read_input::<Value>(&path).unwrap()
    }

    #[test]
    fn decision_tree_job_exports_required_keys() {
        let params = settings_for("pipeline_dt_test");
        let score = Pipeline::decision_tree(&params).unwrap();
        assert!(score >= 0.8 && score <= 1.0, "implausible accuracy {}", score);

        let json = reload("pipeline_dt_test", "decision_tree_model");
        assert_eq!(json["type"], "decision_tree");
        assert_eq!(json["dataset"], "iris");
        for key in ["children_left", "children_right", "feature", "threshold", "value"] {
            assert!(json["tree_structure"].get(key).is_some(), "missing key {}", key);
        }
        assert!(json["sample_data"]["X"].as_array().unwrap().len() <= 100);
        assert_eq!(json["target_names"][0], "setosa");
        assert_eq!(json["sample_data"]["target_names"][0], "setosa");
    }

    #[test]
    fn logistic_job_sample_data_has_no_target_names() {
        let params = settings_for("pipeline_lr_test");
        let score = Pipeline::logistic_regression(&params).unwrap();
        assert!(score >= 0.8 && score <= 1.0, "implausible accuracy {}", score);

        let json = reload("pipeline_lr_test", "logistic_regression_model");
        assert_eq!(json["type"], "logistic_regression");
        for key in ["coefficients", "intercept", "classes", "scaler_mean", "scaler_scale"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
        // the breast_cancer sample ships only X, y and feature names
        assert!(json["sample_data"].get("X").is_some());
        assert!(json["sample_data"].get("y").is_some());
        assert!(json["sample_data"].get("target_names").is_none());
        assert!(json.get("target_names").is_none());
    }

    #[test]
    fn kmeans_job_exports_centroids_and_labels() {
        let params = settings_for("pipeline_km_test");
        let inertia = Pipeline::kmeans(&params).unwrap();
        assert!(inertia > 0.0);

        let json = reload("pipeline_km_test", "kmeans_model");
        assert_eq!(json["type"], "kmeans");
        assert_eq!(json["n_clusters"], 3);
        assert_eq!(json["centroids"].as_array().unwrap().len(), 3);
        // kmeans samples the full dataset with its fitted labels
        assert_eq!(json["sample_data"]["X"].as_array().unwrap().len(), 150);
        assert_eq!(json["sample_data"]["labels"].as_array().unwrap().len(), 150);
        // no scaler fields on the kmeans record
        assert!(json.get("scaler_mean").is_none());
    }

    #[test]
    fn knn_job_exports_training_partition() {
        let params = settings_for("pipeline_knn_test");
        let score = Pipeline::knn(&params).unwrap();
        assert!(score >= 0.8 && score <= 1.0, "implausible accuracy {}", score);

        let json = reload("pipeline_knn_test", "knn_model");
        assert_eq!(json["type"], "knn");
        assert_eq!(json["n_neighbors"], 5);
        assert_eq!(json["training_data"].as_array().unwrap().len(), 120);
        assert_eq!(json["training_labels"].as_array().unwrap().len(), 120);
    }

    #[test]
    fn jobs_are_deterministic_per_seed() {
        let params_a = settings_for("pipeline_det_a");
        let params_b = settings_for("pipeline_det_b");
        let score_a = Pipeline::decision_tree(&params_a).unwrap();
        let score_b = Pipeline::decision_tree(&params_b).unwrap();
        assert_eq!(score_a, score_b);

        let json_a = reload("pipeline_det_a", "decision_tree_model");
        let json_b = reload("pipeline_det_b", "decision_tree_model");
        assert_eq!(json_a, json_b);
    }

}
