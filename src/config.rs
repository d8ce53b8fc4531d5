

use serde_json::Value;
use std::{fs, error::Error, fmt::Display};

#[derive(Clone, Debug)]
pub struct TrainSettings {
    pub seed: u64,
    pub test_fraction: f32,
    pub sample_limit: usize,
    pub logistic_max_iter: usize,
    pub tree_max_depth: usize,
    pub forest_n_estimators: usize,
    pub forest_max_depth: usize,
    pub kmeans_n_clusters: usize,
    pub kmeans_n_init: usize,
    pub knn_n_neighbors: usize,
    pub svm_c: f32,
    pub mlp_hidden_layer_sizes: Vec<usize>,
    pub mlp_max_iter: usize,
}

impl Display for TrainSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "training hyper parameters:
        seed: {},
        test_fraction: {},
        sample_limit: {},
        logistic_max_iter: {},
        tree_max_depth: {},
        forest_n_estimators: {},
        forest_max_depth: {},
        kmeans_n_clusters: {},
        kmeans_n_init: {},
        knn_n_neighbors: {},
        svm_c: {},
        mlp_hidden_layer_sizes: {:?},
        mlp_max_iter: {}",
        self.seed, self.test_fraction, self.sample_limit, self.logistic_max_iter, self.tree_max_depth,
        self.forest_n_estimators, self.forest_max_depth, self.kmeans_n_clusters, self.kmeans_n_init,
        self.knn_n_neighbors, self.svm_c, self.mlp_hidden_layer_sizes, self.mlp_max_iter
        )
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub data_dir: String,
    pub output_dir: String,
    pub train: TrainSettings,
}

impl Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        data_dir: {}
        output_dir: {}
        Using training hyper-params: {}",
        self.data_dir, self.output_dir, self.train)
    }
}

pub struct Config {
    params: Settings,
}

impl Config {

    pub fn get_params(&self) -> Settings {
        return self.params.clone()
    }

    /// Builds the settings from the program arguments. With no argument every
    /// key falls back to its default; a single argument must be a path to a
    /// json file overriding any subset of the keys.
    pub fn new(args: &[String]) -> Result<Config, Box<dyn Error>> {

        if args.len() > 2 {
            return Err(format!("input should be a path to a json settings file only").into());
        }

        let json: Value = match args.get(1) {
            Some(path) => {
                let f = fs::File::open(path).expect("cannot open json file");
                serde_json::from_reader(f).expect("cannot read json file")
            },
            None => Value::Object(serde_json::Map::new())
        };

        // handle default vs input parameters
        let data_dir = match json.get("data_dir") {
            Some(data_dir) => data_dir.as_str().expect("panic since given data_dir is not a string").to_owned(),
            None => "data".to_owned()
        };
        let output_dir = match json.get("output_dir") {
            Some(output_dir) => output_dir.as_str().expect("panic since given output_dir is not a string").to_owned(),
            None => "models".to_owned()
        };
        let seed = match json.get("seed") {
            Some(seed) => seed.as_u64().expect("panic since given seed is not numeric"),
            None => 42
        };
        let test_fraction = match json.get("test_fraction") {
            Some(test_fraction) => test_fraction.as_f64().expect("panic since given test_fraction is not numeric"),
            None => 0.2
        };
        let sample_limit = match json.get("sample_limit") {
            Some(sample_limit) => sample_limit.as_i64().expect("panic since given sample_limit is not numeric"),
            None => 100
        };
        let logistic_max_iter = match json.get("logistic_max_iter") {
            Some(v) => v.as_i64().expect("panic since given logistic_max_iter is not numeric"),
            None => 1000
        };
        let tree_max_depth = match json.get("tree_max_depth") {
            Some(v) => v.as_i64().expect("panic since given tree_max_depth is not numeric"),
            None => 4
        };
        let forest_n_estimators = match json.get("forest_n_estimators") {
            Some(v) => v.as_i64().expect("panic since given forest_n_estimators is not numeric"),
            None => 10
        };
        let forest_max_depth = match json.get("forest_max_depth") {
            Some(v) => v.as_i64().expect("panic since given forest_max_depth is not numeric"),
            None => 5
        };
        let kmeans_n_clusters = match json.get("kmeans_n_clusters") {
            Some(v) => v.as_i64().expect("panic since given kmeans_n_clusters is not numeric"),
            None => 3
        };
        let kmeans_n_init = match json.get("kmeans_n_init") {
            Some(v) => v.as_i64().expect("panic since given kmeans_n_init is not numeric"),
            None => 10
        };
        let knn_n_neighbors = match json.get("knn_n_neighbors") {
            Some(v) => v.as_i64().expect("panic since given knn_n_neighbors is not numeric"),
            None => 5
        };
        let svm_c = match json.get("svm_c") {
            Some(v) => v.as_f64().expect("panic since given svm_c is not numeric"),
            None => 1.0
        };
        let mlp_hidden_layer_sizes = match json.get("mlp_hidden_layer_sizes") {
            Some(v) => v.as_array().expect("panic since given mlp_hidden_layer_sizes is not an array")
                .iter().map(|x| x.as_i64().expect("panic since a hidden layer size is not numeric") as usize)
                .collect::<Vec<usize>>(),
            None => vec![10, 5]
        };
        let mlp_max_iter = match json.get("mlp_max_iter") {
            Some(v) => v.as_i64().expect("panic since given mlp_max_iter is not numeric"),
            None => 1000
        };

        let params = Settings {
            data_dir: data_dir,
            output_dir: output_dir,
            train: TrainSettings {
                seed: seed,
                test_fraction: test_fraction as f32,
                sample_limit: sample_limit as usize,
                logistic_max_iter: logistic_max_iter as usize,
                tree_max_depth: tree_max_depth as usize,
                forest_n_estimators: forest_n_estimators as usize,
                forest_max_depth: forest_max_depth as usize,
                kmeans_n_clusters: kmeans_n_clusters as usize,
                kmeans_n_init: kmeans_n_init as usize,
                knn_n_neighbors: knn_n_neighbors as usize,
                svm_c: svm_c as f32,
                mlp_hidden_layer_sizes: mlp_hidden_layer_sizes,
                mlp_max_iter: mlp_max_iter as usize,
            }
        };

        Ok (
            Self {
                params: params
            }
        )
    }

}

pub mod files_handling {

    use serde_json::Value;
    use std::{fs::{self, File}, error::Error, io::{BufWriter, BufReader, Write}};
    use crate::export::ExportRecord;

    pub fn read_input<R: ReadFile>(file_path: &str) -> Result<<R as ReadFile>::Item, <R as ReadFile>::Error> {
        let input = <R as ReadFile>::read_file(file_path)?;
        Ok(input)
    }

    pub fn save_output<S: SaveFile>(output_dir: &str, file_name: &str, item: S) -> Result<(), <S as SaveFile>::Error> {

        // create output folder
        if let Err(e) = fs::create_dir_all(output_dir) {
            panic!("{}", e)
        }

        // SaveFile can be an ExportRecord or generated source text
        item.save_file(output_dir, file_name)?;
        return Ok(())

    }

    pub trait ReadFile {
        type Error;
        type Item;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error>;
    }

    impl ReadFile for Value {
        type Error = Box<dyn Error>;
        type Item = Self;
        fn read_file(file_path: &str) -> Result<Self::Item, Self::Error> {
            let in_file = file_path.to_string() + ".json";
            let f = BufReader::new(File::open(in_file)?);
            let item = serde_json::from_reader(f)?;
            return Ok(item)
        }
    }

    pub trait SaveFile {
        type Error;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error>;
    }

    impl SaveFile for ExportRecord {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".json";
            let f = BufWriter::new(File::create(out)?);
            serde_json::to_writer_pretty(f, self)?;
            return Ok(())
        }
    }

    impl SaveFile for String {
        type Error = Box<dyn Error>;
        fn save_file(&self, output_dir: &str, file_name: &str) -> Result<(), Self::Error> {
            let out = output_dir.to_string() + "/" + file_name + ".js";
            let mut f = BufWriter::new(File::create(out)?);
            f.write_all(self.as_bytes())?;
            f.flush()?;
            return Ok(())
        }
    }

}
