

// Lloyd's algorithm with kmeans++ seeding. The fit repeats `n_init` times
// from different seeded initializations and keeps the run with the lowest
// inertia, reporting that run's iteration count.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const MAX_ITER: usize = 300;
const TOL: f32 = 1e-4;

pub struct KMeans {
    pub n_clusters: usize,
    pub centroids: Array2<f32>,
    pub labels: Vec<usize>,
    pub inertia: f32,
    pub n_iter: usize,
}

impl KMeans {

    pub fn fit(x: &Array2<f32>, n_clusters: usize, n_init: usize, seed: u64) -> KMeans {

        assert!(n_clusters > 0, "n_clusters must be positive");
        assert!(x.dim().0 >= n_clusters, "fewer samples than clusters");

        let mut best: Option<KMeans> = None;
        for run in 0..n_init.max(1) {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(run as u64));
            let fitted = KMeans::fit_once(x, n_clusters, &mut rng);
            let better = match &best {
                Some(current) => fitted.inertia < current.inertia,
                None => true
            };
            if better {
                best = Some(fitted);
            }
        }

        best.unwrap()

    }

    fn fit_once(x: &Array2<f32>, n_clusters: usize, rng: &mut StdRng) -> KMeans {

        let n = x.dim().0;
        let mut centroids = KMeans::plus_plus_init(x, n_clusters, rng);
        let mut labels = vec![0usize; n];
        let mut n_iter = 0;

        for iteration in 1..=MAX_ITER {
            n_iter = iteration;

            for (i, row) in x.outer_iter().enumerate() {
                labels[i] = KMeans::nearest(&centroids, &row.to_owned());
            }

            let mut new_centroids: Array2<f32> = Array2::zeros(centroids.dim());
            let mut counts = vec![0.0_f32; n_clusters];
            for (i, row) in x.outer_iter().enumerate() {
                let mut target = new_centroids.row_mut(labels[i]);
                target += &row;
                counts[labels[i]] += 1.0;
            }
            for (k, count) in counts.iter().enumerate() {
                if *count > 0.0 {
                    let mut row = new_centroids.row_mut(k);
                    row /= *count;
                } else {
                    // an emptied cluster keeps its previous centroid
                    new_centroids.row_mut(k).assign(&centroids.row(k));
                }
            }

            let shift: f32 = (&new_centroids - &centroids).mapv(|v| v * v).sum();
            centroids = new_centroids;
            if shift < TOL {
                break
            }
        }

        let inertia: f32 = x.outer_iter().enumerate()
            .map(|(i, row)| KMeans::squared_distance(&row.to_owned(), &centroids.index_axis(Axis(0), labels[i]).to_owned()))
            .sum();

        KMeans {
            n_clusters: n_clusters,
            centroids: centroids,
            labels: labels,
            inertia: inertia,
            n_iter: n_iter,
        }

    }

    // kmeans++: first centroid uniform, the rest sampled proportionally to
    // the squared distance from the nearest chosen centroid
    fn plus_plus_init(x: &Array2<f32>, n_clusters: usize, rng: &mut StdRng) -> Array2<f32> {

        let (n, d) = x.dim();
        let mut centroids: Array2<f32> = Array2::zeros((n_clusters, d));

        let first = rng.gen_range(0..n);
        centroids.row_mut(0).assign(&x.row(first));

        let mut distances: Vec<f32> = x.outer_iter()
            .map(|row| KMeans::squared_distance(&row.to_owned(), &centroids.row(0).to_owned()))
            .collect();

        for k in 1..n_clusters {
            let total: f32 = distances.iter().sum();
            let chosen = if total <= 0.0 {
                rng.gen_range(0..n)
            } else {
                let mut draw = rng.gen::<f32>() * total;
                let mut pick = n - 1;
                for (i, dist) in distances.iter().enumerate() {
                    if draw <= *dist {
                        pick = i;
                        break
                    }
                    draw -= dist;
                }
                pick
            };
            centroids.row_mut(k).assign(&x.row(chosen));

            for (i, row) in x.outer_iter().enumerate() {
                let dist = KMeans::squared_distance(&row.to_owned(), &centroids.row(k).to_owned());
                if dist < distances[i] {
                    distances[i] = dist;
                }
            }
        }

        centroids

    }

    fn squared_distance(a: &Array1<f32>, b: &Array1<f32>) -> f32 {
        (a - b).mapv(|v| v * v).sum()
    }

    fn nearest(centroids: &Array2<f32>, row: &Array1<f32>) -> usize {
        let mut best = 0usize;
        let mut best_dist = f32::INFINITY;
        for (k, centroid) in centroids.outer_iter().enumerate() {
            let dist = KMeans::squared_distance(row, &centroid.to_owned());
            if dist < best_dist {
                best_dist = dist;
                best = k;
            }
        }
        best
    }

    pub fn predict_row(&self, row: &Array1<f32>) -> usize {
        KMeans::nearest(&self.centroids, row)
    }

}


#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{array, Array1, Array2};

    // three tight clusters far apart
    fn clusters() -> Array2<f32> {
        let mut rows: Vec<f32> = Vec::new();
        for center in [0.0_f32, 10.0, 20.0] {
            for i in 0..15 {
                let jitter = (i as f32 * 0.7).sin() * 0.3;
                rows.extend_from_slice(&[center + jitter, center - jitter]);
            }
        }
        Array2::from_shape_vec((45, 2), rows).unwrap()
    }

    #[test]
    fn recovers_separated_clusters() {
        let x = clusters();
        let model = KMeans::fit(&x, 3, 10, 42);

        assert_eq!(model.n_clusters, 3);
        assert_eq!(model.labels.len(), 45);
        assert!(model.n_iter >= 1);

        // every centroid sits close to one of the true centers
        for centroid in model.centroids.outer_iter() {
            let near_truth = [0.0_f32, 10.0, 20.0].iter()
                .any(|c| (centroid[0] - c).abs() < 1.0 && (centroid[1] - c).abs() < 1.0);
            assert!(near_truth, "stray centroid {:?}", centroid);
        }

        // tight clusters give small inertia
        assert!(model.inertia < 45.0 * 0.5);

        // cluster members agree on their label
        for chunk in model.labels.chunks(15) {
            assert!(chunk.iter().all(|l| l == &chunk[0]));
        }
    }

    #[test]
    fn fit_is_deterministic_per_seed() {
        let x = clusters();
        let a = KMeans::fit(&x, 3, 5, 7);
        let b = KMeans::fit(&x, 3, 5, 7);
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.n_iter, b.n_iter);
    }

    #[test]
    fn predict_row_assigns_nearest_centroid() {
        let x = clusters();
        let model = KMeans::fit(&x, 3, 10, 42);
        let label = model.predict_row(&array![10.1_f32, 9.9]);
        let centroid = model.centroids.row(label);
        assert!((centroid[0] - 10.0).abs() < 1.0);
    }

}
