use serde::Serialize;

use crate::{Cost, DistanceMatrix, Error, Result};

/// Closed tour starting and ending at node 0, with its total cost.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Tour<C> {
    distance: C,
    path: Vec<usize>,
}

impl<C: Cost> Tour<C> {
    pub fn new(distance: C, path: Vec<usize>) -> Self {
        Self { distance, path }
    }

    pub fn distance(&self) -> C {
        self.distance
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Number of distinct nodes on the tour.
    pub fn nodes(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Sums the legs of the path in order.
    pub fn recompute_distance(&self, matrix: &DistanceMatrix<C>) -> Result<C> {
        self.path.windows(2).try_fold(C::zero(), |acc, leg| {
            let cost = leg_cost(matrix, leg[0], leg[1])?;
            acc.checked_add(cost).ok_or(Error::CostOverflow)
        })
    }

    /// Checks that the path is a closed Hamiltonian cycle of `matrix` from node 0.
    pub fn validate(&self, matrix: &DistanceMatrix<C>) -> Result<()> {
        let n = matrix.len();
        if self.path.len() != n + 1 {
            return Err(Error::invalid_data(format!(
                "tour has {} stops, expected {}",
                self.path.len(),
                n + 1
            )));
        }
        if self.path.first() != Some(&0) || self.path.last() != Some(&0) {
            return Err(Error::invalid_data("tour must start and end at node 0"));
        }

        let mut seen = vec![false; n];
        for &node in &self.path[..n] {
            if node >= n || std::mem::replace(&mut seen[node], true) {
                return Err(Error::invalid_data(format!(
                    "node {node} is out of range or visited twice"
                )));
            }
        }

        self.recompute_distance(matrix).map(|_| ())
    }

    /// Summary of the legs that have an edge in `matrix`.
    pub fn leg_metrics(&self, matrix: &DistanceMatrix<C>) -> TourMetrics {
        let legs: Vec<f64> = self
            .path
            .windows(2)
            .filter_map(|leg| matrix.get(leg[0], leg[1]))
            .map(|cost| cost.as_f64())
            .collect();

        if legs.is_empty() {
            return TourMetrics::default();
        }

        let total: f64 = legs.iter().sum();
        TourMetrics {
            legs: legs.len(),
            longest: legs.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            total,
            average: total / legs.len() as f64,
        }
    }
}

fn leg_cost<C: Cost>(matrix: &DistanceMatrix<C>, from: usize, to: usize) -> Result<C> {
    let n = matrix.len();
    if from >= n || to >= n {
        return Err(Error::invalid_data(format!(
            "leg {from}->{to} is outside a {n}-node matrix"
        )));
    }
    matrix
        .get(from, to)
        .ok_or_else(|| Error::invalid_data(format!("leg {from}->{to} has no edge")))
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TourMetrics {
    pub legs: usize,
    pub longest: f64,
    pub total: f64,
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::Tour;
    use crate::DistanceMatrix;

    fn square() -> DistanceMatrix<i64> {
        DistanceMatrix::from_rows(vec![
            vec![0, 1, 9, 4],
            vec![1, 0, 2, 9],
            vec![9, 2, 0, 3],
            vec![4, 9, 3, 0],
        ])
        .expect("matrix")
    }

    #[test]
    fn recompute_distance_sums_legs_in_order() {
        let tour = Tour::new(10_i64, vec![0, 1, 2, 3, 0]);
        assert_eq!(tour.recompute_distance(&square()).expect("distance"), 10);
        assert_eq!(tour.nodes(), 4);
    }

    #[test]
    fn validate_accepts_closed_permutation() {
        Tour::new(10_i64, vec![0, 1, 2, 3, 0])
            .validate(&square())
            .expect("valid tour");
    }

    #[test]
    fn validate_rejects_repeated_node() {
        let err = Tour::new(10_i64, vec![0, 1, 1, 3, 0])
            .validate(&square())
            .expect_err("repeat should fail");
        assert!(err.to_string().contains("visited twice"));
    }

    #[test]
    fn validate_rejects_open_path_and_wrong_length() {
        assert!(Tour::new(0_i64, vec![0, 1, 2, 3, 1]).validate(&square()).is_err());
        assert!(Tour::new(0_i64, vec![0, 1, 2, 0]).validate(&square()).is_err());
        assert!(Tour::new(0_i64, vec![1, 0, 2, 3, 1]).validate(&square()).is_err());
    }

    #[test]
    fn validate_rejects_missing_leg() {
        let m = DistanceMatrix::from_optional_rows(vec![
            vec![None, Some(1_i64), Some(1)],
            vec![Some(1), None, None],
            vec![Some(1), Some(1), None],
        ])
        .expect("matrix");
        let err = Tour::new(3_i64, vec![0, 1, 2, 0])
            .validate(&m)
            .expect_err("missing edge should fail");
        assert!(err.to_string().contains("1->2 has no edge"));
    }

    #[test]
    fn leg_metrics_reports_longest_and_average() {
        let metrics = Tour::new(10_i64, vec![0, 1, 2, 3, 0]).leg_metrics(&square());
        assert_eq!(metrics.legs, 4);
        assert_eq!(metrics.longest, 4.0);
        assert_eq!(metrics.total, 10.0);
        assert_eq!(metrics.average, 2.5);
    }

    #[test]
    fn leg_metrics_of_an_empty_path_are_zero() {
        let metrics = Tour::new(0_i64, Vec::new()).leg_metrics(&square());
        assert_eq!(metrics.legs, 0);
        assert_eq!(metrics.total, 0.0);
    }

    #[test]
    fn serializes_as_distance_and_path() {
        let json = serde_json::to_string(&Tour::new(80_i64, vec![0, 1, 3, 2, 0])).expect("json");
        assert_eq!(json, r#"{"distance":80,"path":[0,1,3,2,0]}"#);
    }
}
