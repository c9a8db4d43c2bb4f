use crate::{Cost, Error, Result};

const ERR_NOT_SQUARE: &str = "Invalid matrix format: must be a square matrix";

/// Dense directed cost matrix stored row-major.
///
/// `None` marks an absent edge. Sentinel values (integer `MAX`, non-finite
/// floats) are normalised to `None` when the matrix is built.
#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix<C> {
    n: usize,
    cells: Vec<Option<C>>,
}

impl<C: Cost> DistanceMatrix<C> {
    pub fn from_rows(rows: Vec<Vec<C>>) -> Result<Self> {
        Self::from_optional_rows(
            rows.into_iter()
                .map(|row| row.into_iter().map(Some).collect())
                .collect(),
        )
    }

    pub fn from_optional_rows(rows: Vec<Vec<Option<C>>>) -> Result<Self> {
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            return Err(Error::invalid_input(ERR_NOT_SQUARE));
        }

        let cells = rows
            .into_iter()
            .flatten()
            .map(|cell| cell.filter(|cost| !cost.is_sentinel()))
            .collect();

        Ok(Self { n, cells })
    }

    pub fn empty() -> Self {
        Self {
            n: 0,
            cells: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Cost of the edge `from -> to`, `None` when absent.
    #[inline(always)]
    pub fn get(&self, from: usize, to: usize) -> Option<C> {
        self.cells[from * self.n + to]
    }

    pub fn row(&self, from: usize) -> &[Option<C>] {
        &self.cells[from * self.n..(from + 1) * self.n]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.n).all(|i| (0..i).all(|j| self.get(i, j) == self.get(j, i)))
    }

    /// Diagonal entries are not edges and are ignored.
    pub fn has_negative_edge(&self) -> bool {
        (0..self.n).any(|i| {
            (0..self.n)
                .filter(|&j| j != i)
                .filter_map(|j| self.get(i, j))
                .any(|cost| cost.is_negative())
        })
    }

    /// Renames node `i` to `order[i]`.
    ///
    /// `order` must be a permutation of `0..n`.
    pub fn relabel(&self, order: &[usize]) -> Result<Self> {
        if order.len() != self.n {
            return Err(Error::invalid_input(format!(
                "relabel order has {} entries, matrix has {} nodes",
                order.len(),
                self.n
            )));
        }
        let mut seen = vec![false; self.n];
        for &node in order {
            if node >= self.n || std::mem::replace(&mut seen[node], true) {
                return Err(Error::invalid_input(format!(
                    "relabel order is not a permutation of 0..{}",
                    self.n
                )));
            }
        }

        let mut cells = vec![None; self.n * self.n];
        for i in 0..self.n {
            for j in 0..self.n {
                cells[order[i] * self.n + order[j]] = self.get(i, j);
            }
        }
        Ok(Self { n: self.n, cells })
    }
}
