use crate::{Cost, DistanceMatrix, Error, Result, Tour};

/// Largest node count the bitmask tables can address.
pub const MAX_SOLVER_NODES: usize = 30;

const START: usize = 0;
const ERR_EMPTY_MATRIX: &str = "Empty distance matrix";

/// DP state tables indexed by `(mask, last)`.
///
/// `cost[mask][last]` is the cheapest walk from node 0 through exactly the
/// nodes of `mask` ending at `last`; `None` means the state was never reached.
struct HeldKarpTables<C> {
    n: usize,
    cost: Vec<Option<C>>,
    parent: Vec<Option<u8>>,
    /// Set when a candidate sum left the cost type's range and was dropped.
    overflowed: bool,
}

impl<C: Cost> HeldKarpTables<C> {
    fn new(n: usize) -> Self {
        let states = (1_usize << n) * n;
        let mut tables = Self {
            n,
            cost: vec![None; states],
            parent: vec![None; states],
            overflowed: false,
        };
        let base = tables.idx(1 << START, START);
        tables.cost[base] = Some(C::zero());
        tables
    }

    #[inline(always)]
    fn idx(&self, mask: usize, node: usize) -> usize {
        mask * self.n + node
    }

    fn full_mask(&self) -> usize {
        (1 << self.n) - 1
    }

    /// Forward pass over masks in increasing order. A mask only grows by
    /// adding bits, so every source state is final before it is read.
    ///
    /// A candidate that overflows is dropped like an absent edge.
    fn fill(&mut self, matrix: &DistanceMatrix<C>) {
        let n = self.n;

        // Odd masks are exactly the ones containing node 0; the rest are never reached.
        for mask in (1..=self.full_mask()).step_by(2) {
            for pos in 0..n {
                if mask & (1 << pos) == 0 {
                    continue;
                }
                let Some(reached) = self.cost[self.idx(mask, pos)] else {
                    continue;
                };

                for (city, edge) in matrix.row(pos).iter().enumerate() {
                    if mask & (1 << city) != 0 {
                        continue;
                    }
                    let Some(edge) = *edge else {
                        continue;
                    };

                    let Some(candidate) = reached.checked_add(edge) else {
                        self.overflowed = true;
                        continue;
                    };
                    let next = self.idx(mask | (1 << city), city);
                    if self.cost[next].is_none_or(|best| candidate < best) {
                        self.cost[next] = Some(candidate);
                        self.parent[next] = Some(pos as u8);
                    }
                }
            }
        }
    }

    /// Picks the cheapest way back to the start. Ties keep the lowest node.
    fn close(&mut self, matrix: &DistanceMatrix<C>) -> Option<(usize, C)> {
        let full = self.full_mask();
        let mut best: Option<(usize, C)> = None;

        for last in (0..self.n).filter(|&node| node != START) {
            let Some(reached) = self.cost[self.idx(full, last)] else {
                continue;
            };
            let Some(back) = matrix.get(last, START) else {
                continue;
            };

            let Some(total) = reached.checked_add(back) else {
                self.overflowed = true;
                continue;
            };
            if best.is_none_or(|(_, cost)| total < cost) {
                best = Some((last, total));
            }
        }

        best
    }

    fn reconstruct(&self, last: usize) -> Vec<usize> {
        let mut path = Vec::with_capacity(self.n + 1);
        let mut mask = self.full_mask();
        let mut node = Some(last);

        while let Some(current) = node {
            path.push(current);
            node = self.parent[self.idx(mask, current)].map(usize::from);
            mask &= !(1 << current);
        }

        path.reverse();
        path.push(START);
        path
    }

    fn reached_terminals(&self) -> usize {
        let full = self.full_mask();
        (0..self.n)
            .filter(|&node| self.cost[self.idx(full, node)].is_some())
            .count()
    }
}

/// Exact minimum-cost closed tour from node 0 (Held-Karp, O(n²·2ⁿ)).
///
/// # Errors
/// - [`Error::InvalidInput`] for an empty matrix.
/// - [`Error::TooManyNodes`] above [`MAX_SOLVER_NODES`].
/// - [`Error::NoSolution`] when no Hamiltonian cycle uses only present edges.
/// - [`Error::CostOverflow`] when a dropped out-of-range sum could have mattered:
///   every complete tour overflows, or the matrix has negative edges that could
///   have brought an overflowed partial sum back into range.
#[tsp_exact_derive::timer("held_karp")]
pub fn solve<C: Cost>(matrix: &DistanceMatrix<C>) -> Result<Tour<C>> {
    let n = matrix.len();
    if n == 0 {
        return Err(Error::invalid_input(ERR_EMPTY_MATRIX));
    }
    if n > MAX_SOLVER_NODES {
        return Err(Error::TooManyNodes {
            nodes: n,
            max: MAX_SOLVER_NODES,
        });
    }

    let mut tables = HeldKarpTables::new(n);
    log::debug!(
        "held_karp: start n={n} states={} symmetric={}",
        tables.cost.len(),
        matrix.is_symmetric()
    );

    tables.fill(matrix);
    let closed = tables.close(matrix);
    if tables.overflowed && (closed.is_none() || matrix.has_negative_edge()) {
        return Err(Error::CostOverflow);
    }
    let Some((last, distance)) = closed else {
        log::debug!(
            "held_karp: no tour n={n} reached_terminals={}",
            tables.reached_terminals()
        );
        return Err(Error::NoSolution);
    };
    let path = tables.reconstruct(last);

    log::debug!("held_karp: done n={n} distance={distance} last={last}");
    Ok(Tour::new(distance, path))
}
