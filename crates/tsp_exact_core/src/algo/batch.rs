use rayon::prelude::*;

use crate::{Cost, DistanceMatrix, Error, Result, Tour, algo::held_karp};

/// Solves independent matrices on a dedicated rayon pool.
///
/// Each solve owns its own tables. Results keep the input order. `threads == 0`
/// lets rayon pick the worker count.
#[tsp_exact_derive::timer("batch")]
pub fn solve_batch<C: Cost>(
    matrices: &[DistanceMatrix<C>],
    threads: usize,
) -> Result<Vec<Result<Tour<C>>>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| Error::other(format!("rayon pool: {e}")))?;

    log::info!(
        "batch: start matrices={} threads={}",
        matrices.len(),
        pool.current_num_threads()
    );

    let results: Vec<Result<Tour<C>>> = pool.install(|| {
        matrices
            .par_iter()
            .enumerate()
            .map(|(idx, matrix)| {
                let result = held_karp::solve(matrix);
                match &result {
                    Ok(tour) => log::debug!(
                        "batch.item: idx={idx} n={} distance={}",
                        matrix.len(),
                        tour.distance()
                    ),
                    Err(err) => log::debug!("batch.item: idx={idx} n={} err={err}", matrix.len()),
                }
                result
            })
            .collect()
    });

    let solved = results.iter().filter(|r| r.is_ok()).count();
    log::info!(
        "batch: complete matrices={} solved={solved}",
        results.len()
    );

    Ok(results)
}
