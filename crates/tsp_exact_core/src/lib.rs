//! Exact TSP solving over dense directed distance matrices with the Held-Karp
//! bitmask dynamic program.
//! Includes batch solving on a rayon pool and the JSON request/response layer
//! used by the `tsp-exact` binary.

mod algo;
mod cost;
mod error;
mod io;
pub mod logging;
mod matrix;
mod runner;
mod tour;

pub(crate) use io::options;

pub use algo::batch::solve_batch;
pub use algo::held_karp::{MAX_SOLVER_NODES, solve};
pub use cost::Cost;
pub use error::{Error, ErrorKind, Result};
pub use io::options::{CostType, LogFormat, LogLevel, SolverOptions};
pub use io::request::{Request, RequestBody, RequestDocument};
pub use io::response::{Response, ResponseDocument};
pub use matrix::DistanceMatrix;
pub use runner::run_document;
pub use tour::{Tour, TourMetrics};
