pub mod batch;
pub mod held_karp;
