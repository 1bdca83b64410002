//! # Composition combinators.
//!
//! Each combinator merges one or more [`AsyncTask`](crate::AsyncTask)s into a single
//! derived task. Constituents are adopted by the composite, so cancelling the
//! composite cancels every pending constituent, recursively through nested
//! combinators.
//!
//! | Strategy                     | Functions                                | Resolves                                   |
//! |------------------------------|------------------------------------------|--------------------------------------------|
//! | Sequential-Dependent         | [`switch_map`], [`map`], [`try_map`]     | with the second task's value               |
//! | Parallel-Independent-All     | [`join_all`], [`join2`]                  | once, after every source resolved          |
//! | Parallel-Independent-Latest  | [`combine_latest`], [`combine_latest_tasks`] | on every emission once all have emitted |
//!
//! ## Choosing a strategy
//! - A later fetch needs an earlier fetch's result → `switch_map`.
//! - Two independent values are both needed once → `join2` / `join_all`.
//!   Do not chain independent lookups with `switch_map`: it invents an ordering
//!   between unrelated data paths.
//! - Sources re-emit over time → `combine_latest`.
//!
//! All combinators fail fast on the first constituent failure.

mod all;
mod latest;
mod sequential;

pub use all::{join2, join_all};
pub use latest::{Latest, combine_latest, combine_latest_tasks};
pub use sequential::{map, switch_map, try_map};
