//! Parallel execution infrastructure.
//!
//! Both expensive phases fan out over rayon and merge sequentially:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Janus::build                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Phase 1 (Parallel):    par_iter() bridge per file/artifact │
//! │  Phase 2 (Sequential):  sort drafts, merge, assign ids      │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     Janus::find_usages                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Phase 1 (Parallel):    par_iter() resolve tokens per file  │
//! │  Phase 2 (Sequential):  aggregate in corpus order           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every parallel map checks the [`CancellationToken`] before each item, so a
//! cancelled run stops within one item per worker. Results keep input order.

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};

/// Build a dedicated pool, or `None` to use rayon's global pool.
///
/// # Errors
///
/// Returns `Error::Config` if the pool cannot be created.
pub(crate) fn build_pool(threads: Option<usize>) -> Result<Option<ThreadPool>> {
    let Some(threads) = threads else {
        return Ok(None);
    };
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("janus-worker-{i}"))
        .build()
        .map(Some)
        .map_err(|e| Error::Config(format!("cannot start {threads} worker threads: {e}")))
}

/// Run `op` inside `pool` when one is configured.
pub(crate) fn install<R, F>(pool: Option<&ThreadPool>, op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Map `items` in parallel, preserving order, honoring cancellation.
///
/// # Errors
///
/// Returns `Error::Cancelled` if the token was cancelled before or during the
/// map. Partial results are dropped.
pub(crate) fn par_map_checked<T, R, F>(
    items: &[T],
    cancel: &CancellationToken,
    f: F,
) -> Result<Vec<R>>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    cancel.check()?;
    let results = items
        .par_iter()
        .enumerate()
        .map(|(i, item)| {
            cancel.check()?;
            Ok(f(i, item))
        })
        .collect::<Result<Vec<R>>>()?;
    cancel.check()?;
    Ok(results)
}
