//! Row-wise dispatch for per-pixel passes, optionally across rayon workers.
//!
//! Each closure invocation owns one output row, so rows never race. Results
//! do not depend on `parallel`.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Runs `f(y, row)` over every row of a `width`-wide grid and sums the returns.
pub(crate) fn map_rows<A, F>(data: &mut [A], width: usize, parallel: bool, f: F) -> usize
where
    A: Send,
    F: Fn(usize, &mut [A]) -> usize + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        if parallel {
            return data
                .par_chunks_mut(width)
                .enumerate()
                .map(|(y, row)| f(y, row))
                .sum();
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    data.chunks_mut(width)
        .enumerate()
        .map(|(y, row)| f(y, row))
        .sum()
}

/// Like [`map_rows`] over two grids of equal shape walked in lock-step.
pub(crate) fn map_row_pairs<A, B, F>(
    first: &mut [A],
    second: &mut [B],
    width: usize,
    parallel: bool,
    f: F,
) -> usize
where
    A: Send,
    B: Send,
    F: Fn(usize, &mut [A], &mut [B]) -> usize + Sync + Send,
{
    debug_assert_eq!(first.len(), second.len());
    #[cfg(feature = "rayon")]
    {
        if parallel {
            return first
                .par_chunks_mut(width)
                .zip(second.par_chunks_mut(width))
                .enumerate()
                .map(|(y, (a, b))| f(y, a, b))
                .sum();
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    first
        .chunks_mut(width)
        .zip(second.chunks_mut(width))
        .enumerate()
        .map(|(y, (a, b))| f(y, a, b))
        .sum()
}
