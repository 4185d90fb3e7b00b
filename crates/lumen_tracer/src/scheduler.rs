//! Parallel row scheduling.
//!
//! Every row is its own unit of work on a rayon pool. Idle workers steal
//! the next unclaimed rows, so faster workers simply take more of them.
//! Rows are disjoint slices of the buffer: each one is claimed exactly
//! once and only its claimant writes to it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;

use crate::error::RenderError;

/// Rows claimed by each worker, indexed by worker.
pub type RowClaims = Vec<Vec<usize>>;

pub struct RowScheduler {
    workers: usize,
}

impl RowScheduler {
    /// Scheduler with `workers` threads (at least one).
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `render_row(y, row)` once for every row of a row-major buffer.
    ///
    /// Blocks until every row is done and all workers have finished.
    pub fn run<T, F>(
        &self,
        pixels: &mut [T],
        width: usize,
        render_row: F,
    ) -> Result<RowClaims, RenderError>
    where
        T: Send,
        F: Fn(usize, &mut [T]) + Sync,
    {
        if width == 0 || pixels.is_empty() {
            return Ok(vec![Vec::new(); self.workers]);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("lumen-row-{i}"))
            .build()?;

        let height = pixels.len().div_ceil(width);
        let progress_step = (height / 10).max(1);
        let finished = AtomicUsize::new(0);

        // One list per worker, only ever locked by that worker
        let claims: Vec<Mutex<Vec<usize>>> =
            (0..self.workers).map(|_| Mutex::new(Vec::new())).collect();

        pool.install(|| {
            pixels
                .par_chunks_mut(width)
                .enumerate()
                .with_max_len(1)
                .for_each(|(y, row)| {
                    render_row(y, row);

                    let worker = rayon::current_thread_index().unwrap_or(0);
                    claims[worker]
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(y);

                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    if done % progress_step == 0 {
                        let percent = done * 100 / height;
                        log::info!("Progress: {}% ({} of {} rows)", percent, done, height);
                    }
                });
        });

        let claims: RowClaims = claims
            .into_iter()
            .map(|claim| claim.into_inner().unwrap_or_else(PoisonError::into_inner))
            .collect();
        for (worker, rows) in claims.iter().enumerate() {
            log::debug!("Worker {} finished after {} rows", worker, rows.len());
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_row_claimed_once() {
        let (width, height) = (7, 53);
        let mut pixels = vec![0usize; width * height];

        let claims = RowScheduler::new(4)
            .run(&mut pixels, width, |y, row| {
                for cell in row.iter_mut() {
                    *cell += y + 1;
                }
            })
            .unwrap();

        assert_eq!(claims.len(), 4);
        let mut all: Vec<usize> = claims.into_iter().flatten().collect();
        all.sort_unstable();
        assert_eq!(all, (0..height).collect::<Vec<_>>());

        // Each pixel written exactly once, with its own row's value
        for (i, &value) in pixels.iter().enumerate() {
            assert_eq!(value, i / width + 1);
        }
    }

    #[test]
    fn test_more_workers_than_rows() {
        let mut pixels = vec![0u8; 3 * 2];
        let claims = RowScheduler::new(8)
            .run(&mut pixels, 3, |_, row| row.fill(1))
            .unwrap();

        assert_eq!(claims.iter().map(Vec::len).sum::<usize>(), 2);
        assert!(pixels.iter().all(|&p| p == 1));
    }

    #[test]
    fn test_empty_buffer() {
        let mut pixels: Vec<u8> = Vec::new();
        let claims = RowScheduler::new(0).run(&mut pixels, 4, |_, _| {}).unwrap();
        assert_eq!(claims, vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_single_worker_takes_rows_in_order() {
        let mut pixels = vec![0u32; 5 * 9];
        let claims = RowScheduler::new(1)
            .run(&mut pixels, 5, |y, row| row.fill(y as u32))
            .unwrap();

        assert_eq!(claims, vec![(0..9).collect::<Vec<_>>()]);
        assert_eq!(pixels[5 * 8], 8);
    }

    #[test]
    fn test_ragged_final_row() {
        // 10 cells at width 4: two full rows and a final row of two
        let mut pixels = vec![0usize; 10];
        let claims = RowScheduler::new(3)
            .run(&mut pixels, 4, |y, row| {
                let len = row.len();
                row.fill(len * 10 + y);
            })
            .unwrap();

        assert_eq!(claims.iter().map(Vec::len).sum::<usize>(), 3);
        assert_eq!(&pixels[8..], &[22, 22]);
        assert_eq!(pixels[0], 40);
    }
}
