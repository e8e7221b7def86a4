//! Cooperative yielding for hot loops (§5, §9).
//!
//! The algorithm is logically single-threaded and sequential; the only
//! reason to yield at all is so a resolution over a very large graph does
//! not monopolize the executor. This has no effect on the result.

/// How many loop iterations to run before yielding back to the scheduler.
pub const YIELD_EVERY: usize = 100;

/// Increment `counter`; if it has reached [`YIELD_EVERY`], yield to the
/// executor and reset it to zero.
pub async fn maybe_yield(counter: &mut usize) {
	*counter += 1;
	if *counter >= YIELD_EVERY {
		*counter = 0;
		tokio::task::yield_now().await;
	}
}
