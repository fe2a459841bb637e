//! Size-class dispatch: routes a byte size to one of `K` [`SlabPool`]s, or to
//! a passthrough system-allocator path for sizes beyond the largest pool.
//!
//! The `K` pools are owned by one explicitly constructed `SizeRouter` rather
//! than held behind a lazily-initialized global, so there is no implicit
//! process-wide singleton to reason about.

use std::ptr::NonNull;

use tracing::debug;

use crate::config::SizeClassConfig;
use crate::error::PoolError;
use crate::pool::SlabPool;

/// Owns one [`SlabPool`] per size class and dispatches allocation requests
/// to the right one (or to the system allocator, for oversize requests).
///
/// There is no process-wide lazy singleton here: callers construct one
/// `SizeRouter` (typically wrapped in an `Arc` for cross-thread sharing) and
/// it owns its pools for as long as it lives.
pub struct SizeRouter {
  cfg: SizeClassConfig,
  pools: Box<[SlabPool]>,
}

impl SizeRouter {
  /// Builds a router with the reference configuration (`S = 8`, `K = 64`,
  /// `B = 4096`). Cannot fail: the default configuration is asserted valid
  /// at compile time.
  pub fn new() -> Self {
    Self::with_config(SizeClassConfig::default()).expect("default SizeClassConfig is always valid")
  }

  /// Builds a router with a caller-supplied configuration, validating it
  /// first.
  pub fn with_config(cfg: SizeClassConfig) -> Result<Self, PoolError> {
    cfg.validate()?;
    let pools = (0..cfg.num_classes)
      .map(|i| {
        let mut pool = SlabPool::new(cfg.block_size);
        pool.init((i + 1) * cfg.slot_base);
        pool
      })
      .collect::<Vec<_>>()
      .into_boxed_slice();
    Ok(Self { cfg, pools })
  }

  /// Allocates `n` bytes, or `None` for a zero-size request or system
  /// allocator exhaustion. Requests larger than `max_pooled_size()` are
  /// forwarded directly to the system allocator (passthrough); the caller
  /// must release such a pointer with `deallocate(ptr, n)` using the same
  /// `n`.
  pub fn allocate(&self, n: usize) -> Option<NonNull<u8>> {
    if n == 0 {
      return None;
    }
    if n > self.cfg.max_pooled_size() {
      return self.allocate_passthrough(n);
    }
    let idx = (n - 1) / self.cfg.slot_base;
    self.pools[idx].allocate()
  }

  /// Allocates `n` bytes, surfacing the reason for failure instead of a bare
  /// `None`. A zero-size request or an oversize passthrough failure is still
  /// reported as `None` from the caller's point of view by [`Self::allocate`];
  /// this variant exists for callers who want to distinguish "system
  /// allocator exhausted during pooled block growth" from other `None`s.
  pub fn try_allocate(&self, n: usize) -> Result<Option<NonNull<u8>>, PoolError> {
    if n == 0 || n > self.cfg.max_pooled_size() {
      return Ok(self.allocate(n));
    }
    let idx = (n - 1) / self.cfg.slot_base;
    self.pools[idx].try_allocate().map(Some)
  }

  /// Releases a region previously obtained from `allocate(n)` with the same
  /// `n`. A mismatched `n` is undefined behavior by contract; it is not
  /// detected.
  pub fn deallocate(&self, ptr: Option<NonNull<u8>>, n: usize) {
    let Some(ptr) = ptr else { return };
    if n == 0 {
      return;
    }
    if n > self.cfg.max_pooled_size() {
      self.deallocate_passthrough(ptr, n);
      return;
    }
    let idx = (n - 1) / self.cfg.slot_base;
    self.pools[idx].deallocate(ptr);
  }

  /// Sum of every pool's block count.
  pub fn block_count(&self) -> usize {
    self.pools.iter().map(SlabPool::block_count).sum()
  }

  /// Sum of every pool's cumulative free-list pop count.
  pub fn free_slot_count(&self) -> usize {
    self.pools.iter().map(SlabPool::free_slot_count).sum()
  }

  /// Largest request size still routed to a pool; see
  /// [`SizeClassConfig::max_pooled_size`].
  pub fn max_pooled_size(&self) -> usize {
    self.cfg.max_pooled_size()
  }

  fn allocate_passthrough(&self, n: usize) -> Option<NonNull<u8>> {
    let rounded = round_for_aligned_alloc(n);
    let ptr = unsafe { libc::aligned_alloc(rounded, rounded) } as *mut u8;
    debug!(n, rounded, "oversize passthrough allocation");
    NonNull::new(ptr)
  }

  fn deallocate_passthrough(&self, ptr: NonNull<u8>, n: usize) {
    debug!(n, "oversize passthrough deallocation");
    unsafe { libc::free(ptr.as_ptr() as *mut libc::c_void) };
  }
}

impl Default for SizeRouter {
  fn default() -> Self {
    Self::new()
  }
}

/// Rounds `n` up so it is legal to pass as both size and alignment to
/// `aligned_alloc`: a power of two that is also a multiple of
/// `size_of::<usize>()`.
fn round_for_aligned_alloc(n: usize) -> usize {
  let min = size_of::<usize>();
  n.max(min).next_power_of_two()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_size_allocate_returns_none() {
    let router = SizeRouter::new();
    assert!(router.allocate(0).is_none());
  }

  #[test]
  fn basic_reuse_within_a_size_class() {
    let router = SizeRouter::new();
    let a = router.allocate(16).unwrap();
    router.deallocate(Some(a), 16);
    let b = router.allocate(16).unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn null_deallocate_is_a_noop() {
    let router = SizeRouter::new();
    router.deallocate(None, size_of::<usize>());
  }

  #[test]
  fn oversize_passthrough_round_trips() {
    let router = SizeRouter::new();
    let n = router.max_pooled_size() + 1;
    let ptr = router.allocate(n).unwrap();
    router.deallocate(Some(ptr), n);
    assert_eq!(router.block_count(), 0, "passthrough must not touch any pool");
  }

  #[test]
  fn oversize_passthrough_yields_distinct_pointers() {
    let router = SizeRouter::new();
    let n = router.max_pooled_size() + 1;
    let a = router.allocate(n).unwrap();
    let b = router.allocate(n).unwrap();
    assert_ne!(a, b);
    router.deallocate(Some(a), n);
    router.deallocate(Some(b), n);
  }

  #[test]
  fn dispatch_picks_the_expected_pool_index() {
    let router = SizeRouter::new();
    // n = 1..=S routes to pool 0, n = S+1..=2S routes to pool 1, etc.
    let a = router.allocate(1).unwrap();
    let b = router.allocate(crate::config::S).unwrap();
    // Both should come from pool 0 (slot_size = S); reusing after freeing
    // both should hand back the same two addresses in LIFO order.
    router.deallocate(Some(a), 1);
    router.deallocate(Some(b), crate::config::S);
    let c = router.allocate(1).unwrap();
    let d = router.allocate(1).unwrap();
    assert_eq!(c, b);
    assert_eq!(d, a);
  }

  #[test]
  fn diagnostic_sums_reflect_all_pools() {
    let router = SizeRouter::new();
    for size in [8usize, 16, 64, 256, 512] {
      let ptr = router.allocate(size).unwrap();
      router.deallocate(Some(ptr), size);
    }
    assert!(router.block_count() >= 5);
    // Each size above landed in a distinct pool and was freed once, but never
    // popped back out yet, so no pool has counted a pop.
    assert_eq!(router.free_slot_count(), 0);

    // Reallocating each size now pops the slot just freed, one pop per pool.
    for size in [8usize, 16, 64, 256, 512] {
      let ptr = router.allocate(size).unwrap();
      router.deallocate(Some(ptr), size);
    }
    assert_eq!(router.free_slot_count(), 5);
  }

  #[test]
  fn try_allocate_round_trips_like_allocate() {
    let router = SizeRouter::new();
    let a = router.try_allocate(16).unwrap().unwrap();
    router.deallocate(Some(a), 16);
    let b = router.try_allocate(16).unwrap().unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn rejects_invalid_config_before_constructing_pools() {
    let cfg = SizeClassConfig { slot_base: 0, ..SizeClassConfig::default() };
    assert!(SizeRouter::with_config(cfg).is_err());
  }

  #[test]
  fn smaller_custom_config_behaves_like_the_default() {
    let cfg = SizeClassConfig { slot_base: 8, num_classes: 4, block_size: 256 };
    let router = SizeRouter::with_config(cfg).unwrap();
    assert_eq!(router.max_pooled_size(), 32);
    let a = router.allocate(32).unwrap();
    router.deallocate(Some(a), 32);
    let b = router.allocate(32).unwrap();
    assert_eq!(a, b);
  }
}
