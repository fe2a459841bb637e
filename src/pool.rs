//! A single-size-class arena: bump-allocates fixed-size slots out of
//! `block_size`-aligned blocks obtained from the system allocator, and
//! recycles released slots through a lock-free [`FreeList`].

use std::ptr::NonNull;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, error};

use crate::align;
use crate::block::BlockHeader;
use crate::error::PoolError;
use crate::freelist::FreeList;

const GROW_RETRIES: u32 = 10;

/// State mutated only while holding the block-growth mutex: the block list
/// and the bump-allocation cursor within its head block.
struct Growth {
  first_block: *mut BlockHeader,
  cur_slot: *mut u8,
  last_slot: *mut u8,
}

// SAFETY: `Growth` is only ever touched through `SlabPool`'s growth mutex.
unsafe impl Send for Growth {}

/// A single-size-class slab pool.
///
/// Construct with [`SlabPool::new`], then call [`SlabPool::init`] exactly
/// once (before the pool is shared across threads) to fix its slot size.
/// `init` takes `&mut self` specifically so the borrow checker enforces that
/// ordering: a `SlabPool` cannot be `allocate`d against until it has been
/// released from exclusive access.
pub struct SlabPool {
  block_size: usize,
  slot_size: usize,
  growth: Mutex<Growth>,
  free_list: FreeList,
  block_cnt: AtomicUsize,
  free_slot_cnt: AtomicUsize,
}

impl SlabPool {
  /// Creates a pool that will carve `block_size`-aligned blocks into slots.
  /// No backing memory is acquired yet.
  pub fn new(block_size: usize) -> Self {
    Self {
      block_size,
      slot_size: 0,
      growth: Mutex::new(Growth {
        first_block: std::ptr::null_mut(),
        cur_slot: std::ptr::null_mut(),
        last_slot: std::ptr::null_mut(),
      }),
      free_list: FreeList::new(),
      block_cnt: AtomicUsize::new(0),
      free_slot_cnt: AtomicUsize::new(0),
    }
  }

  /// Fixes the slot size for this pool, clamping it up to at least a
  /// pointer's width so a free slot's first word can host the free-list link.
  ///
  /// Must be called exactly once, before any `allocate`/`deallocate` and
  /// before the pool is shared; the `&mut self` receiver makes violating
  /// that ordering a compile error rather than documented UB.
  pub fn init(&mut self, slot_size: usize) {
    self.slot_size = slot_size.max(size_of::<usize>());
  }

  /// Allocates one slot, or `None` if the system allocator is exhausted.
  ///
  /// The returned region is exactly `slot_size` bytes, aligned to at least
  /// `slot_size`. Its contents are unspecified.
  pub fn allocate(&self) -> Option<NonNull<u8>> {
    self.try_allocate().ok()
  }

  /// Allocates one slot, or `Err(PoolError::BlockGrowthExhausted)` if growing
  /// the pool by one block failed against the system allocator.
  ///
  /// Equivalent to [`SlabPool::allocate`] except that callers who want the
  /// reason for a failed allocation, rather than a bare `None`, can use this
  /// instead.
  pub fn try_allocate(&self) -> Result<NonNull<u8>, PoolError> {
    if let Some(ptr) = unsafe { self.free_list.pop() } {
      self.free_slot_cnt.fetch_add(1, Ordering::Relaxed);
      return Ok(ptr);
    }

    let mut growth = self.growth.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if growth.first_block.is_null() || growth.cur_slot >= growth.last_slot {
      self.grow_one_block(&mut growth)?;
    }

    let ptr = growth.cur_slot;
    growth.cur_slot = unsafe { growth.cur_slot.add(self.slot_size) };
    // SAFETY: bump-allocated slots are always non-null.
    Ok(unsafe { NonNull::new_unchecked(ptr) })
  }

  /// Returns `ptr` to the free-list for reuse by a future `allocate`.
  ///
  /// `ptr` must have been returned by this same pool; the pool performs no
  /// validation (mismatched-pool release is a caller contract violation, not
  /// a detected error, per the crate's overall UB-by-contract policy).
  pub fn deallocate(&self, ptr: NonNull<u8>) {
    unsafe { self.free_list.push(ptr) };
  }

  /// Cumulative count of successful block acquisitions. Monotonically
  /// non-decreasing for the pool's lifetime.
  pub fn block_count(&self) -> usize {
    self.block_cnt.load(Ordering::Relaxed)
  }

  /// Cumulative count of slots recycled from the free-list. Increments on
  /// `pop`, not on `push`: a slot counts as "freed and reused" only once it
  /// has actually been handed back out.
  pub fn free_slot_count(&self) -> usize {
    self.free_slot_cnt.load(Ordering::Relaxed)
  }

  /// Acquires one new block and rolls the bump cursor onto it. Retries up to
  /// [`GROW_RETRIES`] times against the system allocator before giving up.
  fn grow_one_block(&self, growth: &mut Growth) -> Result<(), PoolError> {
    let mut raw: *mut u8 = std::ptr::null_mut();
    let mut attempts = 0u32;
    while attempts < GROW_RETRIES {
      attempts += 1;
      let mut out: *mut libc::c_void = std::ptr::null_mut();
      let rc = unsafe { libc::posix_memalign(&mut out, self.block_size, self.block_size) };
      if rc == 0 && !out.is_null() {
        raw = out as *mut u8;
        break;
      }
    }
    if raw.is_null() {
      error!(attempts, block_size = self.block_size, "block growth exhausted retry budget");
      return Err(PoolError::BlockGrowthExhausted { attempts });
    }

    let header = unsafe { BlockHeader::write_at(raw, growth.first_block) };
    growth.first_block = header;

    let payload_start = BlockHeader::payload_start(header);
    let padding = align::slot_padding(payload_start as usize, self.slot_size);
    growth.cur_slot = unsafe { payload_start.add(padding) };
    growth.last_slot = unsafe { raw.add(self.block_size - self.slot_size + 1) };

    let block_cnt = self.block_cnt.fetch_add(1, Ordering::Relaxed) + 1;
    debug!(block_cnt, slot_size = self.slot_size, block_size = self.block_size, "grew pool by one block");
    Ok(())
  }
}

impl Drop for SlabPool {
  fn drop(&mut self) {
    let growth = self.growth.get_mut().unwrap_or_else(|poisoned| poisoned.into_inner());
    let mut block = growth.first_block;
    while !block.is_null() {
      let next = unsafe { (*block).next };
      unsafe { libc::free(block as *mut libc::c_void) };
      block = next;
    }
  }
}

// SAFETY: all mutable state lives either behind the growth mutex or behind
// the lock-free free-list; there is no other aliasing path to pool internals.
unsafe impl Send for SlabPool {}
unsafe impl Sync for SlabPool {}
