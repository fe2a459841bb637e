//! # slabpool - A Fixed-Size-Class Slab Allocator
//!
//! This crate provides a process-wide **fixed-size-class slab allocator**:
//! a fast, low-fragmentation backing store for small-object allocation and
//! deallocation, meant to sit underneath per-type object creation in a
//! larger application. It returns raw, uninitialized memory — placing and
//! tearing down typed values in that memory is the caller's job.
//!
//! ## Overview
//!
//! A slab allocator trades the flexibility of a general-purpose allocator
//! for speed: by serving only a fixed menu of slot sizes, every allocation
//! either pops a previously-freed slot off a lock-free free-list or bumps a
//! cursor forward within the current backing block.
//!
//! ```text
//!   SizeRouter
//!   ┌─────────────────────────────────────────────────────────────────┐
//!   │  pool[0]  slot=S    pool[1]  slot=2S   ...   pool[K-1] slot=KS   │
//!   │  ┌─────┐            ┌─────┐                  ┌─────┐            │
//!   │  │block│──►block    │block│──►block           │block│──►...     │
//!   │  └─────┘            └─────┘                  └─────┘            │
//!   └─────────────────────────────────────────────────────────────────┘
//!         ▲
//!         │ n > K*S routes straight to the system allocator (passthrough)
//! ```
//!
//! Each pool carves its blocks into fixed-size slots and bump-allocates from
//! the current block until exhausted, at which point it grows by one block:
//!
//! ```text
//!   Block (block_size-aligned, from the system allocator):
//!   ┌────────┬─────────┬─────────┬─────────┬───·····───┐
//!   │ header │ slot 0  │ slot 1  │ slot 2  │    ...     │
//!   │ (link) │         │         │         │            │
//!   └────────┴─────────┴─────────┴─────────┴───·····───┘
//!            ▲
//!            cur_slot bumps forward by slot_size on each allocation
//! ```
//!
//! Freed slots are pushed onto an intrusive, lock-free LIFO: the first word
//! of a free slot stores a link to the next free slot, and the list head is
//! a tagged `(pointer, tag)` pair updated by compare-and-swap so concurrent
//! push/pop never falls prey to the ABA hazard.
//!
//! ## Crate Structure
//!
//! ```text
//!   slabpool
//!   ├── config    - S/K/B size-class constants and SizeClassConfig
//!   ├── error     - PoolError, the ambient typed-error surface
//!   ├── align     - alignment/padding helpers
//!   ├── block     - BlockHeader, the intrusive block link
//!   ├── freelist  - FreeList, the lock-free tagged-pointer LIFO
//!   ├── pool      - SlabPool, one size class's arena
//!   └── router    - SizeRouter, size-class dispatch across K pools
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use slabpool::SizeRouter;
//!
//! let router = SizeRouter::new();
//!
//! let ptr = router.allocate(24).expect("system memory exhausted");
//! unsafe { ptr.as_ptr().write_bytes(0, 24) };
//! router.deallocate(Some(ptr), 24);
//! ```
//!
//! ## Concurrency
//!
//! `SizeRouter` and `SlabPool` are `Send + Sync`: wrap one in an `Arc` to
//! share it across threads. The free-list fast path is always lock-free;
//! block growth is guarded by a per-pool mutex, which is the only blocking
//! point in the allocator.
//!
//! ## Caller contract
//!
//! - `deallocate(ptr, n)` must be called with the same `n` that was passed
//!   to the `allocate` call that produced `ptr`. A mismatched `n` is
//!   undefined behavior; it is not detected.
//! - A pointer must not be deallocated twice, and must not be used after
//!   deallocation.
//! - The allocator does not zero-initialize returned memory and does not
//!   return blocks to the system before the owning pool is dropped.

pub mod align;
mod block;
pub mod config;
pub mod error;
mod freelist;
mod pool;
mod router;

pub use error::PoolError;
pub use pool::SlabPool;
pub use router::SizeRouter;
