use std::ptr;

/// The intrusive header placed at the base of every backing block.
///
/// A block is a contiguous, `block_size`-aligned region obtained from the
/// system allocator. Its first word links to the previously-acquired block
/// (newest first); everything after the header is carved into fixed-size
/// slots by the owning [`crate::pool::SlabPool`].
#[repr(C)]
pub struct BlockHeader {
  pub next: *mut BlockHeader,
}

impl BlockHeader {
  /// Writes a fresh header at `addr`, linking it in front of `next`.
  ///
  /// # Safety
  /// `addr` must point to at least `size_of::<BlockHeader>()` writable bytes.
  pub unsafe fn write_at(addr: *mut u8, next: *mut BlockHeader) -> *mut BlockHeader {
    let header = addr as *mut BlockHeader;
    unsafe {
      ptr::write(header, BlockHeader { next });
    }
    header
  }

  /// Address immediately following the header, where slot payload begins.
  pub fn payload_start(block: *mut BlockHeader) -> *mut u8 {
    unsafe { (block as *mut u8).add(size_of::<BlockHeader>()) }
  }
}
