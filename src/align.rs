/// Rounds `value` up to the nearest multiple of `mem::size_of::<usize>()`.
///
/// Used to round oversize passthrough requests up to a pointer-word multiple
/// before they are handed to the system allocator as both size and alignment.
///
/// # Examples
///
/// ```rust
/// use std::mem;
/// use slabpool::align;
///
/// match mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + mem::size_of::<usize>() - 1) & !(mem::size_of::<usize>() - 1)
  };
}

/// Padding needed to advance `addr` up to a multiple of `slot_size`.
///
/// When `addr` is already a multiple of `slot_size` this returns `slot_size`
/// itself — a full slot of padding — rather than zero. The pool's block-count
/// accounting is derived against this exact formula, so it is intentional.
#[inline]
pub fn slot_padding(addr: usize, slot_size: usize) -> usize {
  slot_size - (addr % slot_size)
}

#[cfg(test)]
mod tests {
  use std::mem;

  #[test]
  fn test_align() {
    let ptr_size = mem::size_of::<usize>();

    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (ptr_size * i + 1)..=(ptr_size * (i + 1));

      let expected_alignment = ptr_size * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align!(size));
      }
    }
  }

  #[test]
  fn slot_padding_wastes_a_slot_when_already_aligned() {
    assert_eq!(super::slot_padding(128, 64), 64);
    assert_eq!(super::slot_padding(64, 64), 64);
  }

  #[test]
  fn slot_padding_rounds_up_otherwise() {
    assert_eq!(super::slot_padding(65, 64), 63);
    assert_eq!(super::slot_padding(1, 64), 63);
  }
}
