//! Reconciles leaf `0x1` with leaf `0x8000_0001` on AMD processors.
//!
//! AMD mirrors a number of the classic `edx` feature bits in the extended
//! leaf and reports them more reliably there. Only the ranges below are
//! taken over, every other bit of leaf `0x1` is kept as reported.

/// Bits 0 through 8, `fpu` to `cx8`.
const LOW: u32 = (1 << 9) - 1;

/// Bits 12 through 16, `mtrr` to `pat`.
const MIDDLE: u32 = ((1 << 17) - 1) ^ ((1 << 12) - 1);

/// Bit 24, `fxsr`.
const FXSR: u32 = 1 << 24;

/// The bits of leaf `0x1` `edx` replaced by leaf `0x8000_0001` `edx`.
pub const AMD_OVERLAY_MASK: u32 = LOW | MIDDLE | FXSR;

const _: () = assert!(AMD_OVERLAY_MASK == 0x0101_F1FF);

/// Returns `leaf1_edx` with the overlay ranges copied from `extended_edx`.
pub const fn apply(leaf1_edx: u32, extended_edx: u32) -> u32 {
    (leaf1_edx & !AMD_OVERLAY_MASK) | (extended_edx & AMD_OVERLAY_MASK)
}
