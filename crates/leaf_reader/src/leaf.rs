//! Leaf numbers consulted by feature detection.

/// Highest standard leaf in `eax`, vendor id in `ebx`, `edx`, `ecx`.
pub const VENDOR: u32 = 0x0;

/// Processor info and feature bits.
pub const FEATURES: u32 = 0x1;

/// Structured extended feature flags, addressed with sub-leaf 0.
pub const STRUCTURED_EXTENDED: u32 = 0x7;

/// Highest extended leaf in `eax`.
pub const EXTENDED_MAX: u32 = 0x8000_0000;

/// Extended processor info and feature bits.
pub const EXTENDED_FEATURES: u32 = 0x8000_0001;

/// The three leaves holding the 48 byte processor brand string, in order.
pub const BRAND: [u32; 3] = [0x8000_0002, 0x8000_0003, 0x8000_0004];

/// Last leaf of the brand string.
pub const BRAND_LAST: u32 = BRAND[2];
