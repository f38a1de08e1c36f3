#![cfg_attr(not(test), no_std)]

//! Execution of single `cpuid` leaves.
//!
//! The [`LeafReader`] trait is the only thing the feature detection code
//! depends on. [`NativeLeafReader`] runs the real instruction, closures of
//! the form `Fn(leaf, subleaf) -> RegisterQuad` can stand in for it.

pub mod leaf;

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(target_env = "sgx")
))]
mod native;

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(target_env = "sgx")
))]
pub use native::NativeLeafReader;

/// The four registers written by one `cpuid` execution.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterQuad {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

impl RegisterQuad {
    pub const fn new(eax: u32, ebx: u32, ecx: u32, edx: u32) -> Self {
        Self { eax, ebx, ecx, edx }
    }

    pub const fn zero() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Returns the registers in `eax`, `ebx`, `ecx`, `edx` order.
    pub const fn to_array(self) -> [u32; 4] {
        [self.eax, self.ebx, self.ecx, self.edx]
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl From<x86::cpuid::CpuIdResult> for RegisterQuad {
    fn from(value: x86::cpuid::CpuIdResult) -> Self {
        Self::new(value.eax, value.ebx, value.ecx, value.edx)
    }
}

/// Something that can answer `cpuid` queries.
///
/// Implementations never fail: leaves the processor does not know about
/// produce whatever the hardware returns for them, usually zeros.
pub trait LeafReader {
    /// Queries `leaf` with `ecx` set to `subleaf`.
    fn query(&self, leaf: u32, subleaf: u32) -> RegisterQuad;

    /// Queries `leaf` at sub-leaf 0.
    fn query_leaf(&self, leaf: u32) -> RegisterQuad {
        self.query(leaf, 0)
    }
}

impl<F> LeafReader for F
where
    F: Fn(u32, u32) -> RegisterQuad,
{
    fn query(&self, leaf: u32, subleaf: u32) -> RegisterQuad {
        self(leaf, subleaf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::vec::Vec;

    #[test]
    fn closure_reader_sees_leaf_and_subleaf() {
        let reader = |leaf: u32, subleaf: u32| RegisterQuad::new(leaf, subleaf, 0, 0);

        assert_eq!(reader.query(7, 2), RegisterQuad::new(7, 2, 0, 0));
    }

    #[test]
    fn query_leaf_uses_subleaf_zero() {
        let calls = RefCell::new(Vec::new());
        let reader = |leaf: u32, subleaf: u32| {
            calls.borrow_mut().push((leaf, subleaf));
            RegisterQuad::zero()
        };

        reader.query_leaf(leaf::STRUCTURED_EXTENDED);
        reader.query_leaf(leaf::EXTENDED_MAX);

        assert_eq!(
            *calls.borrow(),
            [(leaf::STRUCTURED_EXTENDED, 0), (leaf::EXTENDED_MAX, 0)]
        );
    }

    #[test]
    fn register_order() {
        let quad = RegisterQuad::new(1, 2, 3, 4);
        assert_eq!(quad.to_array(), [1, 2, 3, 4]);
        assert_eq!(RegisterQuad::default(), RegisterQuad::zero());
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    #[test]
    fn converts_from_x86_result() {
        let result = x86::cpuid::CpuIdResult {
            eax: 0x16,
            ebx: 0x756e_6547,
            ecx: 0x6c65_746e,
            edx: 0x4965_6e69,
        };

        assert_eq!(
            RegisterQuad::from(result),
            RegisterQuad::new(0x16, 0x756e_6547, 0x6c65_746e, 0x4965_6e69)
        );
    }

    #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        not(target_env = "sgx")
    ))]
    #[test]
    fn native_vendor_leaf_is_ascii() {
        let leaf0 = NativeLeafReader.query_leaf(leaf::VENDOR);

        // leaf 1 is present on every processor with cpuid
        assert!(leaf0.eax >= leaf::FEATURES);

        for register in [leaf0.ebx, leaf0.edx, leaf0.ecx] {
            assert!(register.to_le_bytes().iter().all(u8::is_ascii));
        }
    }

    #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        not(target_env = "sgx")
    ))]
    #[test]
    fn native_reader_is_stable() {
        let first = NativeLeafReader.query_leaf(leaf::EXTENDED_MAX);
        let second = NativeLeafReader.query_leaf(leaf::EXTENDED_MAX);

        assert_eq!(first, second);
    }

    #[cfg(all(
        any(target_arch = "x86", target_arch = "x86_64"),
        not(target_env = "sgx")
    ))]
    #[test]
    fn native_subleaf_reaches_the_processor() {
        let leaf0 = NativeLeafReader.query_leaf(leaf::VENDOR);

        // leaf 0 ignores ecx, so any sub-leaf must give the same answer
        assert_eq!(NativeLeafReader.query(leaf::VENDOR, 3), leaf0);
    }
}
