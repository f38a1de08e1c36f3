#![cfg_attr(not(test), no_std)]

//! Processor feature detection through `cpuid`.
//!
//! The first call into any of the free functions runs the detection once
//! for the whole process, every later call reads the cached [`Snapshot`].
//!
//! ```no_run
//! if cpu_features::avx2() && cpu_features::bmi2() {
//!     // take the fast path
//! }
//!
//! println!("{} {}", cpu_features::vendor(), cpu_features::model());
//! ```
//!
//! [`Snapshot::detect`] runs the same detection against any [`LeafReader`],
//! which is how the logic is exercised without real hardware.

mod bits;
mod catalog;
mod overlay;
mod snapshot;
mod strings;

#[cfg(test)]
mod test_logger;

pub use bits::{BitSet, FeatureBits};
pub use catalog::{Feature, UnknownFeature};
pub use leaf_reader::{leaf, LeafReader, RegisterQuad};
pub use overlay::AMD_OVERLAY_MASK;
pub use snapshot::Snapshot;
pub use strings::{vendors, BRAND_LEN, VENDOR_ID_LEN};

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(target_env = "sgx")
))]
pub use native::*;

#[cfg(all(
    any(target_arch = "x86", target_arch = "x86_64"),
    not(target_env = "sgx")
))]
mod native {
    use leaf_reader::NativeLeafReader;
    use spin::Once;

    use crate::{Feature, Snapshot};

    pub use crate::catalog::query::*;

    static SNAPSHOT: Once<Snapshot> = Once::new();

    /// The snapshot of the processor this process runs on.
    ///
    /// Detection runs on the first call. Concurrent first callers wait for
    /// that single detection to finish and all see the same result.
    pub fn snapshot() -> &'static Snapshot {
        SNAPSHOT.call_once(|| Snapshot::detect(&NativeLeafReader))
    }

    /// Checks whether the processor reports `feature`.
    #[inline]
    pub fn has(feature: Feature) -> bool {
        snapshot().has(feature)
    }

    /// The vendor id, for example `AuthenticAMD`.
    pub fn vendor() -> &'static str {
        snapshot().vendor()
    }

    /// The processor brand string, empty if the processor has none.
    pub fn model() -> &'static str {
        snapshot().model()
    }

    /// Iterates over every feature the processor reports.
    pub fn supported() -> impl Iterator<Item = Feature> {
        snapshot().supported()
    }
}

#[cfg(all(
    test,
    any(target_arch = "x86", target_arch = "x86_64"),
    not(target_env = "sgx")
))]
mod tests {
    use super::*;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn snapshot_is_created_once() {
        assert!(core::ptr::eq(snapshot(), snapshot()));
    }

    #[test]
    fn concurrent_first_access_agrees() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| snapshot() as *const Snapshot as usize))
            .collect();

        let addresses: Vec<usize> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect();

        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn queries_are_idempotent() {
        for &feature in Feature::ALL {
            assert_eq!(has(feature), has(feature));
        }

        assert_eq!(vendor(), vendor());
        assert_eq!(model(), model());
        assert_eq!(sse2(), sse2());
    }

    #[test]
    fn vendor_fits_id_length() {
        // NUL-padded ids decode shorter
        assert!(!vendor().is_empty());
        assert!(vendor().len() <= VENDOR_ID_LEN);
    }

    #[test]
    fn model_is_trimmed() {
        let model = model();
        assert!(model.len() <= BRAND_LEN);
        assert_eq!(model, model.trim());
    }

    #[test]
    fn predicates_match_snapshot() {
        assert_eq!(fpu(), snapshot().has(Feature::Fpu));
        assert_eq!(avx2(), snapshot().has(Feature::Avx2));
        assert_eq!(lm(), snapshot().has(Feature::Lm));
        assert!(supported().all(has));
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn x86_64_baseline() {
        // every x86_64 processor has these
        assert!(fpu());
        assert!(tsc());
        assert!(cx8());
        assert!(cmov());
        assert!(mmx());
        assert!(fxsr());
        assert!(sse());
        assert!(sse2());
    }
}
