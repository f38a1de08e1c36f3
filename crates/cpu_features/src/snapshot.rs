use leaf_reader::{leaf, LeafReader, RegisterQuad};
use log::{debug, trace};

use crate::bits::{BitSet, FeatureBits};
use crate::catalog::Feature;
use crate::overlay;
use crate::strings::{self, vendors, Brand, VendorId};

/// Everything `cpuid` reported about the processor, captured in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    bits: FeatureBits,
    max_standard_leaf: u32,
    max_extended_leaf: u32,
    vendor: VendorId,
    brand: Brand,
}

impl Snapshot {
    /// Queries `reader` and builds a snapshot.
    ///
    /// The leaves are issued in a fixed order:
    /// - `0x0` for the highest standard leaf and the vendor id
    /// - `0x1` for the classic feature bits
    /// - `0x7` sub-leaf 0 for the structured extended feature bits
    /// - `0x8000_0000` for the highest extended leaf
    /// - `0x8000_0001`, only on AMD, whose `edx` is partially copied over
    ///   the `edx` of leaf `0x1`
    /// - `0x8000_0002` to `0x8000_0004` for the brand string, if present
    pub fn detect<R: LeafReader + ?Sized>(reader: &R) -> Self {
        let leaf0 = reader.query_leaf(leaf::VENDOR);
        let max_standard_leaf = leaf0.eax;
        let vendor = strings::vendor_id(&leaf0);

        let leaf1 = reader.query_leaf(leaf::FEATURES);
        let leaf7 = reader.query(leaf::STRUCTURED_EXTENDED, 0);
        let mut bits = FeatureBits::empty()
            .with(BitSet::Leaf1Ecx, leaf1.ecx)
            .with(BitSet::Leaf1Edx, leaf1.edx)
            .with(BitSet::Leaf7Ebx, leaf7.ebx)
            .with(BitSet::Leaf7Ecx, leaf7.ecx)
            .with(BitSet::Leaf7Edx, leaf7.edx);

        let max_extended_leaf = reader.query_leaf(leaf::EXTENDED_MAX).eax;

        debug!(
            "cpuid: vendor {:?}, max standard leaf {:#x}, max extended leaf {:#x}",
            vendor.as_str(),
            max_standard_leaf,
            max_extended_leaf
        );

        if max_extended_leaf >= leaf::EXTENDED_FEATURES && vendor.as_str() == vendors::AMD {
            let extended = reader.query_leaf(leaf::EXTENDED_FEATURES);
            let leaf1_edx = bits.get(BitSet::Leaf1Edx);
            let patched = overlay::apply(leaf1_edx, extended.edx);

            trace!(
                "cpuid: amd overlay {:#010x} -> {:#010x}",
                leaf1_edx,
                patched
            );

            bits = bits
                .with(BitSet::Leaf80000001Ecx, extended.ecx)
                .with(BitSet::Leaf80000001Edx, extended.edx)
                .with(BitSet::Leaf1Edx, patched);
        }

        let brand = if max_extended_leaf >= leaf::BRAND_LAST {
            let leaves: [RegisterQuad; 3] =
                leaf::BRAND.map(|brand_leaf| reader.query_leaf(brand_leaf));
            let brand = strings::brand(&leaves);
            debug!("cpuid: brand {:?}", brand.as_str());
            brand
        } else {
            Brand::new()
        };

        Self {
            bits,
            max_standard_leaf,
            max_extended_leaf,
            vendor,
            brand,
        }
    }

    /// Checks whether `feature` is reported.
    #[inline]
    pub fn has(&self, feature: Feature) -> bool {
        self.bits.test(feature.bit_set(), feature.bit())
    }

    /// The 12 character vendor id, for example `GenuineIntel`.
    pub fn vendor(&self) -> &str {
        self.vendor.as_str()
    }

    /// The processor brand string without surrounding whitespace.
    ///
    /// Empty if the processor does not implement the brand leaves.
    pub fn model(&self) -> &str {
        self.brand.as_str()
    }

    pub fn max_standard_leaf(&self) -> u32 {
        self.max_standard_leaf
    }

    pub fn max_extended_leaf(&self) -> u32 {
        self.max_extended_leaf
    }

    /// The feature registers after the AMD overlay.
    pub fn bits(&self) -> &FeatureBits {
        &self.bits
    }

    /// Iterates over the features that are reported, in table order.
    pub fn supported(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL
            .iter()
            .copied()
            .filter(move |&feature| self.has(feature))
    }
}
