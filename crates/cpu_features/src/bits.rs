use core::fmt;

use leaf_reader::leaf;

/// Identifies one of the registers the feature flags are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BitSet {
    /// `ecx` of leaf `0x1`.
    Leaf1Ecx,
    /// `edx` of leaf `0x1`, patched on AMD processors.
    Leaf1Edx,
    /// `ebx` of leaf `0x7`, sub-leaf 0.
    Leaf7Ebx,
    /// `ecx` of leaf `0x7`, sub-leaf 0.
    Leaf7Ecx,
    /// `edx` of leaf `0x7`, sub-leaf 0.
    Leaf7Edx,
    /// `ecx` of leaf `0x8000_0001`.
    Leaf80000001Ecx,
    /// `edx` of leaf `0x8000_0001`.
    Leaf80000001Edx,
}

impl BitSet {
    pub const ALL: [BitSet; 7] = [
        BitSet::Leaf1Ecx,
        BitSet::Leaf1Edx,
        BitSet::Leaf7Ebx,
        BitSet::Leaf7Ecx,
        BitSet::Leaf7Edx,
        BitSet::Leaf80000001Ecx,
        BitSet::Leaf80000001Edx,
    ];

    /// The leaf this register is read from.
    pub const fn leaf(self) -> u32 {
        match self {
            BitSet::Leaf1Ecx | BitSet::Leaf1Edx => leaf::FEATURES,
            BitSet::Leaf7Ebx | BitSet::Leaf7Ecx | BitSet::Leaf7Edx => leaf::STRUCTURED_EXTENDED,
            BitSet::Leaf80000001Ecx | BitSet::Leaf80000001Edx => leaf::EXTENDED_FEATURES,
        }
    }

    /// Name of the register within the leaf.
    pub const fn register(self) -> &'static str {
        match self {
            BitSet::Leaf7Ebx => "ebx",
            BitSet::Leaf1Ecx | BitSet::Leaf7Ecx | BitSet::Leaf80000001Ecx => "ecx",
            BitSet::Leaf1Edx | BitSet::Leaf7Edx | BitSet::Leaf80000001Edx => "edx",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for BitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cpuid({:#x}).{}", self.leaf(), self.register())
    }
}

/// The raw feature registers captured at detection time.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureBits {
    words: [u32; BitSet::ALL.len()],
}

impl FeatureBits {
    pub const fn empty() -> Self {
        Self {
            words: [0; BitSet::ALL.len()],
        }
    }

    pub const fn get(&self, set: BitSet) -> u32 {
        self.words[set.index()]
    }

    /// Tests a single bit. Bits past 31 are never set.
    pub const fn test(&self, set: BitSet, bit: u8) -> bool {
        bit < u32::BITS as u8 && (self.get(set) >> bit) & 1 != 0
    }

    /// Returns a copy with `set` replaced by `value`.
    pub fn with(mut self, set: BitSet, value: u32) -> Self {
        self.words[set.index()] = value;
        self
    }
}
