//! Decoding of the text `cpuid` hands out in registers.
//!
//! Every register carries four characters, lowest byte first.

use arrayvec::ArrayString;
use leaf_reader::RegisterQuad;

/// Length of the vendor id in bytes.
pub const VENDOR_ID_LEN: usize = 12;

/// Length of the raw brand string in bytes, three leaves of 16 bytes.
pub const BRAND_LEN: usize = 48;

pub type VendorId = ArrayString<VENDOR_ID_LEN>;
pub type Brand = ArrayString<BRAND_LEN>;

/// Known vendor ids as returned by leaf `0x0`.
pub mod vendors {
    pub const AMD: &str = "AuthenticAMD";
    pub const INTEL: &str = "GenuineIntel";
    pub const CENTAUR: &str = "CentaurHauls";
    pub const CYRIX: &str = "CyrixInstead";
    pub const HYGON: &str = "HygonGenuine";
    pub const ZHAOXIN: &str = "  Shanghai  ";
    pub const TRANSMETA: &str = "GenuineTMx86";
    pub const NSC: &str = "Geode by NSC";
    pub const VIA: &str = "VIA VIA VIA ";
    pub const VORTEX: &str = "Vortex86 SoC";

    /// Early engineering samples of the AMD K5.
    pub const AMD_K5: &str = "AMDisbetter!";
}

fn push_register<const CAP: usize>(out: &mut ArrayString<CAP>, register: u32) {
    for byte in register.to_le_bytes() {
        // NUL is padding, not text
        if byte == 0 {
            continue;
        }

        let c = if byte.is_ascii() { byte as char } else { '?' };
        // cannot overflow: each register adds at most 4 bytes and the
        // capacities match the register counts
        let _ = out.try_push(c);
    }
}

/// `isspace` in the C locale, which unlike `char::is_ascii_whitespace`
/// includes vertical tab.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

/// Decodes the vendor id from leaf `0x0`. The registers are ordered
/// `ebx`, `edx`, `ecx`.
pub fn vendor_id(leaf0: &RegisterQuad) -> VendorId {
    let mut out = VendorId::new();

    for register in [leaf0.ebx, leaf0.edx, leaf0.ecx] {
        push_register(&mut out, register);
    }

    out
}

/// Decodes the processor brand from leaves `0x8000_0002` to `0x8000_0004`
/// and trims surrounding whitespace.
pub fn brand(leaves: &[RegisterQuad; 3]) -> Brand {
    let mut raw = Brand::new();

    for quad in leaves {
        for register in quad.to_array() {
            push_register(&mut raw, register);
        }
    }

    let mut out = Brand::new();
    let _ = out.try_push_str(raw.trim_matches(is_space));
    out
}
