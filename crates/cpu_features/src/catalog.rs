//! The feature table.
//!
//! Every row names one flag and the register bit it lives in. The rows
//! expand into the [`Feature`] enum, its lookup methods and, on x86, one
//! zero argument predicate per flag in [`query`].

use core::{fmt, str::FromStr};

use crate::bits::BitSet;

macro_rules! feature_catalog {
    ($(
        $(#[$doc:meta])*
        $variant:ident $name:ident => $set:ident[$bit:literal];
    )*) => {
        /// A processor feature flag reported by `cpuid`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Feature {
            $(
                $(#[$doc])*
                $variant,
            )*
        }

        impl Feature {
            /// Every known feature, ordered by register and bit.
            pub const ALL: &'static [Feature] = &[$(Feature::$variant,)*];

            /// The lowercase name used for lookups and display.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Feature::$variant => stringify!($name),)*
                }
            }

            /// The register set the flag is stored in.
            pub const fn bit_set(self) -> BitSet {
                match self {
                    $(Feature::$variant => BitSet::$set,)*
                }
            }

            /// The bit index within [`Feature::bit_set`].
            pub const fn bit(self) -> u8 {
                match self {
                    $(Feature::$variant => $bit,)*
                }
            }
        }

        /// One predicate per feature, answered from the process wide
        /// [`Snapshot`](crate::Snapshot).
        #[cfg(all(
            any(target_arch = "x86", target_arch = "x86_64"),
            not(target_env = "sgx")
        ))]
        pub mod query {
            use super::Feature;

            $(
                $(#[$doc])*
                #[inline]
                pub fn $name() -> bool {
                    crate::has(Feature::$variant)
                }
            )*
        }
    };
}

feature_catalog! {
    // leaf 0x1, ecx

    /// SSE3 instructions.
    Sse3 sse3 => Leaf1Ecx[0];
    /// `PCLMULQDQ` carry-less multiplication.
    Pclmulqdq pclmulqdq => Leaf1Ecx[1];
    /// 64-bit debug store.
    Dtes64 dtes64 => Leaf1Ecx[2];
    /// `MONITOR` and `MWAIT` instructions.
    Monitor monitor => Leaf1Ecx[3];
    /// CPL qualified debug store.
    DsCpl ds_cpl => Leaf1Ecx[4];
    /// Virtual Machine eXtensions.
    Vmx vmx => Leaf1Ecx[5];
    /// Safer Mode Extensions.
    Smx smx => Leaf1Ecx[6];
    /// Enhanced SpeedStep.
    Eist eist => Leaf1Ecx[7];
    /// Thermal Monitor 2.
    Tm2 tm2 => Leaf1Ecx[8];
    /// Supplemental SSE3 instructions.
    Ssse3 ssse3 => Leaf1Ecx[9];
    /// L1 context id.
    CnxtId cnxt_id => Leaf1Ecx[10];
    /// Silicon debug interface.
    Sdbg sdbg => Leaf1Ecx[11];
    /// Fused multiply-add (FMA3).
    Fma fma => Leaf1Ecx[12];
    /// `CMPXCHG16B` instruction.
    Cx16 cx16 => Leaf1Ecx[13];
    /// Sending task priority messages can be disabled.
    Xtpr xtpr => Leaf1Ecx[14];
    /// Perfmon and debug capability.
    Pdcm pdcm => Leaf1Ecx[15];
    /// Process context identifiers (CR4 bit 17).
    Pcid pcid => Leaf1Ecx[17];
    /// Direct cache access for DMA writes.
    Dca dca => Leaf1Ecx[18];
    /// SSE4.1 instructions.
    Sse41 sse4_1 => Leaf1Ecx[19];
    /// SSE4.2 instructions.
    Sse42 sse4_2 => Leaf1Ecx[20];
    /// x2APIC.
    X2apic x2apic => Leaf1Ecx[21];
    /// `MOVBE` instruction.
    Movbe movbe => Leaf1Ecx[22];
    /// `POPCNT` instruction.
    Popcnt popcnt => Leaf1Ecx[23];
    /// One-shot APIC timer using a TSC deadline.
    TscDeadline tsc_deadline => Leaf1Ecx[24];
    /// AES instruction set.
    Aes aes => Leaf1Ecx[25];
    /// `XSAVE`, `XRSTOR`, `XSETBV` and `XGETBV`.
    Xsave xsave => Leaf1Ecx[26];
    /// `XSAVE` enabled by the OS.
    Oxsave oxsave => Leaf1Ecx[27];
    /// Advanced Vector Extensions.
    Avx avx => Leaf1Ecx[28];
    /// Half precision conversions.
    F16c f16c => Leaf1Ecx[29];
    /// `RDRAND` on-chip random numbers.
    Rdrnd rdrnd => Leaf1Ecx[30];
    /// Running under a hypervisor.
    Hypervisor hypervisor => Leaf1Ecx[31];

    // leaf 0x1, edx

    /// Onboard x87 FPU.
    Fpu fpu => Leaf1Edx[0];
    /// Virtual 8086 mode extensions.
    Vme vme => Leaf1Edx[1];
    /// Debugging extensions (CR4 bit 3).
    De de => Leaf1Edx[2];
    /// Page size extension.
    Pse pse => Leaf1Edx[3];
    /// Time stamp counter.
    Tsc tsc => Leaf1Edx[4];
    /// Model specific registers.
    Msr msr => Leaf1Edx[5];
    Pae pae => Leaf1Edx[6];
    /// Machine check exception.
    Mce mce => Leaf1Edx[7];
    /// `CMPXCHG8B` instruction.
    Cx8 cx8 => Leaf1Edx[8];
    /// Onboard APIC.
    Apic apic => Leaf1Edx[9];
    /// `SYSENTER` and `SYSEXIT`.
    Sep sep => Leaf1Edx[11];
    /// Memory type range registers.
    Mtrr mtrr => Leaf1Edx[12];
    /// Page global enable bit in CR4.
    Pge pge => Leaf1Edx[13];
    /// Machine check architecture.
    Mca mca => Leaf1Edx[14];
    /// Conditional move and `FCMOV`.
    Cmov cmov => Leaf1Edx[15];
    /// Page attribute table.
    Pat pat => Leaf1Edx[16];
    /// 36-bit page size extension.
    Pse36 pse36 => Leaf1Edx[17];
    /// Processor serial number.
    Psn psn => Leaf1Edx[18];
    /// `CLFLUSH` instruction.
    Clfsh clfsh => Leaf1Edx[19];
    /// Debug store.
    Ds ds => Leaf1Edx[21];
    /// Onboard thermal control MSRs for ACPI.
    Acpi acpi => Leaf1Edx[22];
    /// MMX instructions.
    Mmx mmx => Leaf1Edx[23];
    /// `FXSAVE` and `FXRSTOR`.
    Fxsr fxsr => Leaf1Edx[24];
    /// SSE instructions.
    Sse sse => Leaf1Edx[25];
    /// SSE2 instructions.
    Sse2 sse2 => Leaf1Edx[26];
    /// Self snoop.
    Ss ss => Leaf1Edx[27];
    /// Hyper-threading.
    Htt htt => Leaf1Edx[28];
    /// Thermal monitor.
    Tm tm => Leaf1Edx[29];
    /// IA64 processor emulating x86.
    Ia64 ia64 => Leaf1Edx[30];
    /// Pending break enable wakeup.
    Pbe pbe => Leaf1Edx[31];

    // leaf 0x7, ebx

    /// Access to the base of `fs` and `gs`.
    Fsgsbase fsgsbase => Leaf7Ebx[0];
    TscAdjust tsc_adjust => Leaf7Ebx[1];
    /// Software Guard Extensions.
    Sgx sgx => Leaf7Ebx[2];
    /// Bit Manipulation Instruction Set 1.
    Bmi1 bmi1 => Leaf7Ebx[3];
    Hle hle => Leaf7Ebx[4];
    /// Advanced Vector Extensions 2.
    Avx2 avx2 => Leaf7Ebx[5];
    FdpExcptnOnly fdp_excptn_only => Leaf7Ebx[6];
    Smep smep => Leaf7Ebx[7];
    /// Bit Manipulation Instruction Set 2.
    Bmi2 bmi2 => Leaf7Ebx[8];
    /// Enhanced `REP MOVSB` and `REP STOSB`.
    Erms erms => Leaf7Ebx[9];
    /// `INVPCID` instruction.
    Invpcid invpcid => Leaf7Ebx[10];
    Rtm rtm => Leaf7Ebx[11];
    Pqm pqm => Leaf7Ebx[12];
    /// FPU CS and DS are deprecated.
    ZeroFcsFds zero_fcs_fds => Leaf7Ebx[13];
    Mpx mpx => Leaf7Ebx[14];
    Pqe pqe => Leaf7Ebx[15];
    /// AVX-512 foundation.
    Avx512f avx512f => Leaf7Ebx[16];
    /// AVX-512 doubleword and quadword instructions.
    Avx512dq avx512dq => Leaf7Ebx[17];
    Rdseed rdseed => Leaf7Ebx[18];
    Adx adx => Leaf7Ebx[19];
    Smap smap => Leaf7Ebx[20];
    Avx512ifma avx512ifma => Leaf7Ebx[21];
    Pcommit pcommit => Leaf7Ebx[22];
    Clflushopt clflushopt => Leaf7Ebx[23];
    Clwb clwb => Leaf7Ebx[24];
    /// Intel processor trace.
    IntelPt intel_pt => Leaf7Ebx[25];
    /// AVX-512 prefetch instructions.
    Avx512pf avx512pf => Leaf7Ebx[26];
    /// AVX-512 exponential and reciprocal instructions.
    Avx512er avx512er => Leaf7Ebx[27];
    Avx512cd avx512cd => Leaf7Ebx[28];
    Sha sha => Leaf7Ebx[29];
    Avx512bw avx512bw => Leaf7Ebx[30];
    Avx512vl avx512vl => Leaf7Ebx[31];

    // leaf 0x7, ecx

    /// `PREFETCHWT1` instruction.
    Prefetchwt1 prefetchwt1 => Leaf7Ecx[0];
    /// AVX-512 vector bit manipulation instructions.
    Avx512vbmi avx512vbmi => Leaf7Ecx[1];
    /// User-mode instruction prevention.
    Umip umip => Leaf7Ecx[2];
    /// Memory protection keys for user-mode pages.
    Pku pku => Leaf7Ecx[3];
    Ospke ospke => Leaf7Ecx[4];
    /// `UMONITOR`, `UMWAIT` and `TPAUSE`.
    Waitpkg waitpkg => Leaf7Ecx[5];
    Avx512vbmi2 avx512vbmi2 => Leaf7Ecx[6];
    /// CET shadow stack.
    CetSs cet_ss => Leaf7Ecx[7];
    /// Galois field instructions.
    Gfni gfni => Leaf7Ecx[8];
    Vaes vaes => Leaf7Ecx[9];
    Vpclmulqdq vpclmulqdq => Leaf7Ecx[10];
    /// AVX-512 vector neural network instructions.
    Avx512vnni avx512vnni => Leaf7Ecx[11];
    Avx512bitalg avx512bitalg => Leaf7Ecx[12];
    /// Total memory encryption.
    Tme tme => Leaf7Ecx[13];
    Avx512vpopcntdq avx512vpopcntdq => Leaf7Ecx[14];
    /// Five level paging.
    La57 la57 => Leaf7Ecx[16];
    Rdpid rdpid => Leaf7Ecx[22];
    /// Key locker.
    Kl kl => Leaf7Ecx[23];
    BusLockDetect bus_lock_detect => Leaf7Ecx[24];
    Cldemote cldemote => Leaf7Ecx[25];
    Movdiri movdiri => Leaf7Ecx[27];
    Movdir64b movdir64b => Leaf7Ecx[28];
    Enqcmd enqcmd => Leaf7Ecx[29];
    /// SGX launch configuration.
    SgxLc sgx_lc => Leaf7Ecx[30];
    /// Protection keys for supervisor-mode pages.
    Pks pks => Leaf7Ecx[31];

    // leaf 0x7, edx

    /// SGX attestation services.
    SgxKeys sgx_keys => Leaf7Edx[1];
    Avx512Vnniw4 avx512_4vnniw => Leaf7Edx[2];
    Avx512Fmaps4 avx512_4fmaps => Leaf7Edx[3];
    /// Fast short `REP MOV`.
    Fsrm fsrm => Leaf7Edx[4];
    /// User interrupts.
    Uintr uintr => Leaf7Edx[5];
    Avx512vp2intersect avx512vp2intersect => Leaf7Edx[8];
    SrbdsCtrl srbds_ctrl => Leaf7Edx[9];
    /// `VERW` clears CPU buffers.
    MdClear md_clear => Leaf7Edx[10];
    RtmAlwaysAbort rtm_always_abort => Leaf7Edx[11];
    TsxForceAbort tsx_force_abort => Leaf7Edx[13];
    /// `SERIALIZE` instruction.
    Serialize serialize => Leaf7Edx[14];
    /// Hybrid part with cores of different types.
    Hybrid hybrid => Leaf7Edx[15];
    /// TSX suspend load address tracking.
    Tsxldtrk tsxldtrk => Leaf7Edx[16];
    Pconfig pconfig => Leaf7Edx[18];
    /// Architectural last branch records.
    ArchLbr arch_lbr => Leaf7Edx[19];
    /// CET indirect branch tracking.
    CetIbt cet_ibt => Leaf7Edx[20];
    AmxBf16 amx_bf16 => Leaf7Edx[22];
    Avx512fp16 avx512fp16 => Leaf7Edx[23];
    AmxTile amx_tile => Leaf7Edx[24];
    AmxInt8 amx_int8 => Leaf7Edx[25];
    /// IBRS and IBPB speculation control.
    SpecCtrl spec_ctrl => Leaf7Edx[26];
    /// Single thread indirect branch predictors.
    Stibp stibp => Leaf7Edx[27];
    /// `IA32_FLUSH_CMD` MSR.
    FlushL1d flush_l1d => Leaf7Edx[28];
    /// `IA32_ARCH_CAPABILITIES` MSR.
    ArchCapabilities arch_capabilities => Leaf7Edx[29];
    /// `IA32_CORE_CAPABILITIES` MSR.
    CoreCapabilities core_capabilities => Leaf7Edx[30];
    /// Speculative store bypass disable.
    Ssbd ssbd => Leaf7Edx[31];

    // leaf 0x8000_0001, ecx

    LahfLm lahf_lm => Leaf80000001Ecx[0];
    CmpLegacy cmp_legacy => Leaf80000001Ecx[1];
    Svm svm => Leaf80000001Ecx[2];
    Extapic extapic => Leaf80000001Ecx[3];
    Cr8Legacy cr8_legacy => Leaf80000001Ecx[4];
    Abm abm => Leaf80000001Ecx[5];
    /// SSE4a instructions.
    Sse4a sse4a => Leaf80000001Ecx[6];
    /// Misaligned SSE mode.
    Misalignsse misalignsse => Leaf80000001Ecx[7];
    /// `PREFETCH` and `PREFETCHW` instructions.
    Amd3dnowprefetch amd_3dnowprefetch => Leaf80000001Ecx[8];
    Osvw osvw => Leaf80000001Ecx[9];
    Ibs ibs => Leaf80000001Ecx[10];
    Xop xop => Leaf80000001Ecx[11];
    Skinit skinit => Leaf80000001Ecx[12];
    Wdt wdt => Leaf80000001Ecx[13];
    Lwp lwp => Leaf80000001Ecx[15];
    Fma4 fma4 => Leaf80000001Ecx[16];
    Tce tce => Leaf80000001Ecx[17];
    NodeidMsr nodeid_msr => Leaf80000001Ecx[19];
    Tbm tbm => Leaf80000001Ecx[21];
    Topoext topoext => Leaf80000001Ecx[22];
    PerfctrCore perfctr_core => Leaf80000001Ecx[23];
    PerfctrNb perfctr_nb => Leaf80000001Ecx[24];
    Dbx dbx => Leaf80000001Ecx[26];
    Perftsc perftsc => Leaf80000001Ecx[27];
    PcxL2i pcx_l2i => Leaf80000001Ecx[28];
    /// `MONITORX` and `MWAITX` instructions.
    Monitorx monitorx => Leaf80000001Ecx[29];

    // leaf 0x8000_0001, edx

    Syscall syscall => Leaf80000001Edx[11];
    Mp mp => Leaf80000001Edx[19];
    Nx nx => Leaf80000001Edx[20];
    /// Extended MMX.
    Mmxext mmxext => Leaf80000001Edx[22];
    FxsrOpt fxsr_opt => Leaf80000001Edx[25];
    Pdpe1gb pdpe1gb => Leaf80000001Edx[26];
    Rdtscp rdtscp => Leaf80000001Edx[27];
    Lm lm => Leaf80000001Edx[29];
    /// Extended 3DNow!.
    Amd3dnowext amd_3dnowext => Leaf80000001Edx[30];
    /// 3DNow!.
    Amd3dnow amd_3dnow => Leaf80000001Edx[31];
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a name that is not in the feature table.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UnknownFeature;

impl fmt::Debug for UnknownFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown cpu feature name")
    }
}

impl fmt::Display for UnknownFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .iter()
            .copied()
            .find(|feature| feature.name() == s)
            .ok_or(UnknownFeature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn no_two_features_share_a_bit() {
        let mut seen = HashSet::new();

        for feature in Feature::ALL {
            assert!(
                seen.insert((feature.bit_set(), feature.bit())),
                "{} aliases {} bit {}",
                feature,
                feature.bit_set(),
                feature.bit()
            );
        }
    }

    #[test]
    fn names_are_unique() {
        let mut seen = HashSet::new();

        for feature in Feature::ALL {
            assert!(seen.insert(feature.name()), "duplicate name {}", feature);
        }
    }

    #[test]
    fn bits_fit_a_register() {
        assert!(Feature::ALL.iter().all(|feature| feature.bit() < 32));
    }

    #[test]
    fn table_size() {
        assert_eq!(Feature::ALL.len(), 180);
    }

    #[test]
    fn reserved_bits_are_unmapped() {
        let reserved = [
            (BitSet::Leaf1Ecx, 16),
            (BitSet::Leaf1Edx, 10),
            (BitSet::Leaf1Edx, 20),
            (BitSet::Leaf7Ecx, 15),
        ];

        for (set, bit) in reserved {
            assert!(!Feature::ALL
                .iter()
                .any(|feature| feature.bit_set() == set && feature.bit() == bit));
        }
    }

    #[test]
    fn well_known_positions() {
        let expected = [
            (Feature::Fpu, BitSet::Leaf1Edx, 0),
            (Feature::Fxsr, BitSet::Leaf1Edx, 24),
            (Feature::Sse2, BitSet::Leaf1Edx, 26),
            (Feature::Sse42, BitSet::Leaf1Ecx, 20),
            (Feature::Hypervisor, BitSet::Leaf1Ecx, 31),
            (Feature::Avx2, BitSet::Leaf7Ebx, 5),
            (Feature::Avx512vl, BitSet::Leaf7Ebx, 31),
            (Feature::Avx512vpopcntdq, BitSet::Leaf7Ecx, 14),
            (Feature::SgxLc, BitSet::Leaf7Ecx, 30),
            (Feature::Avx512Fmaps4, BitSet::Leaf7Edx, 3),
            (Feature::Amd3dnowprefetch, BitSet::Leaf80000001Ecx, 8),
            (Feature::PcxL2i, BitSet::Leaf80000001Ecx, 28),
            (Feature::Syscall, BitSet::Leaf80000001Edx, 11),
            (Feature::Lm, BitSet::Leaf80000001Edx, 29),
            (Feature::Amd3dnow, BitSet::Leaf80000001Edx, 31),
        ];

        for (feature, set, bit) in expected {
            assert_eq!((feature.bit_set(), feature.bit()), (set, bit), "{}", feature);
        }
    }

    #[test]
    fn parse_by_name() {
        assert_eq!("sse4_1".parse::<Feature>(), Ok(Feature::Sse41));
        assert_eq!("amd_3dnow".parse::<Feature>(), Ok(Feature::Amd3dnow));
        assert_eq!("avx512_4vnniw".parse::<Feature>(), Ok(Feature::Avx512Vnniw4));
        assert_eq!("SSE2".parse::<Feature>(), Err(UnknownFeature));
        assert_eq!("".parse::<Feature>(), Err(UnknownFeature));
    }

    #[test]
    fn every_name_parses_back() {
        for &feature in Feature::ALL {
            assert_eq!(feature.to_string().parse::<Feature>(), Ok(feature));
        }
    }
}
