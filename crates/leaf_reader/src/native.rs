use crate::{LeafReader, RegisterQuad};

/// Runs `cpuid` on the current logical processor.
///
/// Backed by the `core::arch` intrinsic unless the `inline-asm` feature
/// is enabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLeafReader;

impl LeafReader for NativeLeafReader {
    #[inline]
    fn query(&self, leaf: u32, subleaf: u32) -> RegisterQuad {
        execute(leaf, subleaf)
    }
}

#[cfg(not(feature = "inline-asm"))]
#[allow(unused_unsafe)]
fn execute(leaf: u32, subleaf: u32) -> RegisterQuad {
    #[cfg(target_arch = "x86")]
    use core::arch::x86::__cpuid_count;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::__cpuid_count;

    // Safety: every processor this crate runs on implements cpuid
    let regs = unsafe { __cpuid_count(leaf, subleaf) };
    RegisterQuad::new(regs.eax, regs.ebx, regs.ecx, regs.edx)
}

#[cfg(all(target_arch = "x86_64", feature = "inline-asm"))]
fn execute(leaf: u32, subleaf: u32) -> RegisterQuad {
    let mut quad = RegisterQuad::zero();

    // Safety: cpuid only writes the four registers listed here.
    // LLVM reserves rbx, so it is parked in a scratch register.
    unsafe {
        core::arch::asm!(
            "mov {0:r}, rbx",
            "cpuid",
            "xchg {0:r}, rbx",
            out(reg) quad.ebx,
            inout("eax") leaf => quad.eax,
            inout("ecx") subleaf => quad.ecx,
            out("edx") quad.edx,
            options(nostack, preserves_flags),
        );
    }

    quad
}

#[cfg(all(target_arch = "x86", feature = "inline-asm"))]
fn execute(leaf: u32, subleaf: u32) -> RegisterQuad {
    let mut quad = RegisterQuad::zero();

    // Safety: as on x86_64, ebx doubles as the PIC register here.
    unsafe {
        core::arch::asm!(
            "mov {0}, ebx",
            "cpuid",
            "xchg {0}, ebx",
            out(reg) quad.ebx,
            inout("eax") leaf => quad.eax,
            inout("ecx") subleaf => quad.ecx,
            out("edx") quad.edx,
            options(nostack, preserves_flags),
        );
    }

    quad
}
