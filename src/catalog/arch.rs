//! CPU architecture tags carried by catalog sources.

use std::fmt;

/// Architecture tag of a prebuilt engine distribution.
///
/// Serialized as the bare bit width used by the catalog document.
///
/// # Examples
///
/// ```
/// use engine_bundler::catalog::Arch;
///
/// let arch: Arch = serde_json::from_str("\"64\"").unwrap();
/// assert_eq!(arch, Arch::X86_64);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Deserialize, serde::Serialize)]
pub enum Arch {
    /// x86 / i386 (32-bit)
    #[serde(rename = "32")]
    I386,
    /// x86_64 / AMD64 (64-bit)
    #[serde(rename = "64")]
    X86_64,
}

impl Arch {
    /// The default target set: a combined 32-bit and 64-bit distribution.
    pub const DEFAULT_TARGET: [Arch; 2] = [Arch::I386, Arch::X86_64];

    /// Returns the catalog tag for this architecture.
    pub fn tag(self) -> &'static str {
        match self {
            Arch::I386 => "32",
            Arch::X86_64 => "64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Joins architecture tags for diagnostics, e.g. `32, 64`.
pub fn describe(arch: &[Arch]) -> String {
    arch.iter()
        .map(|a| a.tag())
        .collect::<Vec<_>>()
        .join(", ")
}
