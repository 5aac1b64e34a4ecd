//! Salt index oracle
//!
//! The exchange scrambles its tokens with indices produced by an opaque,
//! pre-compiled WebAssembly module. Its number generation is adversarially
//! obfuscated and is not reimplemented here; the module is executed as-is
//! through a narrow calling contract: five exported entry points, each a
//! pure, deterministic `(i32, i32, i32, i32, i32) -> i32` function.
//!
//! The contract is modeled as the [`SaltOracle`] trait so the descrambler
//! and session can be exercised against deterministic substitutes; the
//! production implementation is [`WasmOracle`].

pub mod wasm;

pub use wasm::WasmOracle;

use crate::error::Result;

/// The five entry points exported by the opaque module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleEntry {
    Cdx,
    Rdx,
    Bdx,
    Ndx,
    Mdx,
}

impl OracleEntry {
    /// Export name inside the wasm module
    pub fn export_name(self) -> &'static str {
        match self {
            Self::Cdx => "cdx",
            Self::Rdx => "rdx",
            Self::Bdx => "bdx",
            Self::Ndx => "ndx",
            Self::Mdx => "mdx",
        }
    }
}

/// Converts session salts into token cut indices.
///
/// Implementations must be pure: the same entry point called with the same
/// arguments always yields the same index. Argument order is load-bearing;
/// callers pass exact permutations of the five session salts.
pub trait SaltOracle: Send + Sync {
    /// Invoke one entry point with the given argument tuple.
    fn cut_index(&self, entry: OracleEntry, args: [i32; 5]) -> Result<i32>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_export_names() {
        assert_eq!(OracleEntry::Cdx.export_name(), "cdx");
        assert_eq!(OracleEntry::Rdx.export_name(), "rdx");
        assert_eq!(OracleEntry::Bdx.export_name(), "bdx");
        assert_eq!(OracleEntry::Ndx.export_name(), "ndx");
        assert_eq!(OracleEntry::Mdx.export_name(), "mdx");
    }
}
