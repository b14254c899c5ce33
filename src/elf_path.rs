//! Binary identity handling.
//!
//! Every extracted binary is named by a composite path string of the form
//! `<source_pkg>/<binary_pkg>-<name>`, where `binary_pkg` is the package file
//! the binary was unpacked from. The triple is the hashable key for all
//! corpus-level bookkeeping and must reconstruct to the exact input string.

use crate::error::{Result, SiftError};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static ELF_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)/(.*\.deb)-(.*)$").unwrap());

static ARCH_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"amd64|x86_64|aarch64|arm64").unwrap());

/// Wildcard substituted for architecture tags so identities from
/// differently-architected builds of the same binary compare equal.
pub const ARCH_WILDCARD: &str = "{arch}";

/// Identity of one extracted binary: source package, binary package and the
/// binary's local name inside the package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElfPath {
    pub source_pkg: String,
    pub binary_pkg: String,
    pub name: String,
}

impl ElfPath {
    /// Parse a composite path string into its identity triple.
    pub fn parse(s: &str) -> Result<Self> {
        let caps = ELF_PATH_RE
            .captures(s)
            .ok_or_else(|| SiftError::invalid_elf_path(s))?;
        Ok(Self {
            source_pkg: caps[1].to_string(),
            binary_pkg: caps[2].to_string(),
            name: caps[3].to_string(),
        })
    }

    /// The `source_pkg/binary_pkg` prefix shared by all binaries of one
    /// binary package.
    pub fn pkg_path(&self) -> String {
        format!("{}/{}", self.source_pkg, self.binary_pkg)
    }

    /// Copy of this identity with every architecture tag replaced by
    /// [`ARCH_WILDCARD`].
    pub fn with_arch_wildcard(&self) -> Self {
        Self {
            source_pkg: normalize_arch(&self.source_pkg),
            binary_pkg: normalize_arch(&self.binary_pkg),
            name: normalize_arch(&self.name),
        }
    }
}

/// Replace `amd64`/`x86_64`/`arm64`/`aarch64` tokens with [`ARCH_WILDCARD`].
pub fn normalize_arch(s: &str) -> String {
    ARCH_TOKEN_RE.replace_all(s, ARCH_WILDCARD).into_owned()
}

impl fmt::Display for ElfPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}-{}", self.source_pkg, self.binary_pkg, self.name)
    }
}

impl FromStr for ElfPath {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ElfPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips() {
        let inputs = [
            "zlib/zlib1g_1.2.11.dfsg-2ubuntu9_amd64.deb-libz.so.1.2.11",
            "coreutils/coreutils_8.32-4.1ubuntu1_amd64.deb-ls",
            "gcc-12/libgcc-s1_12.1.0-2ubuntu1_arm64.deb-usr-lib-libgcc_s.so.1",
        ];
        for input in inputs {
            let parsed = ElfPath::parse(input).unwrap();
            assert_eq!(parsed.to_string(), input);
        }
    }

    #[test]
    fn parse_extracts_triple() {
        let p = ElfPath::parse("zlib/zlib1g_1.2.11_amd64.deb-libz.so.1").unwrap();
        assert_eq!(p.source_pkg, "zlib");
        assert_eq!(p.binary_pkg, "zlib1g_1.2.11_amd64.deb");
        assert_eq!(p.name, "libz.so.1");
        assert_eq!(p.pkg_path(), "zlib/zlib1g_1.2.11_amd64.deb");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(ElfPath::parse("no-slash_amd64.deb-name").is_err());
        assert!(ElfPath::parse("src/not-a-package-name").is_err());
        assert!(ElfPath::parse("").is_err());
    }

    #[test]
    fn binary_pkg_is_greedy() {
        // A name containing ".deb-" extends the package component, matching
        // the original parse behavior.
        let p = ElfPath::parse("src/a_amd64.deb-b_amd64.deb-tool").unwrap();
        assert_eq!(p.binary_pkg, "a_amd64.deb-b_amd64.deb");
        assert_eq!(p.name, "tool");
    }

    #[test]
    fn arch_wildcard_unifies_architectures() {
        let amd = ElfPath::parse("zlib/zlib1g_1.2.11_amd64.deb-libz.so.1").unwrap();
        let arm = ElfPath::parse("zlib/zlib1g_1.2.11_arm64.deb-libz.so.1").unwrap();
        assert_ne!(amd, arm);
        assert_eq!(amd.with_arch_wildcard(), arm.with_arch_wildcard());
        assert_eq!(
            amd.with_arch_wildcard().to_string(),
            "zlib/zlib1g_1.2.11_{arch}.deb-libz.so.1"
        );
    }

    #[test]
    fn arch_wildcard_covers_all_tags() {
        for tag in ["amd64", "x86_64", "arm64", "aarch64"] {
            assert_eq!(normalize_arch(tag), ARCH_WILDCARD);
        }
        assert_eq!(normalize_arch("pkg_x86_64.deb"), "pkg_{arch}.deb");
    }

    #[test]
    fn serializes_as_canonical_string() {
        let p = ElfPath::parse("zlib/zlib1g_1.2.11_amd64.deb-libz.so.1").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"zlib/zlib1g_1.2.11_amd64.deb-libz.so.1\"");
    }
}
