//! Linked OpenSSL version and the adapter features it enables

use serde::{Serialize, Serializer};
use std::fmt;

use super::backend;

/// First release (including 1.0.2 development snapshots) with ALPN support
const ALPN_MIN: u64 = 0x1000_2000;
/// First 1.0.2 release build, where `SSL_CTRL_SET_ECDH_AUTO` is honoured
const ECDH_AUTO_MIN: u64 = 0x1000_200f;
/// Auto-ECDH is always on from 1.1.0
const ECDH_AUTO_END: u64 = 0x1010_0000;

/// A decoded `OPENSSL_VERSION_NUMBER`
///
/// Releases before 3.0 use `0xMNNFFPPS` (major, minor, fix, patch letter,
/// status). From 3.0 the layout is `0xMNN00PP0` with a numeric patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryVersion(u64);

impl LibraryVersion {
    /// Wraps a raw `OPENSSL_VERSION_NUMBER`
    pub const fn from_number(number: u64) -> Self {
        Self(number)
    }

    /// Builds the release version number for `major.minor.fix`
    ///
    /// For 3.x and later `fix` is the numeric patch level.
    pub const fn new(major: u8, minor: u8, fix: u8) -> Self {
        if major >= 3 {
            Self(((major as u64) << 28) | ((minor as u64) << 20) | ((fix as u64) << 4))
        } else {
            Self(((major as u64) << 28) | ((minor as u64) << 20) | ((fix as u64) << 12) | 0xf)
        }
    }

    /// Version of the library the process is running against
    ///
    /// LibreSSL pins `OpenSSL_version_num` to `0x20000000`, so there this
    /// always reads as 2.0.0; `openssl::version::version()` carries the real
    /// release string.
    pub fn linked() -> Self {
        Self(openssl::version::number() as u64)
    }

    pub const fn number(&self) -> u64 {
        self.0
    }

    pub const fn major(&self) -> u8 {
        ((self.0 >> 28) & 0xf) as u8
    }

    pub const fn minor(&self) -> u8 {
        ((self.0 >> 20) & 0xff) as u8
    }

    /// Fix level before 3.0, numeric patch level from 3.0
    pub const fn fix(&self) -> u8 {
        if self.major() >= 3 {
            ((self.0 >> 4) & 0xff) as u8
        } else {
            ((self.0 >> 12) & 0xff) as u8
        }
    }

    /// Patch letter index before 3.0 (`1` is `a`), always `0` from 3.0
    pub const fn patch(&self) -> u8 {
        if self.major() >= 3 {
            0
        } else {
            ((self.0 >> 4) & 0xff) as u8
        }
    }
}

impl fmt::Display for LibraryVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.fix())?;
        let patch = self.patch();
        if patch > 0 && patch <= 26 {
            write!(f, "{}", (b'a' + patch - 1) as char)?;
        }
        Ok(())
    }
}

impl Serialize for LibraryVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What the adapter can do against a given library version
///
/// Only constructible through [`Capabilities::detect`] or
/// [`Capabilities::for_version`], so a capability can never be claimed for
/// code that was not compiled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    version: LibraryVersion,
    alpn: bool,
    ecdh_auto: bool,
}

impl Capabilities {
    /// Capabilities of the OpenSSL this process is linked against
    pub fn detect() -> Self {
        let caps = Self::for_version(LibraryVersion::linked());
        log::debug!(
            "Detected OpenSSL {} ({}): alpn={}, ecdh_auto={}",
            caps.version,
            openssl::version::version(),
            caps.alpn,
            caps.ecdh_auto
        );
        caps
    }

    /// Capabilities the adapter would have against `version`
    pub fn for_version(version: LibraryVersion) -> Self {
        let number = version.number();
        Self {
            version,
            alpn: backend::ALPN_COMPILED && number >= ALPN_MIN,
            ecdh_auto: backend::ECDH_AUTO_COMPILED
                && (ECDH_AUTO_MIN..ECDH_AUTO_END).contains(&number),
        }
    }

    pub fn version(&self) -> LibraryVersion {
        self.version
    }

    /// Whether ALPN callback registration and retrieval reach the library
    pub fn alpn(&self) -> bool {
        self.alpn
    }

    /// Whether enabling auto-ECDH issues a control call
    pub fn ecdh_auto(&self) -> bool {
        self.ecdh_auto
    }

    /// JSON rendering for diagnostics
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_pre_3_versions() {
        let v = LibraryVersion::from_number(0x1000_215f);
        assert_eq!((v.major(), v.minor(), v.fix(), v.patch()), (1, 0, 2, 21));
        assert_eq!(v.to_string(), "1.0.2u");

        assert_eq!(LibraryVersion::from_number(0x1010_117f).to_string(), "1.1.1w");
        assert_eq!(LibraryVersion::from_number(0x1000_100f).to_string(), "1.0.1");
    }

    #[test]
    fn test_decode_3_versions() {
        let v = LibraryVersion::from_number(0x3000_0020);
        assert_eq!((v.major(), v.minor(), v.fix(), v.patch()), (3, 0, 2, 0));
        assert_eq!(v.to_string(), "3.0.2");
        assert_eq!(LibraryVersion::new(3, 2, 1).number(), 0x3020_0010);
    }

    #[test]
    fn test_new_matches_release_numbers() {
        assert_eq!(LibraryVersion::new(1, 0, 2).number(), 0x1000_200f);
        assert_eq!(LibraryVersion::new(1, 1, 0).number(), 0x1010_000f);
        assert!(LibraryVersion::new(1, 0, 1) < LibraryVersion::new(1, 0, 2));
        assert!(LibraryVersion::new(1, 1, 1) < LibraryVersion::new(3, 0, 0));
    }

    #[test]
    fn test_capabilities_before_1_0_2() {
        let caps = Capabilities::for_version(LibraryVersion::new(1, 0, 1));
        assert!(!caps.alpn());
        assert!(!caps.ecdh_auto());
    }

    #[test]
    fn test_capabilities_1_0_2() {
        let caps = Capabilities::for_version(LibraryVersion::new(1, 0, 2));
        assert_eq!(caps.alpn(), backend::ALPN_COMPILED);
        assert_eq!(caps.ecdh_auto(), backend::ECDH_AUTO_COMPILED);

        // development snapshots of 1.0.2 already had ALPN but not auto-ECDH
        let snapshot = Capabilities::for_version(LibraryVersion::from_number(0x1000_2000));
        assert_eq!(snapshot.alpn(), backend::ALPN_COMPILED);
        assert!(!snapshot.ecdh_auto());
    }

    #[test]
    fn test_capabilities_1_1_and_later() {
        for version in [
            LibraryVersion::new(1, 1, 0),
            LibraryVersion::new(1, 1, 1),
            LibraryVersion::new(3, 0, 13),
        ] {
            let caps = Capabilities::for_version(version);
            assert_eq!(caps.alpn(), backend::ALPN_COMPILED);
            assert!(!caps.ecdh_auto(), "{version} should not need auto-ECDH");
        }
    }

    #[test]
    fn test_ecdh_auto_never_claimed_without_compiled_support() {
        for number in [0x1000_200f, 0x1000_215f, 0x1000_2fff] {
            let caps = Capabilities::for_version(LibraryVersion::from_number(number));
            assert!(
                !caps.ecdh_auto() || backend::ECDH_AUTO_COMPILED,
                "{} claims auto-ECDH without the control in the headers",
                caps.version()
            );
        }
        #[cfg(ossl110)]
        assert!(!Capabilities::for_version(LibraryVersion::new(1, 0, 2)).ecdh_auto());
    }

    #[test]
    fn test_libressl_pinned_number_has_no_auto_ecdh() {
        let pinned = LibraryVersion::from_number(0x2000_0000);
        assert_eq!(pinned.to_string(), "2.0.0");
        let caps = Capabilities::for_version(pinned);
        assert!(!caps.ecdh_auto());
        assert_eq!(caps.alpn(), backend::ALPN_COMPILED);
    }

    #[test]
    #[cfg(libressl)]
    fn test_libressl_reports_pinned_version_number() {
        assert_eq!(LibraryVersion::linked().number(), 0x2000_0000);
        assert!(openssl::version::version().starts_with("LibreSSL"));
    }

    #[test]
    fn test_detect_uses_linked_version() {
        let caps = Capabilities::detect();
        assert_eq!(caps.version(), LibraryVersion::linked());
    }

    #[test]
    fn test_to_json() {
        let caps = Capabilities::for_version(LibraryVersion::new(1, 0, 1));
        let json: serde_json::Value = serde_json::from_str(&caps.to_json()).unwrap();
        assert_eq!(json["version"], "1.0.1");
        assert_eq!(json["alpn"], false);
        assert_eq!(json["ecdh_auto"], false);
    }
}
