use std::env;

fn main() {
    for cfg in ["ossl102", "ossl110", "libressl", "libressl261"] {
        println!("cargo:rustc-check-cfg=cfg({cfg})");
    }

    // openssl-sys exports the version of the headers it was built against.
    // Both values are hex-encoded `OPENSSL_VERSION_NUMBER`s without a prefix.
    if let Some(version) = version_from_env("DEP_OPENSSL_LIBRESSL_VERSION_NUMBER") {
        println!("cargo:rustc-cfg=libressl");
        if version >= 0x2_06_01_00_0 {
            println!("cargo:rustc-cfg=libressl261");
        }
        // LibreSSL pins OPENSSL_VERSION_NUMBER to 2.0.0, which says nothing
        // about the OpenSSL APIs it actually provides.
        return;
    }

    if let Some(version) = version_from_env("DEP_OPENSSL_VERSION_NUMBER") {
        if version >= 0x1_00_02_00_0 {
            println!("cargo:rustc-cfg=ossl102");
        }
        if version >= 0x1_01_00_00_0 {
            println!("cargo:rustc-cfg=ossl110");
        }
    }
}

fn version_from_env(key: &str) -> Option<u64> {
    println!("cargo:rerun-if-env-changed={key}");
    let raw = env::var(key).ok()?;
    match u64::from_str_radix(raw.trim(), 16) {
        Ok(version) => Some(version),
        Err(e) => {
            println!("cargo:warning=ignoring unparsable {key}={raw}: {e}");
            None
        }
    }
}
