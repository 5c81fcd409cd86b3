use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    cxx_build::bridge("src/lib.rs")
        .flag_if_supported("-std=c++14")
        .compile("ferrox-cpp");

    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=include/ferrox/tensor.hpp");
    println!("cargo:rerun-if-changed=Cargo.toml");

    write_version_header();
}

/// Renders a version.hpp from the crate version so C++ consumers can check
/// which ferrox they linked against.
///
/// The header goes to OUT_DIR for cargo-driven builds and is mirrored into
/// include/ferrox/ for C++ builds that do not go through cargo.
fn write_version_header() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".into());
    let mut parts = version.split('.');
    let mut next = || parts.next().unwrap_or("0");
    let (major, minor, patch) = (next(), next(), next());

    let header = format!(
        r#"#pragma once

// Generated by ferrox-cpp/build.rs from the crate version. Do not edit.

#define FERROX_VERSION_MAJOR {major}
#define FERROX_VERSION_MINOR {minor}
#define FERROX_VERSION_PATCH {patch}
#define FERROX_VERSION "{version}"

namespace ferrox {{

inline const char *version() noexcept {{ return FERROX_VERSION; }}

}} // namespace ferrox
"#
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    write_header(&out_dir, &header).expect("Failed to write version.hpp to OUT_DIR");

    let dev_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap())
        .join("include")
        .join("ferrox");
    if let Err(e) = write_header(&dev_dir, &header) {
        eprintln!("Warning: could not mirror version.hpp into the dev tree: {e}");
    }
}

fn write_header(dir: &PathBuf, contents: &str) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("version.hpp"), contents)
}
