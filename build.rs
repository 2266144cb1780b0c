// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

use std::env;

fn main() {
    let target = env::var("TARGET").unwrap_or_default();

    // Host builds (unit tests) link normally.
    if target.starts_with("thumbv") {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");

        if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
            println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
        }
    }

    println!("cargo:rerun-if-changed=build.rs");
}
