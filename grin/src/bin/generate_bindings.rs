//! Generate UniFFI Swift bindings for Grin
//!
//! Run: cargo run --bin generate-bindings
//!
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │ DEPENDENCY MAP - Output paths must match Project.swift expectations         │
//! │                                                                             │
//! │ Inputs:                                                                     │
//! │   target/release/libgrin.dylib       ← Built library for bindgen            │
//! │                                                                             │
//! │ Outputs (paths match Project.swift):                                        │
//! │   Sources/GrinRust/grinFFI.h                  ← C header                    │
//! │   Sources/GrinRust/module.modulemap           ← Clang module map            │
//! │   Sources/GrinRust/libgrin.a                  ← Universal static lib        │
//! │   Sources/GrinRustWrapper/grin.swift          ← Swift bindings              │
//! │                                                                             │
//! │ Manual file (not generated):                                                │
//! │   Sources/GrinRustWrapper/GrinRust.swift      ← Swift extensions            │
//! └─────────────────────────────────────────────────────────────────────────────┘

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn main() {
    let rust_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let project_root = rust_dir.parent().expect("No parent directory");

    // Ensure Rust is built with the same deployment target as the Swift app
    env::set_var("MACOSX_DEPLOYMENT_TARGET", "15.0");

    println!("Building Rust library...");
    run_cmd("cargo", &["build", "--release"], &rust_dir);

    println!("Generating Swift bindings...");
    run_cmd(
        "cargo",
        &[
            "run",
            "--bin",
            "uniffi-bindgen",
            "generate",
            "--library",
            "target/release/libgrin.dylib",
            "--language",
            "swift",
            "--out-dir",
            "generated",
        ],
        &rust_dir,
    );

    let swift_dest = project_root.join("Sources/GrinRust");
    let wrapper_dest = project_root.join("Sources/GrinRustWrapper");
    let generated = rust_dir.join("generated");

    // Read and fix Swift 6 concurrency + module import
    println!("Copying generated Swift file...");
    let mut swift_content =
        fs::read_to_string(generated.join("grin.swift")).expect("Read swift file");
    swift_content = swift_content.replace(
        "private var initializationResult",
        "nonisolated(unsafe) private var initializationResult",
    );
    swift_content = swift_content.replace(
        "#if canImport(grinFFI)",
        "#if canImport(GrinRustFFI)",
    );
    swift_content = swift_content.replace("import grinFFI", "import GrinRustFFI");
    fs::write(wrapper_dest.join("grin.swift"), swift_content).expect("Write swift");

    // Copy header
    fs::copy(
        generated.join("grinFFI.h"),
        swift_dest.join("grinFFI.h"),
    )
    .expect("Copy header");

    // Write modulemap
    println!("Writing modulemap...");
    fs::write(
        swift_dest.join("module.modulemap"),
        "module GrinRustFFI {\n    header \"grinFFI.h\"\n    export *\n}\n",
    )
    .expect("Write modulemap");

    // Build universal static library
    println!("Building universal static library...");
    run_cmd(
        "cargo",
        &["build", "--release", "--target", "aarch64-apple-darwin"],
        &rust_dir,
    );
    run_cmd(
        "cargo",
        &["build", "--release", "--target", "x86_64-apple-darwin"],
        &rust_dir,
    );

    let lipo_out = swift_dest.join("libgrin.a");
    run_cmd(
        "lipo",
        &[
            "-create",
            "target/aarch64-apple-darwin/release/libgrin.a",
            "target/x86_64-apple-darwin/release/libgrin.a",
            "-output",
            lipo_out.to_str().expect("lipo output path"),
        ],
        &rust_dir,
    );

    println!("Done. Generated:");
    println!("  - {}/grin.swift", wrapper_dest.display());
    println!("  - {}/grinFFI.h", swift_dest.display());
    println!("  - {}/module.modulemap", swift_dest.display());
    println!("  - {}/libgrin.a", swift_dest.display());
    println!();
    println!("Note: GrinRust.swift is a manually maintained file (not generated).");
}

fn run_cmd(program: &str, args: &[&str], dir: &PathBuf) {
    let status = Command::new(program)
        .args(args)
        .current_dir(dir)
        .status()
        .unwrap_or_else(|e| panic!("Failed to run {}: {}", program, e));

    if !status.success() {
        panic!("{} failed with status: {}", program, status);
    }
}
