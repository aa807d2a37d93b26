/*
 * SPDX-FileCopyrightText: © 2025 Jinwoo Park (pmnxis@gmail.com)
 *
 * SPDX-License-Identifier: MIT OR Apache-2.0
 */

//! Generates `memory.x` for the bootloader partition and wires up the linker
//! scripts. Host builds (unit tests) get nothing.

use std::env;
use std::fs;
use std::path::PathBuf;

/// Bootloader partition, the user image starts right after it
const BOOTLOADER_ORIGIN: u32 = 0x0800_0000;
const BOOTLOADER_LENGTH: u32 = 0x8800;
const RAM_ORIGIN: u32 = 0x2000_0000;
const RAM_LENGTH: u32 = 20 * 1024;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();
    if !target.starts_with("thumbv") {
        return;
    }

    let memory_x = format!(
        "\
MEMORY
{{
  /* NOTE 1 K = 1 KiBi = 1024 bytes */
  FLASH : ORIGIN = {:#010x}, LENGTH = {:#x}
  RAM   : ORIGIN = {:#010x}, LENGTH = {:#x}
}}
",
        BOOTLOADER_ORIGIN, BOOTLOADER_LENGTH, RAM_ORIGIN, RAM_LENGTH
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    fs::write(out_dir.join("memory.x"), memory_x)
        .unwrap_or_else(|e| panic!("Failed to write memory.x: {}", e));

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var("CARGO_FEATURE_DEFMT").is_ok() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
