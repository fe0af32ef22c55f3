//! Build script for csv-batch-loader.
//!
//! Stamps the git revision into `GIT_HASH` and renders shell completions and
//! a man page from `src/cli/definition.rs` into `OUT_DIR`. Failing to render
//! either is reported as a cargo warning and never fails the build.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate_to, Shell};

const BIN_NAME: &str = "csv-batch-loader";

// Completions and the man page carry the plain package version.
const VERSION: &str = env!("CARGO_PKG_VERSION");

include!("src/cli/definition.rs");

/// Short revision of HEAD, with `-dirty` when the tree has local changes.
fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let hash = String::from_utf8(output.stdout).ok()?;
    let dirty = Command::new("git")
        .args(["diff", "--quiet", "HEAD"])
        .status()
        .map(|status| !status.success())
        .unwrap_or(false);

    Some(format!("{}{}", hash.trim(), if dirty { "-dirty" } else { "" }))
}

fn write_completions(out_dir: &Path) -> io::Result<PathBuf> {
    let dir = out_dir.join("completions");
    fs::create_dir_all(&dir)?;

    let mut cmd = Cli::command();
    for shell in Shell::value_variants() {
        generate_to(*shell, &mut cmd, BIN_NAME, &dir)?;
    }
    Ok(dir)
}

fn write_man_page(out_dir: &Path) -> io::Result<PathBuf> {
    let dir = out_dir.join("man");
    fs::create_dir_all(&dir)?;

    let mut page = Vec::new();
    clap_mangen::Man::new(Cli::command()).render(&mut page)?;

    let path = dir.join(format!("{}.1", BIN_NAME));
    fs::write(&path, page)?;
    Ok(path)
}

fn main() {
    let revision = git_revision().unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_HASH={}", revision);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=src/cli/definition.rs");

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };

    if let Err(e) = write_completions(&out_dir) {
        println!("cargo:warning=shell completions not generated: {}", e);
    }
    if let Err(e) = write_man_page(&out_dir) {
        println!("cargo:warning=man page not generated: {}", e);
    }
}
