//! Stamps the startup banner with the source revision, build time and
//! cargo profile.

use std::env;
use std::path::Path;
use std::process::Command;

const UNKNOWN: &str = "unknown";

fn main() {
    watch_git_head();

    let stamps = [
        ("GIT_HASH", source_revision()),
        ("BUILD_TIMESTAMP", build_time()),
        ("BUILD_PROFILE", env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.into())),
    ];
    for (key, value) in stamps {
        println!("cargo:rustc-env={key}={value}");
    }
}

/// Commit the binary was built from, with a `-dirty` suffix for local edits
fn source_revision() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return UNKNOWN.into();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{hash}-dirty"),
        _ => hash,
    }
}

/// UTC so banners from different machines compare directly
fn build_time() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

/// Rebuild when the checked-out commit moves
fn watch_git_head() {
    println!("cargo:rerun-if-changed=build.rs");

    let Some(git_dir) = git(&["rev-parse", "--git-dir"]) else {
        return;
    };
    let head = Path::new(&git_dir).join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }
    if let Some(reference) = git(&["symbolic-ref", "-q", "HEAD"]) {
        let target = Path::new(&git_dir).join(reference);
        if target.exists() {
            println!("cargo:rerun-if-changed={}", target.display());
        }
    }
}
