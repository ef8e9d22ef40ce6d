//! Build script for sdq-audit
//!
//! Exposes `SDQ_GIT_REV`, `SDQ_BUILD_TIMESTAMP` and `SDQ_BUILD_PROFILE` to the
//! binary so every audit log starts with the exact build that produced it.

use std::process::Command;

fn git_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let rev = String::from_utf8(output.stdout).ok()?;
    Some(rev.trim().to_string())
}

fn main() {
    let rev = git_revision().unwrap_or_else(|| "unknown".to_string());
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=SDQ_GIT_REV={}", rev);
    println!("cargo:rustc-env=SDQ_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=SDQ_BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=src");
}
