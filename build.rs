/// Expose build metadata to `shipnote version`.
///
/// `TARGET` is the compilation target triple; `SHIPNOTE_GIT_SHA` is the
/// short commit hash of the source tree, or `unknown` outside a checkout.
fn main() {
    println!(
        "cargo:rustc-env=TARGET={}",
        std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );

    let sha = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).trim().to_string())
        .filter(|sha| !sha.is_empty())
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=SHIPNOTE_GIT_SHA={sha}");
    println!("cargo:rerun-if-changed=.git/HEAD");
}
