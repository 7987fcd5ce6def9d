use std::process::Command;

/// `git describe` output for the working tree, if git and tags are available
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let described = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!described.is_empty()).then_some(described)
}

fn main() {
    let base = env!("CARGO_PKG_VERSION");

    // 0.3.0 or 0.3.0+v0.2.1-4-gdeadbee-dirty
    let version = match git_describe() {
        Some(described) => format!("{}+{}", base, described),
        None => base.to_string(),
    };

    println!("cargo:rustc-env=APP_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}
