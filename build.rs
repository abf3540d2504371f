//! Build script: embeds the git hash and checks GPU toolkits for the
//! in-process Whisper backend.

use std::process::Command;

fn main() {
    // Embed git short hash for version string
    if let Ok(output) = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        && output.status.success()
    {
        let hash = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    if cfg!(feature = "cuda") {
        check_tool("nvcc", "--version", "CUDA toolkit (nvcc)");
    }
    if cfg!(feature = "vulkan") {
        check_tool("glslc", "--version", "Vulkan SDK (glslc)");
    }
}

fn check_tool(binary: &str, arg: &str, what: &str) {
    match Command::new(binary).arg(arg).output() {
        Ok(out) if out.status.success() => {}
        _ => {
            println!("cargo::warning={} not found; whisper-rs will likely fail to build", what);
            println!("cargo::warning=Install it or build without the GPU feature");
        }
    }
}
