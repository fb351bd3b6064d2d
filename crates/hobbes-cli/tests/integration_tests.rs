//! Black-box tests over the compiled `hobbes` binary.

use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Test context with an isolated hobbes home.
struct TestContext {
    temp_dir: TempDir,
    hobbes_home: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let hobbes_home = temp_dir.path().join(".hobbes");
        Self {
            temp_dir,
            hobbes_home,
        }
    }

    fn hobbes_cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_hobbes"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env("HOBBES_HOME", &self.hobbes_home);
        cmd
    }
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .arg("--help")
        .output()
        .expect("failed to run hobbes");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("install"));
    assert!(stdout.contains("upgrade"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .arg("--version")
        .output()
        .expect("failed to run hobbes");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_list_empty_home() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .arg("list")
        .output()
        .expect("failed to run hobbes");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No packages installed"));
}

#[test]
fn test_info_unknown_package_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .args(["info", "ghost"])
        .output()
        .expect("failed to run hobbes");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not installed"));
}

#[test]
fn test_uninstall_unknown_package_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .args(["uninstall", "ghost"])
        .output()
        .expect("failed to run hobbes");
    assert!(!output.status.success());
}

#[test]
fn test_install_rejects_bad_spec() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .args(["install", "not-a-repo-spec"])
        .output()
        .expect("failed to run hobbes");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("owner/repo"));
}

#[test]
fn test_list_reads_existing_manifest() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(&ctx.hobbes_home).unwrap();
    std::fs::write(
        ctx.hobbes_home.join("manifest.toml"),
        r#"version = 1

[packages.fzf]
repo = "junegunn/fzf"
version = "0.46.0"
tag = "v0.46.0"
asset = "fzf-0.46.0-linux_amd64.tar.gz"
binaries = ["fzf"]
pinned = true
installed_at = "2026-01-15T10:30:00Z"
"#,
    )
    .unwrap();

    let output = ctx
        .hobbes_cmd()
        .arg("list")
        .output()
        .expect("failed to run hobbes");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("fzf"));
    assert!(stdout.contains("0.46.0"));
    assert!(stdout.contains("pinned"));
}

#[test]
fn test_corrupt_manifest_is_reported() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(&ctx.hobbes_home).unwrap();
    std::fs::write(ctx.hobbes_home.join("manifest.toml"), "not { valid toml").unwrap();

    let output = ctx
        .hobbes_cmd()
        .arg("list")
        .output()
        .expect("failed to run hobbes");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("manifest"));
}

#[test]
fn test_pin_unknown_package_fails() {
    let ctx = TestContext::new();
    let output = ctx
        .hobbes_cmd()
        .args(["pin", "ghost"])
        .output()
        .expect("failed to run hobbes");
    assert!(!output.status.success());
}

#[test]
fn test_pin_then_unpin_roundtrip() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(&ctx.hobbes_home).unwrap();
    std::fs::write(
        ctx.hobbes_home.join("manifest.toml"),
        r#"version = 1

[packages.bat]
repo = "sharkdp/bat"
version = "0.24.0"
tag = "v0.24.0"
asset = "bat-v0.24.0-x86_64-unknown-linux-gnu.tar.gz"
binaries = ["bat"]
installed_at = "2026-01-15T10:30:00Z"
"#,
    )
    .unwrap();

    let pin = ctx.hobbes_cmd().args(["pin", "bat"]).output().unwrap();
    assert!(pin.status.success());
    let manifest = std::fs::read_to_string(ctx.hobbes_home.join("manifest.toml")).unwrap();
    assert!(manifest.contains("pinned = true"));

    let unpin = ctx.hobbes_cmd().args(["unpin", "bat"]).output().unwrap();
    assert!(unpin.status.success());
    let manifest = std::fs::read_to_string(ctx.hobbes_home.join("manifest.toml")).unwrap();
    assert!(!manifest.contains("pinned = true"));
}
