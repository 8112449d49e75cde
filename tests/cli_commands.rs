//! Integration tests for the `refgen` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

fn create_package(temp_dir: &TempDir) {
    let root = temp_dir.path().join("shop");
    write(&root.join("__init__.py"), "from .cart import Cart\n");
    write(
        &root.join("cart.py"),
        "class Cart:\n    pass\n\n\ndef checkout(cart):\n    pass\n",
    );
    write(&root.join("tests").join("__init__.py"), "");
    write(
        &root.join("tests").join("test_cart.py"),
        "def test_cart():\n    pass\n",
    );
}

/// Runs the binary inside `dir` so no stray `refgen.toml` is picked up.
fn refgen(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_refgen"))
        .current_dir(dir)
        .env("RUST_LOG", "refgen=warn")
        .args(args)
        .output()
        .expect("Failed to run refgen")
}

#[test]
fn test_generate_writes_reference() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_package(&temp_dir);

    let output = refgen(
        temp_dir.path(),
        &["generate", "shop", "-o", "ref", "--exclude-dir", "tests"],
    );

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Documented 1 packages, 2 symbol stubs"));
    assert!(temp_dir.path().join("ref").join("shop.rst").is_file());
    assert!(temp_dir.path().join("ref").join("shop.cart.Cart.rst").is_file());
    assert!(!temp_dir.path().join("ref").join("shop.tests.rst").exists());
}

#[test]
fn test_generate_reads_config_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_package(&temp_dir);
    write(
        &temp_dir.path().join("refgen.toml"),
        "root = \"shop\"\ndestination = \"docs/api\"\nsuffix = \"txt\"\nexclude_dirs = [\"tests\"]\n",
    );

    let output = refgen(temp_dir.path(), &["generate"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(temp_dir.path().join("docs/api/shop.txt").is_file());
    assert!(temp_dir.path().join("docs/api/shop.cart.checkout.txt").is_file());
}

#[test]
fn test_packages_json() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_package(&temp_dir);

    let output = refgen(temp_dir.path(), &["packages", "shop", "--format", "json"]);

    assert!(output.status.success());
    let packages: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = packages
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["shop", "shop.tests"]);
    assert!(!temp_dir.path().join("reference").exists());
}

#[test]
fn test_members_and_shortest() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_package(&temp_dir);

    let output = refgen(temp_dir.path(), &["members", "shop.cart", "--root", "shop"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Classes:\n  Cart\n"));
    assert!(stdout.contains("Functions:\n  checkout\n"));

    let output = refgen(
        temp_dir.path(),
        &["shortest", "shop.cart", "Cart", "--root", "shop"],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "from shop import Cart\n");
}

#[test]
fn test_resolution_failure_exits_nonzero() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_package(&temp_dir);

    let output = refgen(
        temp_dir.path(),
        &["shortest", "shop.cart", "Basket", "--root", "shop"],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Couldn't import shop.cart.Basket"));
}

#[test]
fn test_missing_root_exits_nonzero() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");

    let output = refgen(temp_dir.path(), &["generate", "missing"]);

    assert!(!output.status.success());
    assert!(!temp_dir.path().join("reference").exists());
}
