//! Build script for procam-server
//!
//! Rebuild when the embedded pages change.

fn main() {
    println!("cargo:rerun-if-changed=static");
    println!("cargo:rerun-if-changed=static/public");
}
