//! Build script for ros1-msgs
//!
//! Generates Rust types for the interface packages under `interfaces/`.

use std::env;
use std::path::Path;

use ros1msg::generator::Generator;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let interfaces = Path::new(&manifest_dir).join("interfaces");

    println!("cargo:rerun-if-changed={}", interfaces.display());

    let generated_dir = Path::new(&out_dir).join("generated");
    std::fs::create_dir_all(&generated_dir).unwrap();

    Generator::new()
        .header("// Auto-generated by ros1msg - do not edit")
        .package_search_path(&interfaces)
        .include_package("std_msgs")
        .include_package("test_msgs")
        .include_package("rospy_tutorials")
        .emit_rerun_if_changed(true)
        .output_dir(&generated_dir)
        .generate()
        .expect("Failed to generate ROS1 messages");
}
