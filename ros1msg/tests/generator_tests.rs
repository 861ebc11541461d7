use ros1msg::generator::{
    DEFAULT_NAMESPACE, DEFAULT_RUNTIME_PATH, FieldInfo, Generator, GeneratorConfig, ItemInfo,
    ModuleInfo, ModuleLevel, ParseCallbacks,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper to create a temporary interface file under `<package>/<kind>/`
fn create_interface_file(
    dir: &TempDir,
    package: &str,
    kind: &str,
    name: &str,
    content: &str,
) -> PathBuf {
    let kind_dir = dir.path().join(package).join(kind);
    fs::create_dir_all(&kind_dir).unwrap();
    let file_path = kind_dir.join(format!("{name}.{kind}"));
    fs::write(&file_path, content).unwrap();
    file_path
}

#[test]
fn test_generate_message_with_header_and_constants() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file = create_interface_file(
        &temp_dir,
        "sensor_demo",
        "msg",
        "RangeReading",
        "# Single range reading\nuint8 ULTRASOUND=0\nuint8 INFRARED=1\n\nHeader header\nuint8 radiation_type\nfloat32 range\n",
    );

    Generator::new()
        .header("// Auto-generated - do not edit")
        .include(&msg_file)
        .allowlist_recursively(true)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code =
        fs::read_to_string(output_dir.join("sensor_demo/msg/range_reading.rs")).unwrap();
    assert!(code.starts_with("// Auto-generated - do not edit"));
    assert!(code.contains("pub struct RangeReading"));
    assert!(code.contains("pub header: super::super::super::std_msgs::msg::header::Header"));
    assert!(code.contains("pub const ULTRASOUND: u8 = 0;"));
    assert!(code.contains("pub const INFRARED: u8 = 1;"));
    assert!(code.contains("\"sensor_demo/RangeReading\""));
    assert!(code.contains("MSG: std_msgs/Header"));

    let header = fs::read_to_string(output_dir.join("std_msgs/msg/header.rs")).unwrap();
    assert!(header.contains("2176decaecbce78abc3b96ef049fabed"));
}

#[test]
fn test_generate_service() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let srv_file = create_interface_file(
        &temp_dir,
        "rospy_tutorials",
        "srv",
        "AddTwoInts",
        "int64 a\nint64 b\n---\nint64 sum\n",
    );

    Generator::new()
        .include(&srv_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code =
        fs::read_to_string(output_dir.join("rospy_tutorials/srv/add_two_ints.rs")).unwrap();
    assert!(code.contains("pub struct AddTwoIntsRequest"));
    assert!(code.contains("pub struct AddTwoIntsResponse"));
    assert!(code.contains("pub struct AddTwoInts;"));
    assert!(code.contains("6a2e34150c00229791cc89ff309fff21"));
    assert!(code.contains("36d09b846be0b371c5f190354dd3153e"));
    assert!(code.contains("b88405221c77b1878a3cbbfff53428d7"));

    let srv_mod = fs::read_to_string(output_dir.join("rospy_tutorials/srv/mod.rs")).unwrap();
    assert!(srv_mod.contains("pub mod add_two_ints;"));
    assert!(srv_mod.contains("pub use add_two_ints::*;"));
}

#[test]
fn test_search_path_resolves_cross_package_types() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    create_interface_file(
        &temp_dir,
        "geometry_demo",
        "msg",
        "Point",
        "float64 x\nfloat64 y\nfloat64 z\n",
    );
    let path_file = create_interface_file(
        &temp_dir,
        "nav_demo",
        "msg",
        "Path",
        "Header header\ngeometry_demo/Point[] points\n",
    );

    Generator::new()
        .package_search_path(temp_dir.path())
        .include(&path_file)
        .allowlist_recursively(true)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    assert!(output_dir.join("nav_demo/msg/path.rs").is_file());
    assert!(output_dir.join("geometry_demo/msg/point.rs").is_file());
    assert!(output_dir.join("std_msgs/msg/header.rs").is_file());

    let root = fs::read_to_string(output_dir.join("mod.rs")).unwrap();
    assert!(root.contains("pub mod geometry_demo;"));
    assert!(root.contains("pub mod nav_demo;"));
    assert!(root.contains("pub mod std_msgs;"));
}

#[test]
fn test_unresolved_type_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file =
        create_interface_file(&temp_dir, "demo", "msg", "Broken", "missing_pkg/Thing thing\n");

    let result = Generator::new()
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate();

    let err = result.unwrap_err().to_string();
    assert!(err.contains("missing_pkg/Thing"), "unexpected error: {err}");
    assert!(!output_dir.exists());
}

#[test]
fn test_parse_error_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file = create_interface_file(&temp_dir, "demo", "msg", "Dup", "int32 x\nint32 x\n");

    let result = Generator::new()
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate();
    assert!(result.is_err());
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("demo").join("action");
    fs::create_dir_all(&dir).unwrap();
    let file = dir.join("Fibonacci.action");
    fs::write(&file, "int32 order\n---\nint32[] sequence\n---\nint32[] partial\n").unwrap();

    let result = Generator::new()
        .include(&file)
        .output_dir(temp_dir.path().join("generated"))
        .generate();
    assert!(result.is_err());
}

struct RenamingCallbacks;

impl ParseCallbacks for RenamingCallbacks {
    fn item_name(&self, info: &ItemInfo) -> Option<String> {
        Some(format!("Ros{}", info.name()))
    }

    fn field_name(&self, info: &FieldInfo) -> Option<String> {
        (info.field_name() == "data").then(|| "payload".to_string())
    }

    fn add_derives(&self, _info: &ItemInfo) -> Vec<String> {
        vec!["Clone".to_string(), "PartialOrd".to_string()]
    }

    fn custom_impl(&self, info: &ItemInfo) -> Option<String> {
        Some(format!(
            "impl Ros{} {{ pub const SOURCE: &'static str = \"{}\"; }}",
            info.name(),
            info.package()
        ))
    }

    fn post_module(&self, info: &ModuleInfo) -> Option<String> {
        matches!(info.module_level(), ModuleLevel::Package)
            .then(|| format!("// package {}", info.module_name()))
    }
}

#[test]
fn test_callbacks_customize_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file = create_interface_file(&temp_dir, "demo", "msg", "Blob", "uint8[] data\n");

    Generator::new()
        .parse_callbacks(Box::new(RenamingCallbacks))
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code = fs::read_to_string(output_dir.join("demo/msg/blob.rs")).unwrap();
    assert!(code.contains("pub struct RosBlob"));
    assert!(code.contains("pub payload: ::std::vec::Vec<u8>"));
    assert!(code.contains("PartialOrd"));
    assert!(code.contains("pub const SOURCE: &'static str = \"demo\";"));
    // the wire definition keeps the declared field name
    assert!(code.contains("uint8[] data"));

    let root = fs::read_to_string(output_dir.join("mod.rs")).unwrap();
    assert!(root.contains("pub mod demo;\n// package demo"));
}

struct AnnotatingCallbacks;

impl ParseCallbacks for AnnotatingCallbacks {
    fn add_attributes(&self, info: &ItemInfo) -> Vec<String> {
        if info.package() == "shapes" {
            vec!["#[repr(C)]".to_string()]
        } else {
            Vec::new()
        }
    }

    fn add_field_attributes(&self, info: &FieldInfo) -> Vec<String> {
        assert_eq!(info.parent().to_string(), "shapes/Cuboid");
        match info.array_size() {
            Some(4) => {
                assert_eq!(info.field_type().to_string(), "int32[4]");
                assert_eq!(info.rust_type(), "[i32; 4]");
                vec!["#[cfg_attr(feature = \"serde\", serde(skip))]".to_string()]
            }
            _ => Vec::new(),
        }
    }

    fn custom_impl(&self, info: &ItemInfo) -> Option<String> {
        let source = info.source_file()?.file_name()?.to_string_lossy().into_owned();
        Some(format!(
            "impl {} {{ pub const SOURCE: &'static str = \"{source}\"; pub const CHECKSUM: &'static str = \"{}\"; }}",
            info.name(),
            info.md5sum()?
        ))
    }

    fn pre_module(&self, info: &ModuleInfo) -> Option<String> {
        Some(format!("// module {}", info.path()))
    }
}

#[test]
fn test_item_and_field_hooks_see_ros_metadata() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file = create_interface_file(
        &temp_dir,
        "shapes",
        "msg",
        "Cuboid",
        "int32[4] corners\nstring label\n",
    );

    Generator::new()
        .parse_callbacks(Box::new(AnnotatingCallbacks))
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code = fs::read_to_string(output_dir.join("shapes/msg/cuboid.rs")).unwrap();
    assert!(code.contains("#[repr(C)]"));
    assert!(code.contains("serde(skip)"));
    assert_eq!(code.matches("serde(skip)").count(), 1);
    assert!(code.contains("pub const SOURCE: &'static str = \"Cuboid.msg\";"));
    assert!(code.contains("pub const CHECKSUM: &'static str = \"829692154242f92479fea28320717a3a\";"));

    let root = fs::read_to_string(output_dir.join("mod.rs")).unwrap();
    assert!(root.contains("// module shapes\npub mod shapes;"));
    let package = fs::read_to_string(output_dir.join("shapes/mod.rs")).unwrap();
    assert!(package.contains("// module shapes::msg\npub mod msg;"));
    let kind = fs::read_to_string(output_dir.join("shapes/msg/mod.rs")).unwrap();
    assert!(kind.contains("// module shapes::msg::cuboid\npub mod cuboid;"));
}

#[test]
fn test_custom_runtime_path_and_namespace() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file =
        create_interface_file(&temp_dir, "demo", "msg", "Stamp", "time stamp\nduration age\n");

    Generator::new()
        .runtime_path("crate::rt")
        .namespace("robot")
        .derive_debug(false)
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code = fs::read_to_string(output_dir.join("demo/msg/stamp.rs")).unwrap();
    assert!(code.contains("crate::rt::Time"));
    assert!(code.contains("crate::rt::Duration"));
    assert!(code.contains("\"robot.demo.Stamp\""));
    assert!(!code.contains("::ros1_types::"));
    assert!(!code.contains("Debug"));
}

#[test]
fn test_default_runtime_path_and_namespace() {
    let config = GeneratorConfig::new();
    assert_eq!(config.runtime_path, DEFAULT_RUNTIME_PATH);
    assert_eq!(config.namespace, DEFAULT_NAMESPACE);

    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");
    let msg_file = create_interface_file(&temp_dir, "demo", "msg", "Stamp", "time stamp\n");
    Generator::new()
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code = fs::read_to_string(output_dir.join("demo/msg/stamp.rs")).unwrap();
    assert!(code.contains(&format!("{DEFAULT_RUNTIME_PATH}::Time")));
    assert!(code.contains(&format!("\"{DEFAULT_NAMESPACE}.demo.Stamp\"")));
}

#[test]
fn test_regeneration_overwrites_previous_output() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("generated");

    let msg_file = create_interface_file(&temp_dir, "demo", "msg", "Counter", "int32 count\n");
    Generator::new()
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    fs::write(&msg_file, "int64 count\n").unwrap();
    Generator::new()
        .include(&msg_file)
        .output_dir(&output_dir)
        .generate()
        .unwrap();

    let code = fs::read_to_string(output_dir.join("demo/msg/counter.rs")).unwrap();
    assert!(code.contains("pub count: i64"));
    let leftovers = fs::read_dir(output_dir.join("demo/msg"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count();
    assert_eq!(leftovers, 0);
}
