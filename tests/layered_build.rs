//! End-to-end builds over the fixture parameter files and launch profiles.

mod fixtures;

use std::fs;

use fixtures::{isolated_builder, params_path, params_spec, profile_path};
use ros2_launch_helpers::config::{SourceOrigin, StrictOptions};
use ros2_launch_helpers::source::{ResolveEnv, SourceReader};
use ros2_launch_helpers::value::mapping_from_json;
use ros2_launch_helpers::{
    get_params, BuildRequest, ConfigError, LayeredConfigBuilder, ParamValue, RemapEntry,
    SourceError,
};
use serde_json::json;
use tempfile::TempDir;

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn test_sim_profile_end_to_end() {
    let request = BuildRequest::from_profile(&profile_path("sim.yaml")).unwrap();
    let config = isolated_builder().build(&request).unwrap();

    // parameters
    assert_eq!(config.get_bool("/**.ros__parameters.use_sim_time"), Some(true));
    assert_eq!(config.get_i64("talker.ros__parameters.rate"), Some(10));
    assert_eq!(
        config.get("talker.ros__parameters.frames"),
        Some(&ParamValue::List(vec![ParamValue::from("sim_map")]))
    );
    assert_eq!(config.get_f64("talker.ros__parameters.gains.p"), Some(1.0));
    assert_eq!(config.get_f64("talker.ros__parameters.gains.i"), Some(0.2));
    assert_eq!(config.get_f64("talker.ros__parameters.gains.d"), Some(0.01));
    assert_eq!(config.get_i64("listener.ros__parameters.queue"), Some(5));

    // remappings: defaults < file < cli
    assert_eq!(
        config.remappings(),
        pairs(&[
            ("/cmd_vel", "/robot/cmd_vel"),
            ("/chatter", "/robot/chatter"),
            ("/odom", "/robot/odom"),
            ("/scan", "/front/scan"),
        ])
    );

    // options
    assert_eq!(
        config.node_options().to_args(),
        vec![
            "name=talker",
            "output=both",
            "emulate_tty=true",
            "respawn=false",
            "respawn_delay=0.0",
        ]
    );
    assert_eq!(
        config.ros_arguments().to_args(),
        vec!["--use_sim_time false", "--verbose"]
    );
    assert_eq!(
        config.log_ros_args(),
        vec!["--log-level", "debug", "--log-level", "talker:=warn"]
    );

    // node selection
    assert_eq!(config.node_name(), Some("talker"));
    assert_eq!(
        config.node_params(),
        Some(&mapping_from_json(json!({
            "use_sim_time": true,
            "qos_depth": 10,
            "rate": 10,
            "topic": "chatter",
            "frames": ["sim_map"],
            "gains": {"p": 1.0, "i": 0.2, "d": 0.01}
        })))
    );

    // provenance
    let origins: Vec<SourceOrigin> = config.sources().iter().map(|s| s.origin).collect();
    assert_eq!(
        origins,
        vec![SourceOrigin::Base, SourceOrigin::Overlay, SourceOrigin::Remappings]
    );
    assert!(config.sources().iter().all(|s| s.digest.is_some()));
}

#[test]
fn test_robot_profile_toml() {
    let request = BuildRequest::from_profile(&profile_path("robot.toml")).unwrap();
    let config = isolated_builder().build(&request).unwrap();

    assert_eq!(config.get_i64("talker.ros__parameters.rate"), Some(50));
    // null in the robot overlay leaves the base value alone
    assert_eq!(config.get_str("talker.ros__parameters.topic"), Some("chatter"));
    assert_eq!(config.get_str("talker.ros__parameters.robot"), Some("r1"));

    assert_eq!(config.remappings(), pairs(&[("/chatter", "/r1/chatter")]));

    let node = config.typed_node_options();
    assert!(node.respawn);
    assert_eq!(node.respawn_delay, 2.5);
    assert_eq!(node.name, None);
}

#[test]
fn test_cli_flags_override_profile() {
    let mut request = BuildRequest::from_profile(&profile_path("sim.yaml")).unwrap();
    request.remaps.launch_arg = "/scan:=/rear/scan".to_string();
    request = request.with_overlay(params_spec("params.toml"));

    let config = isolated_builder().build(&request).unwrap();
    assert_eq!(config.remap_set().get("/scan"), Some("/rear/scan"));
    assert_eq!(config.get_i64("talker.ros__parameters.rate"), Some(25));
    assert_eq!(
        config.get_str("talker.ros__parameters.label"),
        Some("from toml")
    );
}

#[test]
fn test_get_params_matches_builder() {
    let base = params_spec("base.yaml");
    let overlays = format!(
        "{}, {}",
        params_spec("overlay_sim.yaml"),
        params_spec("overlay_robot.yaml")
    );

    let params = get_params(&base, &overlays).unwrap();

    let request = BuildRequest::new(base.as_str())
        .with_overlay(params_spec("overlay_sim.yaml"))
        .with_overlay(params_spec("overlay_robot.yaml"));
    let config = isolated_builder().build(&request).unwrap();

    assert_eq!(&params, config.parameters());
}

#[test]
fn test_duplicate_overlays_are_skipped() {
    let base = params_spec("base.yaml");
    let sim = params_spec("overlay_sim.yaml");
    let once = get_params(&base, &sim).unwrap();
    let repeated = get_params(&base, &format!("{0},{1},{0},,", sim, base)).unwrap();
    assert_eq!(once, repeated);
}

#[test]
fn test_package_uri_resolution() {
    let prefix = TempDir::new().unwrap();
    let index = prefix
        .path()
        .join("share/ament_index/resource_index/packages");
    fs::create_dir_all(&index).unwrap();
    fs::write(index.join("demo_bringup"), "").unwrap();

    let config_dir = prefix.path().join("share/demo_bringup/config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::copy(params_path("base.yaml"), config_dir.join("base.yaml")).unwrap();

    let builder = LayeredConfigBuilder::with_reader(SourceReader::with_env(ResolveEnv {
        ament_prefixes: Some(vec![prefix.path().to_path_buf()]),
        home: None,
    }));

    let config = builder
        .build(&BuildRequest::new("package://demo_bringup/config/base.yaml"))
        .unwrap();
    assert_eq!(config.get_i64("talker.ros__parameters.rate"), Some(10));

    let err = builder
        .build(&BuildRequest::new("package://missing_pkg/config/base.yaml"))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Source(SourceError::PackageNotFound { .. })
    ));
}

#[test]
fn test_source_errors_abort() {
    let builder = isolated_builder();

    let err = builder
        .build(&BuildRequest::new(params_spec("does_not_exist.yaml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Source(ref e) if e.is_not_found()));
    assert!(err.to_string().contains("does_not_exist.yaml"));

    let err = builder
        .build(&BuildRequest::new(params_spec("not_a_mapping.yaml")))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Source(SourceError::Parse { .. })));

    let err = builder
        .build(
            &BuildRequest::new(params_spec("base.yaml")).with_overlay(params_spec("broken.yaml")),
        )
        .unwrap_err();
    assert!(matches!(err, ConfigError::Source(SourceError::Parse { .. })));
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn test_parse_errors_abort() {
    let builder = isolated_builder();
    let base = params_spec("base.yaml");

    let err = builder
        .build(&BuildRequest::new(base.as_str()).with_cli_remaps("a:=b,onlyfromname"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Remap(_)));

    let err = builder
        .build(&BuildRequest::new(base.as_str()).with_node_options("output=log,,respawn=true"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Options(_)));

    let err = builder
        .build(&BuildRequest::new(base.as_str()).with_log_options("log-level=loud"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Options(_)));
}

#[test]
fn test_strict_overlay_against_fixture() {
    let request = BuildRequest::new(params_spec("base.yaml"))
        .with_overlay(params_spec("overlay_robot.yaml"))
        .with_strict(StrictOptions {
            allow_none: false,
            numeric_compat: false,
        });
    let config = isolated_builder().build(&request).unwrap();

    assert_eq!(config.get_i64("talker.ros__parameters.rate"), Some(50));
    // unknown keys are not added, nulls are not applied
    assert_eq!(config.get("talker.ros__parameters.robot"), None);
    assert_eq!(config.get_str("talker.ros__parameters.topic"), Some("chatter"));
}

#[test]
fn test_remap_defaults_from_code() {
    let request = BuildRequest::new(params_spec("base.yaml"))
        .with_remap_defaults(vec![
            RemapEntry::new("/cmd_vel", "/default/cmd_vel"),
            RemapEntry::new("/odom", "/default/odom"),
        ])
        .with_remap_file(params_spec("remaps.yaml"));
    let config = isolated_builder().build(&request).unwrap();

    assert_eq!(
        config.remappings(),
        pairs(&[
            ("/cmd_vel", "/default/cmd_vel"),
            ("/odom", "/robot/odom"),
            ("/chatter", "/robot/chatter"),
            ("/scan", "/robot/scan"),
        ])
    );
}
