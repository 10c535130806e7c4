use super::*;
use clap::Parser;
use serial_test::serial;
use std::fs;
use tempfile::tempdir;

const ENV_VARS: &[&str] = &[
    "LINEKV_ADDR",
    "LINEKV_PORT",
    "LINEKV_USER",
    "LINEKV_PASSWORD",
    "LINEKV_DB",
];

fn clear_env() {
    for var in ENV_VARS {
        unsafe { std::env::remove_var(var) };
    }
}

fn parse(args: &[&str]) -> Cli {
    clear_env();
    Cli::try_parse_from(std::iter::once("linekv").chain(args.iter().copied()))
        .expect("valid arguments")
}

#[test]
#[serial]
fn defaults_apply_when_only_addr_given() {
    let settings =
        Settings::resolve(&parse(&["--addr", "127.0.0.1"]), ConnectionProfile::default())
            .expect("resolve");

    assert_eq!(
        settings.connect,
        ConnectOptions {
            addr: "127.0.0.1".into(),
            port: 3322,
            user: "linekv".into(),
            password: "linekv".into(),
            database: "defaultdb".into(),
        }
    );
    assert_eq!(
        settings.pipeline,
        PipelineConfig {
            mode: Mode::Write,
            batch_size: 1000,
            offset: 0,
            prefix: "LINE".into(),
            queue_depth: 1024,
            max_line_bytes: 32 * 1024,
        }
    );
}

#[test]
#[serial]
fn flags_map_onto_pipeline_config() {
    let cli = parse(&[
        "--addr",
        "db",
        "--batchsize",
        "3",
        "--offset",
        "500",
        "--prefix",
        "ROW",
        "--readback",
        "--queue-depth",
        "0",
    ]);

    let settings = Settings::resolve(&cli, ConnectionProfile::default()).expect("resolve");

    assert_eq!(settings.pipeline.mode, Mode::Verify);
    assert_eq!(settings.pipeline.batch_size, 3);
    assert_eq!(settings.pipeline.offset, 500);
    assert_eq!(settings.pipeline.prefix, "ROW");
    assert_eq!(settings.pipeline.queue_depth, 0);
}

#[test]
#[serial]
fn flags_override_profile_and_profile_overrides_defaults() {
    let profile = ConnectionProfile {
        addr: Some("from-profile".into()),
        port: Some(4000),
        user: Some("ingest".into()),
        password: None,
        database: Some("lines".into()),
    };
    let cli = parse(&["--addr", "from-flag", "--db", "other"]);

    let settings = Settings::resolve(&cli, profile).expect("resolve");

    assert_eq!(settings.connect.addr, "from-flag");
    assert_eq!(settings.connect.port, 4000);
    assert_eq!(settings.connect.user, "ingest");
    assert_eq!(settings.connect.password, "linekv");
    assert_eq!(settings.connect.database, "other");
}

#[test]
#[serial]
fn missing_or_blank_address_is_rejected() {
    let cases: &[(&str, &[&str], Option<&str>)] = &[
        ("nothing", &[], None),
        ("blank flag", &["--addr", "  "], None),
        ("blank profile", &[], Some("")),
    ];

    for (name, args, profile_addr) in cases {
        let profile = ConnectionProfile {
            addr: profile_addr.map(str::to_string),
            ..ConnectionProfile::default()
        };
        let err = Settings::resolve(&parse(args), profile).expect_err(name);
        assert!(
            err.to_string().contains("no store address"),
            "{name}: got {err:#}"
        );
    }
}

#[test]
#[serial]
fn zero_batch_size_is_rejected_at_startup() {
    let cli = parse(&["--addr", "db", "--batchsize", "0"]);

    let err = Settings::resolve(&cli, ConnectionProfile::default()).expect_err("batch size 0");
    assert!(err.to_string().contains("batch size"), "got {err:#}");
}

#[test]
#[serial]
fn oversized_batches_are_rejected_at_startup() {
    let cli = parse(&["--addr", "db", "--max-line-bytes", "1048576"]);

    let err = Settings::resolve(&cli, ConnectionProfile::default())
        .expect_err("1000 lines of 1 MiB cannot fit in one request");
    assert!(err.to_string().contains("request limit"), "got {err:#}");
}

#[test]
#[serial]
fn negative_offset_is_a_parse_error() {
    clear_env();
    let res = Cli::try_parse_from(["linekv", "--addr", "db", "--offset", "-5"]);
    assert!(res.is_err(), "negative offsets cannot be represented");
}

#[test]
#[serial]
fn environment_supplies_connection_flags() {
    clear_env();
    unsafe {
        std::env::set_var("LINEKV_ADDR", "env-host");
        std::env::set_var("LINEKV_PASSWORD", "from-env");
    }
    let cli = Cli::try_parse_from(["linekv"]).expect("parse");
    clear_env();

    let settings = Settings::resolve(&cli, ConnectionProfile::default()).expect("resolve");
    assert_eq!(settings.connect.addr, "env-host");
    assert_eq!(settings.connect.password, "from-env");
}

#[test]
#[serial]
fn from_cli_reads_explicit_profile() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("profile.json");
    fs::write(&path, r#"{"addr":"profile-host","port":7000}"#).expect("write profile");

    let cli = parse(&["--profile", path.to_str().expect("utf8 path")]);
    let settings = Settings::from_cli(&cli).expect("resolve");

    assert_eq!(settings.connect.addr, "profile-host");
    assert_eq!(settings.connect.port, 7000);
}

#[test]
#[serial]
fn from_cli_fails_on_missing_explicit_profile() {
    let dir = tempdir().expect("create temp dir");
    let path = dir.path().join("absent.json");

    let cli = parse(&["--addr", "db", "--profile", path.to_str().expect("utf8 path")]);
    assert!(Settings::from_cli(&cli).is_err());
}
