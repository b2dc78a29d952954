use std::fs;

use bytes::Bytes;
use pretty_assertions::assert_eq;
use r4x_configuration::{BodyLengthConfig, Config, ConfigError, RedisConfig};
use r4x_core::BodyLength;
use r4x_http::{Fragment, LocationError, TemplateError};
use r4x_redis::Endpoint;

const MINIMAL: &str = r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/get/{key}"
        command: ["GET", "{path.key}"]
"#;

#[test]
fn test_defaults() {
    let config = Config::from_yaml(MINIMAL).expect("failed to parse");

    assert_eq!(config.body_length, BodyLengthConfig::Exact);
    assert_eq!(config.servers.len(), 1);
    assert_eq!(config.servers[0].redis, RedisConfig::default());
    assert_eq!(config.servers[0].locations[0].script, None);

    let gateway = config.compile().expect("failed to compile");
    let server = &gateway.servers[0];
    assert_eq!(server.listen, "127.0.0.1:8080".parse().unwrap());
    assert_eq!(server.endpoint, Endpoint::new("127.0.0.1", 6379));
    assert_eq!(server.routes.len(), 1);
    assert_eq!(gateway.encoder.body_length(), BodyLength::Exact);
}

#[test]
fn test_terminated_body_length() {
    let yaml = format!("body_length: terminated\n{MINIMAL}");
    let config = Config::from_yaml(&yaml).expect("failed to parse");

    assert_eq!(config.body_length, BodyLengthConfig::Terminated);
    let gateway = config.compile().expect("failed to compile");
    assert_eq!(gateway.encoder.body_length(), BodyLength::Terminated);
}

#[test]
fn test_redis_endpoint_and_route_order() {
    let yaml = r#"
servers:
  - listen: "0.0.0.0:9000"
    redis:
      host: "cache.internal"
      port: 6380
    locations:
      - path: "/user/{id}"
        command: ["HGETALL", "user:{path.id}"]
      - path: "/{tail}*"
        command: ["PING"]
"#;
    let gateway = Config::from_yaml(yaml).unwrap().compile().unwrap();
    let server = &gateway.servers[0];

    assert_eq!(server.endpoint, Endpoint::new("cache.internal", 6380));
    let (location, captures) = server.routes.route("/user/7").unwrap();
    assert_eq!(location.path(), "/user/{id}");
    assert_eq!(captures, vec![("id".to_owned(), "7".to_owned())]);
    let (location, _) = server.routes.route("/anything/else").unwrap();
    assert_eq!(location.path(), "/{tail}*");
}

#[test]
fn test_empty_command_is_rejected() {
    let yaml = r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/nothing"
"#;
    let err = Config::from_yaml(yaml).unwrap().compile().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Location(LocationError::EmptyCommand(ref path)) if path == "/nothing"
    ));
}

#[test]
fn test_bad_path_regex_is_a_config_error() {
    let yaml = r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/k/{id:[}"
        command: ["GET", "{path.id}"]
"#;
    let err = Config::from_yaml(yaml).unwrap().compile().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Location(LocationError::InvalidPattern { ref path, .. }) if path == "/k/{id:[}"
    ));
}

#[test]
fn test_bad_template_names_location_and_argument() {
    let yaml = r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/get/{key}"
        command: ["GET", "{cookie.session}"]
"#;
    let err = Config::from_yaml(yaml).unwrap().compile().unwrap_err();

    match err {
        ConfigError::Template {
            path,
            index,
            source,
        } => {
            assert_eq!(path, "/get/{key}");
            assert_eq!(index, 1);
            assert_eq!(
                source,
                TemplateError::UnknownPlaceholder("cookie.session".to_owned())
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_script_placeholder_without_script() {
    let yaml = r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/run"
        command: ["EVALSHA", "{script}", "0"]
"#;
    let err = Config::from_yaml(yaml).unwrap().compile().unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Template {
            source: TemplateError::NoScript,
            ..
        }
    ));
}

#[test]
fn test_invalid_listen() {
    let yaml = r#"
servers:
  - listen: "localhost"
    locations: []
"#;
    let err = Config::from_yaml(yaml).unwrap().compile().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidListen { ref listen, .. } if listen == "localhost"));
}

#[test]
fn test_no_servers() {
    let err = Config::from_yaml("servers: []").unwrap().compile().unwrap_err();
    assert!(matches!(err, ConfigError::NoServers));
}

#[test]
fn test_malformed_yaml() {
    let err = Config::from_yaml("servers: {listen: [").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_script_digest_from_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("scripts")).unwrap();
    fs::write(dir.path().join("scripts/one.lua"), "return 1").unwrap();
    let path = dir.path().join("r4x.yaml");
    fs::write(
        &path,
        r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/one"
        script: "scripts/one.lua"
        command: ["EVALSHA", "{script}", "0"]
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).expect("failed to load");
    assert_eq!(config.base_dir, dir.path());

    let gateway = config.compile().expect("failed to compile");
    let (location, _) = gateway.servers[0].routes.route("/one").unwrap();
    assert_eq!(
        location.templates()[1].fragments(),
        &[Fragment::Literal(Bytes::from_static(
            b"e0e1f9fabfc9d4800c877a703b823ac0578ff8db"
        ))]
    );
}

#[test]
fn test_missing_script() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("r4x.yaml");
    fs::write(
        &path,
        r#"
servers:
  - listen: "127.0.0.1:8080"
    locations:
      - path: "/one"
        script: "missing.lua"
        command: ["EVALSHA", "{script}", "0"]
"#,
    )
    .unwrap();

    let err = Config::from_file(&path).unwrap().compile().unwrap_err();

    assert!(matches!(err, ConfigError::ScriptMissing(ref p) if *p == dir.path().join("missing.lua")));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_file(dir.path().join("absent.yaml")).unwrap_err();

    assert!(matches!(err, ConfigError::Read(ref read) if read.is_not_found()));
}
