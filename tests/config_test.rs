mod common;

use std::io::Write;

use pretty_assertions::assert_eq;
use sinew::parser::prelude::*;
use sinew::{Error, ParseConfig};

fn indented_number() -> impl Parser<char, i64> {
    skip_whitespaces().then(dec_num())
}

#[test]
fn it_applies_tab_width_from_a_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "tab_width": 8, "chunk_size": 2 }}"#).unwrap();
    let config = ParseConfig::from_file(file.path()).unwrap();

    let error = indented_number().parse_with("\tx", &config).unwrap_err();
    assert_eq!(error.location(), 1);
    assert_eq!(error.position().col, 9);

    let error = indented_number().parse("\tx").unwrap_err();
    assert_eq!(error.position().col, 5);
}

#[test]
fn it_rejects_invalid_configs() {
    let err = ParseConfig::from_json_str(r#"{ "tab_width": 0 }"#).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let err = ParseConfig::from_json_str(r#"{ "chunk_size": "big" }"#).unwrap_err();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn it_round_trips_through_json() {
    let config = ParseConfig::default().with_chunk_size(7).with_tab_width(2);
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(ParseConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn it_renders_into_the_crate_error() {
    match indented_number().parse_or_err("  ?") {
        Err(Error::Parse {
            message,
            location,
            position,
        }) => {
            assert_eq!(location, 2);
            assert_eq!(position.col, 3);
            assert_eq!(
                message,
                "Parse error.\n    unexpected ?\n    expected number\n    at line 1, col 3"
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
