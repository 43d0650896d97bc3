use std::path::{Path, PathBuf};
use std::time::Duration;

use pretty_assertions::assert_eq;
use serial_test::serial;

use super::*;

const VARS: [&str; 4] = [ADDRESS_VAR, CLIENT_ID_VAR, SYMBOL_VAR, OUTPUT_DIR_VAR];

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.address, "127.0.0.1:7497");
    assert_eq!(config.client_id, 1);
    assert_eq!(config.symbol, "NVDA");
    assert_eq!(config.weeks_out, 3);
    assert_eq!(config.otm_ratio, 0.90);
    assert_eq!(config.strike_increment, 5.0);
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.bulk_timeout, Duration::from_secs(60));
    assert_eq!(config.poll_interval, Duration::from_millis(100));
    assert_eq!(config.pacing, Duration::from_millis(500));
    assert_eq!(config.checkpoint_every, 20);
    assert!(config.validate().is_ok());
}

#[test]
#[serial(env)]
fn test_from_env_without_overrides() {
    temp_env::with_vars_unset(VARS, || {
        assert_eq!(Config::from_env().unwrap(), Config::default());
    });
}

#[test]
#[serial(env)]
fn test_from_env_with_overrides() {
    temp_env::with_vars(
        [
            (ADDRESS_VAR, Some("gateway:4002")),
            (CLIENT_ID_VAR, Some(" 100 ")),
            (SYMBOL_VAR, Some("AAPL")),
            (OUTPUT_DIR_VAR, Some("/tmp/ivtrack")),
        ],
        || {
            let config = Config::from_env().unwrap();

            assert_eq!(config.address, "gateway:4002");
            assert_eq!(config.client_id, 100);
            assert_eq!(config.symbol, "AAPL");
            assert_eq!(config.output_dir, PathBuf::from("/tmp/ivtrack"));
            assert_eq!(config.weeks_out, 3, "untouched");
        },
    );
}

#[test]
#[serial(env)]
fn test_from_env_blank_values_ignored() {
    temp_env::with_vars([(ADDRESS_VAR, Some("")), (SYMBOL_VAR, Some("  "))], || {
        let config = Config::from_env().unwrap();

        assert_eq!(config.address, "127.0.0.1:7497");
        assert_eq!(config.symbol, "NVDA");
    });
}

#[test]
#[serial(env)]
fn test_from_env_symbol_uppercased() {
    temp_env::with_var(SYMBOL_VAR, Some("nvda"), || {
        let config = Config::from_env().unwrap();

        assert_eq!(config.symbol, "NVDA");
    });
}

#[test]
#[serial(env)]
fn test_from_env_invalid_client_id() {
    temp_env::with_var(CLIENT_ID_VAR, Some("one"), || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, Error::Config(_)), "{err}");
    });
}

#[test]
fn test_validate() {
    struct TestCase {
        name: &'static str,
        config: Config,
    }

    let test_cases = [
        TestCase {
            name: "empty symbol",
            config: Config {
                symbol: " ".into(),
                ..Config::default()
            },
        },
        TestCase {
            name: "empty address",
            config: Config {
                address: "".into(),
                ..Config::default()
            },
        },
        TestCase {
            name: "zero ratio",
            config: Config {
                otm_ratio: 0.0,
                ..Config::default()
            },
        },
        TestCase {
            name: "ratio above one",
            config: Config {
                otm_ratio: 1.1,
                ..Config::default()
            },
        },
        TestCase {
            name: "negative increment",
            config: Config {
                strike_increment: -5.0,
                ..Config::default()
            },
        },
        TestCase {
            name: "zero weeks out",
            config: Config {
                weeks_out: 0,
                ..Config::default()
            },
        },
        TestCase {
            name: "zero checkpoint interval",
            config: Config {
                checkpoint_every: 0,
                ..Config::default()
            },
        },
    ];

    for case in test_cases {
        assert!(matches!(case.config.validate(), Err(Error::Config(_))), "{}", case.name);
    }
}

#[test]
fn test_snapshot_files() {
    let config = Config {
        output_dir: PathBuf::from("/data"),
        ..Config::default()
    };

    assert_eq!(config.final_file(), Path::new("/data/nvda_vol_ytd_data.csv"));
    assert_eq!(config.partial_file(20), Path::new("/data/nvda_vol_ytd_partial_20.csv"));
}
