//! CLI integration tests.
//!
//! Tests cover:
//! - Config parsing (build_analysis_config, load_context)
//! - Argument parsing for each subcommand
//! - Full subcommand runs against CSV files in a temp directory
//! - Error to exit code mapping

mod common;

use clap::Parser;
use common::*;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stockscope::adapters::file_config_adapter::FileConfigAdapter;
use stockscope::cli::{self, Cli, Command, CommonArgs};
use stockscope::domain::error::AnalyticsError;
use stockscope::domain::segmentation::TieBreak;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("AAPL.csv"),
        csv_text(&daily_rows(&[10.0, 11.0, 12.0, 11.0, 10.0, 11.0, 12.0, 13.0])),
    )
    .unwrap();
    fs::write(
        dir.path().join("MSFT.csv"),
        csv_text(&daily_rows(&[20.0, 21.0, 22.0, 21.0, 22.0, 23.0, 24.0, 25.0])),
    )
    .unwrap();
    fs::write(
        dir.path().join("CPI.txt"),
        "0124,3.1,3.0\n0224,3.2,3.1\n0324,3.3,3.2\n0424,3.4,3.4\nxx,1,2\n",
    )
    .unwrap();
    dir
}

fn common(dir: &Path) -> CommonArgs {
    CommonArgs {
        data_dir: Some(dir.to_path_buf()),
        ..CommonArgs::default()
    }
}

fn same_code(a: ExitCode, b: u8) -> bool {
    format!("{a:?}") == format!("{:?}", ExitCode::from(b))
}

const VALID_INI: &str = r#"
[data]
dir = /srv/prices
macro_file = /srv/CPI.txt

[sma]
window = 20
resync_every = 500

[classifier]
tolerance = 0.001
horizons = 3, 12

[trends]
tie_break = last

[portfolio]
starting_balance = 25000
allocation = AAPL:60,MSFT:40
start_date = 2023-01-01
end_date = 2024-06-30

[fuzzy]
max_distance = 2
"#;

mod config_loading {
    use super::*;

    #[test]
    fn defaults_from_empty_config() {
        let cfg = cli::build_analysis_config(&FileConfigAdapter::empty()).unwrap();
        assert_eq!(cfg.sma_window, 5);
        assert_eq!(cfg.sma_resync_every, None);
        assert_eq!(cfg.horizons, vec![3, 6, 12]);
        assert_eq!(cfg.tie_break, TieBreak::First);
        assert_eq!(cfg.starting_balance, 100_000.0);
        assert_eq!(cfg.max_distance, 3);
        assert_eq!(cfg.start_date, None);
    }

    #[test]
    fn values_from_ini() {
        let config = FileConfigAdapter::from_string(VALID_INI).unwrap();
        let cfg = cli::build_analysis_config(&config).unwrap();
        assert_eq!(cfg.sma_window, 20);
        assert_eq!(cfg.sma_resync_every, Some(500));
        assert_eq!(cfg.slope_tolerance, 0.001);
        assert_eq!(cfg.horizons, vec![3, 12]);
        assert_eq!(cfg.tie_break, TieBreak::Last);
        assert_eq!(cfg.starting_balance, 25_000.0);
        assert_eq!(cfg.max_distance, 2);
        assert_eq!(cfg.start_date, Some(date(2023, 1, 1)));
        assert_eq!(cfg.end_date, Some(date(2024, 6, 30)));
    }

    #[test]
    fn context_reads_file_and_flags_override() {
        let file = write_temp_ini(VALID_INI);
        let args = CommonArgs {
            config: Some(file.path().to_path_buf()),
            data_dir: None,
            start: Some(date(2024, 1, 1)),
            end: None,
        };
        let ctx = cli::load_context(&args).unwrap();
        assert_eq!(ctx.data_dir, PathBuf::from("/srv/prices"));
        assert_eq!(ctx.settings.start_date, Some(date(2024, 1, 1)));
        assert_eq!(ctx.settings.end_date, Some(date(2024, 6, 30)));
    }

    #[test]
    fn context_default_data_dir() {
        let ctx = cli::load_context(&CommonArgs::default()).unwrap();
        assert_eq!(ctx.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn missing_config_file_is_parse_error() {
        let args = CommonArgs {
            config: Some(PathBuf::from("/nonexistent/stockscope.ini")),
            ..CommonArgs::default()
        };
        assert!(matches!(
            cli::load_context(&args),
            Err(AnalyticsError::ConfigParse { .. })
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let file = write_temp_ini("[sma]\nwindow = 0\n");
        let args = CommonArgs {
            config: Some(file.path().to_path_buf()),
            ..CommonArgs::default()
        };
        assert!(matches!(
            cli::load_context(&args),
            Err(AnalyticsError::ConfigInvalid { .. })
        ));
    }
}

mod arg_parsing {
    use super::*;

    #[test]
    fn sma_args() {
        let cli = Cli::parse_from([
            "stockscope", "sma", "-t", "AAPL", "-w", "10", "--start", "2024-01-01",
        ]);
        assert_eq!(cli.log_level, "info");
        match cli.command {
            Command::Sma {
                common,
                ticker,
                window,
            } => {
                assert_eq!(ticker, "AAPL");
                assert_eq!(window, Some(10));
                assert_eq!(common.start, Some(date(2024, 1, 1)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn global_log_level_after_subcommand() {
        let cli = Cli::parse_from(["stockscope", "symbols", "--log-level", "debug"]);
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn bad_date_rejected_by_parser() {
        assert!(Cli::try_parse_from(["stockscope", "trends", "-t", "A", "--end", "2024/01/01"]).is_err());
    }
}

mod subcommands {
    use super::*;

    #[test]
    fn sma_output() {
        let dir = data_dir();
        let out = cli::execute(Command::Sma {
            common: common(dir.path()),
            ticker: "aapl".into(),
            window: Some(3),
        })
        .unwrap();
        assert!(out.contains("AAPL SMA(3)"));
        assert!(out.contains("Latest SMA (3): 12.0000"));
        assert!(out.contains("Close - SMA:     +1.0000"));
    }

    #[test]
    fn sma_window_longer_than_series() {
        let dir = data_dir();
        let err = cli::execute(Command::Sma {
            common: common(dir.path()),
            ticker: "AAPL".into(),
            window: Some(50),
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::InsufficientData { have: 8, need: 50 }));
    }

    #[test]
    fn trends_output() {
        let dir = data_dir();
        let out = cli::execute(Command::Trends {
            common: common(dir.path()),
            ticker: "AAPL".into(),
        })
        .unwrap();
        assert!(out.contains("AAPL trend segments (3)"));
        assert!(out.contains("Longest uptrend:   up    2024-01-01 .. 2024-01-03"));
        assert!(out.contains("Longest downtrend: down  2024-01-04 .. 2024-01-05"));
    }

    #[test]
    fn profit_output_with_date_window() {
        let dir = data_dir();
        let mut args = common(dir.path());
        args.start = Some(date(2024, 1, 5));
        let out = cli::execute(Command::Profit {
            common: args,
            ticker: "AAPL".into(),
        })
        .unwrap();
        assert!(out.contains("AAPL optimal trades (1)"));
        assert!(out.contains("Total profit: 3.0000"));
    }

    #[test]
    fn classify_output() {
        let dir = data_dir();
        let out = cli::execute(Command::Classify {
            common: common(dir.path()),
            file: Some(dir.path().join("CPI.txt")),
            horizons: Some("3,6".into()),
            tolerance: None,
        })
        .unwrap();
        assert!(out.contains("Last 3 months: Uptrend"));
        assert!(out.contains("Last 4 months (requested 6): Uptrend"));
        assert!(out.contains("Apr 2024"));
    }

    #[test]
    fn classify_honours_date_flags() {
        let dir = data_dir();
        let mut args = common(dir.path());
        args.start = Some(date(2024, 2, 1));
        args.end = Some(date(2024, 3, 31));
        let out = cli::execute(Command::Classify {
            common: args,
            file: Some(dir.path().join("CPI.txt")),
            horizons: Some("3".into()),
            tolerance: None,
        })
        .unwrap();
        assert!(out.contains("Last 2 months (requested 3): Uptrend"));
        assert!(!out.contains("Jan 2024"));
        assert!(!out.contains("Apr 2024"));
    }

    #[test]
    fn classify_skips_non_finite_lines() {
        let dir = data_dir();
        let path = dir.path().join("CPI_NAN.txt");
        fs::write(&path, "0124,3.1,3.0\n0224,NaN,3.1\n0324,3.3,3.2\n0424,inf,3.4\n0524,3.5,3.4\n")
            .unwrap();
        let out = cli::execute(Command::Classify {
            common: common(dir.path()),
            file: Some(path),
            horizons: Some("3".into()),
            tolerance: None,
        })
        .unwrap();
        assert!(out.contains("Last 3 months: Uptrend"));
        assert!(!out.contains("Feb 2024"));
    }

    #[test]
    fn lowercase_csv_file_is_fetchable() {
        let dir = data_dir();
        fs::write(
            dir.path().join("tsla.csv"),
            csv_text(&daily_rows(&[5.0, 6.0, 4.0, 7.0])),
        )
        .unwrap();

        let symbols = cli::execute(Command::Symbols {
            common: common(dir.path()),
        })
        .unwrap();
        assert!(symbols.contains("TSLA"));

        let out = cli::execute(Command::Profit {
            common: common(dir.path()),
            ticker: "TSLA".into(),
        })
        .unwrap();
        assert!(out.contains("Total profit: 4.0000"));
    }

    #[test]
    fn reversed_date_flags_rejected() {
        let dir = data_dir();
        let mut args = common(dir.path());
        args.start = Some(date(2024, 1, 6));
        args.end = Some(date(2024, 1, 2));
        let err = cli::execute(Command::Trends {
            common: args,
            ticker: "AAPL".into(),
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigInvalid { .. }));
    }

    #[test]
    fn classify_missing_file_is_io_error() {
        let dir = data_dir();
        let err = cli::execute(Command::Classify {
            common: common(dir.path()),
            file: Some(dir.path().join("missing.txt")),
            horizons: None,
            tolerance: None,
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::Io(_)));
    }

    #[test]
    fn portfolio_output() {
        let dir = data_dir();
        let out = cli::execute(Command::Portfolio {
            common: common(dir.path()),
            allocation: Some("AAPL:50,MSFT:50".into()),
            balance: Some(10_000.0),
        })
        .unwrap();
        assert!(out.contains("Total Portfolio Return:"));
        assert!(out.contains("Latest Portfolio Value: $"));
    }

    #[test]
    fn portfolio_requires_allocation() {
        let dir = data_dir();
        let err = cli::execute(Command::Portfolio {
            common: common(dir.path()),
            allocation: None,
            balance: None,
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigMissing { .. }));
    }

    #[test]
    fn portfolio_balance_out_of_range() {
        let dir = data_dir();
        let err = cli::execute(Command::Portfolio {
            common: common(dir.path()),
            allocation: Some("AAPL:100".into()),
            balance: Some(10.0),
        })
        .unwrap_err();
        assert!(matches!(err, AnalyticsError::ConfigInvalid { .. }));
    }

    #[test]
    fn unknown_ticker_suggests_from_data_dir() {
        let dir = data_dir();
        let err = cli::execute(Command::Profit {
            common: common(dir.path()),
            ticker: "MSFY".into(),
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "unknown ticker MSFY (did you mean: MSFT?)");
    }

    #[test]
    fn suggest_and_symbols() {
        let dir = data_dir();
        let out = cli::execute(Command::Suggest {
            common: common(dir.path()),
            ticker: "aapk".into(),
            max_distance: None,
        })
        .unwrap();
        assert_eq!(out, "Did you mean: AAPL\n");

        let out = cli::execute(Command::Symbols {
            common: common(dir.path()),
        })
        .unwrap();
        assert_eq!(out, "AAPL\nMSFT\n");
    }
}

mod exit_codes {
    use super::*;

    fn run(args: &[&str]) -> ExitCode {
        cli::run(Cli::parse_from(args))
    }

    #[test]
    fn success_is_zero() {
        let dir = data_dir();
        let d = dir.path().to_str().unwrap();
        assert!(same_code(run(&["stockscope", "symbols", "--data-dir", d]), 0));
    }

    #[test]
    fn unknown_ticker_is_four() {
        let dir = data_dir();
        let d = dir.path().to_str().unwrap();
        assert!(same_code(
            run(&["stockscope", "trends", "-t", "ZZZZ", "--data-dir", d]),
            4
        ));
    }

    #[test]
    fn bad_allocation_is_three() {
        let dir = data_dir();
        let d = dir.path().to_str().unwrap();
        assert!(same_code(
            run(&["stockscope", "portfolio", "-a", "AAPL:60,MSFT:30", "--data-dir", d]),
            3
        ));
    }

    #[test]
    fn invalid_config_is_two() {
        let file = write_temp_ini("[trends]\ntie_break = middle\n");
        let path = file.path().to_str().unwrap();
        assert!(same_code(run(&["stockscope", "symbols", "-c", path]), 2));
    }

    #[test]
    fn missing_data_dir_is_one() {
        assert!(same_code(
            run(&["stockscope", "symbols", "--data-dir", "/nonexistent/stockscope"]),
            1
        ));
    }

    #[test]
    fn reversed_date_flags_are_two() {
        let dir = data_dir();
        let d = dir.path().to_str().unwrap();
        assert!(same_code(
            run(&[
                "stockscope", "profit", "-t", "AAPL", "--data-dir", d, "--start", "2024-02-01",
                "--end", "2024-01-01",
            ]),
            2
        ));
    }

    #[test]
    fn insufficient_data_is_five() {
        let dir = data_dir();
        let d = dir.path().to_str().unwrap();
        assert!(same_code(
            run(&["stockscope", "sma", "-t", "AAPL", "-w", "100", "--data-dir", d]),
            5
        ));
    }
}
