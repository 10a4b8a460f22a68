mod signup;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use formconstraints::FormConfig;
use simplelog::{Config, LevelFilter, WriteLogger};

/// Fill in the sign-up form, validate it and print the shown feedbacks.
///
/// Fields: username, email, password, passwordConfirm.
#[derive(Parser, Debug)]
#[command(name = "formconstraints-demo")]
#[command(version)]
struct Cli {
    /// JSON form configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the debug log
    #[arg(long, value_name = "FILE", default_value = "formconstraints-demo.log")]
    log: PathBuf,

    /// Input values as field=value
    #[arg(value_name = "FIELD=VALUE", value_parser = parse_field_value)]
    values: Vec<(String, String)>,
}

fn parse_field_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected field=value, got '{arg}'"))
}

fn load_config(path: Option<&Path>) -> Result<FormConfig, String> {
    let Some(path) = path else {
        return Ok(FormConfig::new().name("signup"));
    };
    let file = File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_reader(file).map_err(|e| format!("{}: {e}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log).expect("Failed to create log file");
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    match signup::run(config, &cli.values).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
