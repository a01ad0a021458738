use serde_derive::Deserialize;
use std::env;
use std::path::PathBuf;
use tracing::Level;

fn def_log_level() -> String {
    String::from("warn")
}

fn def_description() -> PathBuf {
    PathBuf::from("platform.desc")
}

#[derive(Deserialize)]
pub struct Config {
    #[serde(default = "def_log_level")]
    log_level: String,

    /// Path to the platform description file to build. Relative `using`
    /// directives inside it resolve against this file's directory.
    #[serde(default = "def_description")]
    pub description: PathBuf,
}

impl Config {
    pub fn get_log_level(&self) -> Level {
        match self.log_level.as_str() {
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: def_log_level(),
            description: def_description(),
        }
    }
}

/// Parses the command line, folding `-v`/`--verbose` into the config's
/// log level. Returns whether `--print-config` was given along with the
/// resulting config.
fn from_cmdline(mut cfg: Config) -> (bool, Config) {
    use clap::{crate_version, Arg, ArgAction, Command};

    let matches = Command::new("platdescd")
        .version(crate_version!())
        .about("Builds a platform description into a live object graph")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .action(ArgAction::Set)
                .value_name("FILE")
                .help("Specifies the configuration file"),
        )
        .arg(
            Arg::new("description")
                .short('d')
                .long("description")
                .action(ArgAction::Set)
                .value_name("FILE")
                .help("Specifies the platform description file, overriding the config"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Sets verbosity of log; can be used more than once"),
        )
        .arg(
            Arg::new("print_cfg")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Displays the configuration and exits"),
        )
        .get_matches();

    match matches.get_count("verbose") {
        0 => (),
        1 => cfg.log_level = String::from("info"),
        2 => cfg.log_level = String::from("debug"),
        _ => cfg.log_level = String::from("trace"),
    };

    if let Some(path) = matches.get_one::<String>("description") {
        cfg.description = PathBuf::from(path);
    }

    (matches.get_flag("print_cfg"), cfg)
}

fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str(contents).map_err(|e| format!("{e}"))
}

fn from_file(path: &str) -> Option<Result<Config, String>> {
    std::fs::read_to_string(path).ok().map(|contents| parse_config(&contents))
}

fn find_cfg() -> Result<Config, String> {
    const CFG_FILE: &str = "platdesc.toml";

    let mut dirs = vec![String::from("./")];

    if let Ok(home) = env::var("HOME") {
        dirs.push(format!("{home}/."))
    }

    dirs.push(String::from("/usr/local/etc/"));
    dirs.push(String::from("/usr/pkg/etc/"));
    dirs.push(String::from("/etc/"));

    for dir in dirs {
        let file = format!("{dir}{CFG_FILE}");

        if let Some(cfg) = from_file(&file) {
            return cfg;
        }
    }
    Ok(Config::default())
}

fn dump_config(cfg: &Config) {
    println!("Configuration:");
    println!("    log level: {}", cfg.get_log_level());
    println!("    description file: {}", cfg.description.display());
}

/// Resolves the config from the command line and, optionally, a config
/// file. Returns `None` when `--print-config` was given, meaning the
/// caller should print nothing further and exit.
#[tracing::instrument(name = "loading config")]
pub fn get() -> Option<Config> {
    match find_cfg() {
        Ok(cfg) => {
            let (print_cfg, cfg) = from_cmdline(cfg);

            if print_cfg {
                dump_config(&cfg);
                None
            } else {
                Some(cfg)
            }
        }
        Err(e) => {
            println!("{e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_an_empty_document() {
        match toml::from_str::<Config>("") {
            Ok(cfg) => {
                assert_eq!(cfg.get_log_level(), Level::WARN);
                assert_eq!(cfg.description, def_description());
            }
            Err(e) => panic!("TOML parse error: {e}"),
        }
    }

    #[test]
    fn log_level_can_be_set() {
        for (text, level) in [
            ("log_level = \"trace\"", Level::TRACE),
            ("log_level = \"debug\"", Level::DEBUG),
            ("log_level = \"info\"", Level::INFO),
            ("log_level = \"warn\"", Level::WARN),
        ] {
            match toml::from_str::<Config>(text) {
                Ok(cfg) => assert_eq!(cfg.get_log_level(), level),
                Err(e) => panic!("TOML parse error: {e}"),
            }
        }
    }

    #[test]
    fn description_path_is_read_from_the_document() {
        match toml::from_str::<Config>(r#"description = "boards/demo.desc""#) {
            Ok(cfg) => assert_eq!(cfg.description, PathBuf::from("boards/demo.desc")),
            Err(e) => panic!("TOML parse error: {e}"),
        }
    }
}
