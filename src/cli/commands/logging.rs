use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";
pub const ARG_LOG_JSON: &str = "log-json";

#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VERBOSITY)
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("CASLOGIN_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .arg(
            Arg::new(ARG_LOG_JSON)
                .long("log-json")
                .help("Emit one JSON object per log event")
                .env("CASLOGIN_LOG_JSON")
                .action(ArgAction::SetTrue)
                .value_parser(clap::builder::BoolishValueParser::new()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_named_levels() {
        let parser = validator_log_level();
        let command = Command::new("test").arg(
            Arg::new("level")
                .long("level")
                .value_parser(parser),
        );
        for (input, expected) in [("0", 0u8), ("5", 5), ("WARN", 1), ("debug", 3)] {
            let matches = command
                .clone()
                .try_get_matches_from(["test", "--level", input])
                .map_err(|e| e.to_string());
            assert_eq!(
                matches.map(|m| m.get_one::<u8>("level").copied()),
                Ok(Some(expected)),
                "{input}"
            );
        }
        assert!(command
            .clone()
            .try_get_matches_from(["test", "--level", "loud"])
            .is_err());
        assert!(command
            .try_get_matches_from(["test", "--level", "6"])
            .is_err());
    }
}
