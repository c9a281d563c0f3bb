use crate::security::password::{MAX_COST, MIN_COST};
use clap::{Arg, ArgAction, Command};

pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_SESSION_COOKIE_SECURE: &str = "session-cookie-secure";
pub const ARG_BCRYPT_COST: &str = "bcrypt-cost";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long("session-ttl-seconds")
                .help("Idle timeout of a login session in seconds")
                .env("CASLOGIN_SESSION_TTL_SECONDS")
                .default_value("1800")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_SESSION_COOKIE_SECURE)
                .long("session-cookie-secure")
                .help("Mark the session cookie Secure (HTTPS only)")
                .env("CASLOGIN_SESSION_COOKIE_SECURE")
                .action(ArgAction::SetTrue)
                .value_parser(clap::builder::BoolishValueParser::new()),
        )
        .arg(
            Arg::new(ARG_BCRYPT_COST)
                .long("bcrypt-cost")
                .help("bcrypt work factor used for placeholder hashes")
                .env("CASLOGIN_BCRYPT_COST")
                .default_value("10")
                .value_parser(
                    clap::value_parser!(u32).range(i64::from(MIN_COST)..=i64::from(MAX_COST)),
                ),
        )
}
