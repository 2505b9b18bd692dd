use clap::{Arg, ArgMatches, Command};

pub const ARG_ALLOWED_COUNTRIES: &str = "allowed-countries";

#[derive(Debug, Clone)]
pub struct Options {
    pub allowed: Vec<String>,
}

impl Options {
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        let allowed = matches
            .get_many::<String>(ARG_ALLOWED_COUNTRIES)
            .map(|codes| codes.cloned().collect())
            .unwrap_or_default();

        Self { allowed }
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_ALLOWED_COUNTRIES)
            .long(ARG_ALLOWED_COUNTRIES)
            .help("Comma separated country codes allowed to call /cards")
            .env("CARDS_ALLOWED_COUNTRIES")
            .value_delimiter(',')
            .default_values(["UA", "US", "UK"]),
    )
}
