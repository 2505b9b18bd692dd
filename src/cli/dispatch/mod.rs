use crate::cli::{
    actions::{Action, server::Args},
    commands::{self, countries, database},
};
use anyhow::Result;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches
        .get_one::<u16>(commands::ARG_PORT)
        .copied()
        .unwrap_or(8080);

    let database = database::Options::parse(matches)?;
    let countries = countries::Options::parse(matches);

    Ok(Action::Server(Args {
        port,
        storage: database.storage,
        dsn: database.dsn,
        allowed_countries: countries.allowed,
    }))
}
