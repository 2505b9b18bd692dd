//! # Cards
//!
//! `cards` is a small REST service that keeps credit card records: number,
//! expiration date, CVV and holder name.
//!
//! Every `/cards` request must carry an `X-Country-Code` header naming one of
//! the allowed countries (by default `UA`, `US` and `UK`); anything else is
//! answered with `403` before the body is read.
//!
//! ## Storage
//!
//! Two backends sit behind [`cards::Storage`]:
//!
//! - **memory**: a lock-protected `Vec`, lost on restart. Ids are `max + 1`.
//! - **postgres**: the `credit_cards` table, created by the embedded
//!   migrations on startup. Ids come from a `SERIAL` column.
//!
//! Holder filtering is a case-insensitive substring match in both backends.
//!
//! ## Validation
//!
//! Incoming cards are checked field by field and all failures are reported in
//! one message, for example:
//!
//! ```text
//! cvv: must be no less than 100; number: must be a valid credit card number.
//! ```

pub mod api;
pub mod cards;
pub mod cli;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
