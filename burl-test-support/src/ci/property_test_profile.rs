//! Property-test run profile.
//!
//! Every property suite in the workspace sizes itself from the same two
//! environment knobs so CI can dial effort up or down in one place:
//!
//! - `BURL_PBT_CASES` — number of cases per property.
//! - `BURL_PBT_FORK` — run each case in a forked child (`1`/`true`).

use std::env;

const CASES_ENV: &str = "BURL_PBT_CASES";
const FORK_ENV: &str = "BURL_PBT_FORK";

/// Resolved property-test effort for one suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Loads the profile from the environment, falling back to the suite's
    /// defaults when a variable is unset or unparseable.
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        let cases = parse_cases(env::var(CASES_ENV).ok().as_deref(), default_cases);
        let fork = parse_fork(env::var(FORK_ENV).ok().as_deref(), default_fork);
        Self { cases, fork }
    }

    /// Number of cases each property should run.
    #[must_use]
    #[rustfmt::skip]
    pub const fn cases(&self) -> u32 { self.cases }

    /// Whether each case should run in a forked child process.
    #[must_use]
    #[rustfmt::skip]
    pub const fn fork(&self) -> bool { self.fork }
}

fn parse_cases(raw: Option<&str>, default_cases: u32) -> u32 {
    raw.and_then(|value| value.trim().parse().ok())
        .filter(|&cases| cases > 0)
        .unwrap_or(default_cases)
}

fn parse_fork(raw: Option<&str>, default_fork: bool) -> bool {
    match raw.map(|value| value.trim().to_ascii_lowercase()) {
        Some(value) if value == "1" || value == "true" || value == "yes" => true,
        Some(value) if value == "0" || value == "false" || value == "no" => false,
        _ => default_fork,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{parse_cases, parse_fork};

    #[rstest]
    #[case(None, 64, 64)]
    #[case(Some("256"), 64, 256)]
    #[case(Some(" 8 "), 64, 8)]
    #[case(Some("0"), 64, 64)]
    #[case(Some("not a number"), 64, 64)]
    fn cases_fall_back_to_the_default(
        #[case] raw: Option<&str>,
        #[case] default_cases: u32,
        #[case] expected: u32,
    ) {
        assert_eq!(parse_cases(raw, default_cases), expected);
    }

    #[rstest]
    #[case(Some("1"), false, true)]
    #[case(Some("TRUE"), false, true)]
    #[case(Some("no"), true, false)]
    #[case(Some("sideways"), true, true)]
    #[case(None, false, false)]
    fn fork_parses_common_spellings(
        #[case] raw: Option<&str>,
        #[case] default_fork: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(parse_fork(raw, default_fork), expected);
    }
}
