use std::fmt;
use std::str::FromStr;

use crate::UnrecognizedModelError;

/// An ms command line split on whitespace, e.g.
/// `ms 2 100 -T -I 10 2 0 0 0 0 0 0 0 0 0 1.0`.
///
/// The first token is the program, followed by the sample size and the
/// number of replicates, then the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorCommand(pub Vec<String>);

impl From<&str> for SimulatorCommand {
    fn from(s: &str) -> Self {
        SimulatorCommand(s.split_whitespace().map(str::to_string).collect())
    }
}

impl fmt::Display for SimulatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

impl SimulatorCommand {
    pub fn program(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Number of sampled lineages (the token after the program).
    pub fn sample_size(&self) -> Option<usize> {
        self.0.get(1)?.parse().ok()
    }

    /// Number of independent replicates.
    pub fn replicates(&self) -> Option<usize> {
        self.0.get(2)?.parse().ok()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|tok| tok == flag)
    }

    /// Token positions of every occurrence of `flag`.
    pub fn positions(&self, flag: &str) -> Vec<usize> {
        self.0.iter()
            .enumerate()
            .filter(|(_, tok)| *tok == flag)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn token(&self, pos: usize) -> Option<&str> {
        self.0.get(pos).map(String::as_str)
    }

    /// Parse the token `offset` positions after the flag at `pos`.
    pub fn argument<T: FromStr>(&self, pos: usize, offset: usize) -> Result<T, UnrecognizedModelError> {
        let marker = self.token(pos).unwrap_or_default().to_string();
        match pos.checked_add(offset).and_then(|i| self.token(i)) {
            Some(tok) => tok.parse().map_err(|_| UnrecognizedModelError {
                marker,
                offset,
                token: Some(tok.to_string()),
            }),
            None => Err(UnrecognizedModelError { marker, offset, token: None }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_fields() {
        let cmd = SimulatorCommand::from("ms 3 100 -T  -eN 0.5 2.0");
        assert_eq!(cmd.program(), Some("ms"));
        assert_eq!(cmd.sample_size(), Some(3));
        assert_eq!(cmd.replicates(), Some(100));
        assert!(cmd.contains("-T"));
        assert!(!cmd.contains("-G"));
        assert_eq!(cmd.to_string(), "ms 3 100 -T -eN 0.5 2.0");
    }

    #[test]
    fn test_flag_matching_is_exact() {
        let cmd = SimulatorCommand::from("ms 2 10 -eG 0.1 0");
        assert!(!cmd.contains("-G"));
        assert_eq!(cmd.positions("-eG"), vec![3]);
    }

    #[test]
    fn test_arguments() {
        let cmd = SimulatorCommand::from("ms 2 10 -eN 0.5 x -eN 1.0");
        let pos = cmd.positions("-eN");
        assert_eq!(pos, vec![3, 6]);
        assert_eq!(cmd.argument::<f64>(3, 1), Ok(0.5));
        assert_eq!(cmd.argument::<f64>(3, 2), Err(UnrecognizedModelError {
            marker: "-eN".into(),
            offset: 2,
            token: Some("x".into()),
        }));
        assert_eq!(cmd.argument::<f64>(6, 2), Err(UnrecognizedModelError {
            marker: "-eN".into(),
            offset: 2,
            token: None,
        }));
    }

    #[test]
    fn test_argument_offset_overflow() {
        let cmd = SimulatorCommand::from("ms 2 10 -I 3");
        assert_eq!(cmd.argument::<f64>(3, usize::MAX), Err(UnrecognizedModelError {
            marker: "-I".into(),
            offset: usize::MAX,
            token: None,
        }));
    }

    #[test]
    fn test_missing_sample_size() {
        assert_eq!(SimulatorCommand::from("ms").sample_size(), None);
        assert_eq!(SimulatorCommand::from("ms two 10").sample_size(), None);
    }
}
