use std::fmt;

/// Parameters for which the n-island IICR has no real closed form.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    TooFewIslands(usize),
    InvalidMigration(f64),
    NegativeDiscriminant(f64),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::TooFewIslands(n) => {
                write!(f, "The n-island model needs at least 2 islands (got {})", n)
            }
            DomainError::InvalidMigration(m) => {
                write!(f, "Migration rate must be finite and non-negative (got {})", m)
            }
            DomainError::NegativeDiscriminant(d) => {
                write!(f, "Negative discriminant {} in the n-island rate matrix", d)
            }
        }
    }
}

impl std::error::Error for DomainError {}

/// A model marker was found in an ms command, but its arguments could not
/// be read.
#[derive(Debug, Clone, PartialEq)]
pub struct UnrecognizedModelError {
    pub marker: String,
    /// Token offset after the marker.
    pub offset: usize,
    /// The offending token, `None` if the command ended early.
    pub token: Option<String>,
}

impl fmt::Display for UnrecognizedModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(tok) => write!(f, "Cannot read argument {} of '{}': '{}'",
                self.offset, self.marker, tok),
            None => write!(f, "Missing argument {} of '{}'", self.offset, self.marker),
        }
    }
}

impl std::error::Error for UnrecognizedModelError {}
