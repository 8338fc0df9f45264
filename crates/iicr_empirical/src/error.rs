use std::fmt;
use std::error::Error;

#[derive(Debug)]
pub enum ExtractionError {
    Io(std::io::Error),
    EmptyOutput,
    Unparseable { lines: usize },
    InvalidObservation { index: usize, value: f64 },
    InvalidScale(f64),
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::EmptyOutput => write!(f, "Simulator output is empty"),
            Self::Unparseable { lines } =>
                write!(f, "No coalescence time found in {lines} lines of simulator output"),
            Self::InvalidObservation { index, value } =>
                write!(f, "Observation {index} is not a non-negative time: {value}"),
            Self::InvalidScale(factor) =>
                write!(f, "Time scaling factor must be positive and finite: {factor}"),
        }
    }
}

impl Error for ExtractionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExtractionError {
    fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IicrError {
    SampleSize(usize),
}

impl fmt::Display for IicrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SampleSize(k) =>
                write!(f, "The IICR needs a sample size of at least 2 (got {k})"),
        }
    }
}

impl Error for IicrError {}
