use std::fs;
use std::fmt;
use std::error::Error;
use std::path::Path;
use serde::{Serialize, Deserialize};

use crate::IICRCurve;

#[derive(Debug)]
pub enum CurveIoError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CurveIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {}", e),
            Self::Json(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl Error for CurveIoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CurveIoError {
    fn from(e: std::io::Error) -> Self { Self::Io(e) }
}

impl From<serde_json::Error> for CurveIoError {
    fn from(e: serde_json::Error) -> Self { Self::Json(e) }
}

/// A labeled curve as written to disk. Undefined rates are `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializableCurve {
    pub label: String,
    pub time: Vec<f64>,
    pub iicr: Vec<Option<f64>>,
}

/// All curves of one run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveCollection {
    pub empirical: Vec<SerializableCurve>,
    pub analytical: Vec<SerializableCurve>,
}

impl IICRCurve {
    pub fn to_serializable(&self, label: &str) -> SerializableCurve {
        SerializableCurve {
            label: label.to_string(),
            time: self.times(),
            iicr: self.rates(),
        }
    }
}

impl From<&SerializableCurve> for IICRCurve {
    fn from(serial: &SerializableCurve) -> Self {
        IICRCurve::new(serial.time.iter().copied().zip(serial.iicr.iter().copied()).collect())
    }
}

impl CurveCollection {
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CurveIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CurveIoError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_rates_become_null() {
        let curve = IICRCurve::new(vec![(0.0, Some(1.5)), (1.0, None)]);
        let serial = curve.to_serializable("scenario");
        let json = serde_json::to_string(&serial).unwrap();
        assert_eq!(json, r#"{"label":"scenario","time":[0.0,1.0],"iicr":[1.5,null]}"#);
        let back: SerializableCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(IICRCurve::from(&back), curve);
    }

    #[test]
    fn test_collection_file() {
        let curve = IICRCurve::new(vec![(0.0, Some(1.0)), (0.5, Some(1.25))]);
        let collection = CurveCollection {
            empirical: vec![curve.to_serializable("a")],
            analytical: vec![],
        };
        let path = std::env::temp_dir().join(format!("iicr_curves_{}.json", std::process::id()));
        collection.to_file(&path).unwrap();
        let loaded = CurveCollection::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, collection);
    }
}
