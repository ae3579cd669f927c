use std::fmt;

use crate::actions::ActionKind;

#[derive(Debug)]
pub enum PriceListError {
    NodeNotFound(String),
    ColumnOutOfRange { column: usize, columns: usize },
    InvalidSize(String),
    InvalidRate(String),
    ActionDisabled(ActionKind),
    UnknownAction(String),
    InvalidConfiguration(String),
    Asset(String),
    Pdf(String),
    Config(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for PriceListError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceListError::NodeNotFound(node) => write!(f, "node not found: {}", node),
            PriceListError::ColumnOutOfRange { column, columns } => write!(
                f,
                "column {} out of range for table with {} columns",
                column, columns
            ),
            PriceListError::InvalidSize(raw) => {
                write!(f, "invalid size {:?}: expected a positive integer", raw)
            }
            PriceListError::InvalidRate(raw) => {
                write!(f, "invalid rate {:?}: expected a non-negative decimal", raw)
            }
            PriceListError::ActionDisabled(action) => {
                write!(f, "action {} is disabled", action.as_str())
            }
            PriceListError::UnknownAction(raw) => write!(f, "unknown action {:?}", raw),
            PriceListError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            PriceListError::Asset(message) => write!(f, "asset error: {}", message),
            PriceListError::Pdf(message) => write!(f, "pdf error: {}", message),
            PriceListError::Config(err) => write!(f, "config error: {}", err),
            PriceListError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for PriceListError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PriceListError::Config(err) => Some(err),
            PriceListError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PriceListError {
    fn from(value: std::io::Error) -> Self {
        PriceListError::Io(value)
    }
}

impl From<serde_json::Error> for PriceListError {
    fn from(value: serde_json::Error) -> Self {
        PriceListError::Config(value)
    }
}
