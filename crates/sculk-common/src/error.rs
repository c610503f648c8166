use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SculkError {
    IoError(std::io::Error),
    ProtocolError(String),
    RegistryError(String),
}

impl fmt::Display for SculkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SculkError::IoError(err) => write!(f, "IO error: {}", err),
            SculkError::ProtocolError(msg) => write!(f, "Protocol error: {}", msg),
            SculkError::RegistryError(msg) => write!(f, "Registry error: {}", msg),
        }
    }
}

impl Error for SculkError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SculkError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for SculkError {
    fn from(err: std::io::Error) -> Self {
        SculkError::IoError(err)
    }
}
