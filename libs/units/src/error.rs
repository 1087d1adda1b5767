use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("physical dimension '{0}' is already registered")]
    DuplicateDimension(String),

    #[error("measurement unit '{0}' is already registered")]
    DuplicateUnit(String),

    #[error("basic measurement unit '{0}' is not registered")]
    UnknownBasicUnit(String),

    #[error("reference factor symbol '{0}' is not a fundamental measurement unit")]
    NotFundamentalUnit(String),

    #[error("exponent of '{symbol}' must be positive, got {power}")]
    InvalidExponent { symbol: String, power: i32 },

    #[error("exponent of '{0}' exceeds the supported maximum")]
    ExponentOverflow(String),

    #[error("unknown physical dimension '{0}'")]
    UnknownDimension(String),

    #[error("unknown measurement unit '{0}'")]
    UnknownUnit(String),

    #[error("incompatible units: '{from}' vs '{to}'")]
    IncompatibleUnits { from: String, to: String },

    #[error("conversion factor is zero and cannot be inverted")]
    ZeroConversionFactor,

    #[error("invalid unit expression at byte {pos}: {message}")]
    InvalidUnitExpression { pos: usize, message: &'static str },

    #[error("registry configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A registration call was rejected; the registry is unchanged.
    Registration,
    /// A query referenced a name or unit the registry does not know.
    Lookup,
    /// Conversion parameters cannot be inverted, or an exponent overflowed.
    Arithmetic,
    /// Malformed text input (unit expressions, registry files).
    Input,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateDimension(_)
            | Error::DuplicateUnit(_)
            | Error::UnknownBasicUnit(_)
            | Error::NotFundamentalUnit(_)
            | Error::InvalidExponent { .. } => ErrorKind::Registration,
            Error::UnknownDimension(_)
            | Error::UnknownUnit(_)
            | Error::IncompatibleUnits { .. } => ErrorKind::Lookup,
            Error::ZeroConversionFactor | Error::ExponentOverflow(_) => ErrorKind::Arithmetic,
            Error::InvalidUnitExpression { .. } | Error::Config(_) => ErrorKind::Input,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}
