use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid {what} quantity \"{text}\": {reason}")]
    BadQuantity {
        what: &'static str,
        text: String,
        reason: String,
    },

    #[error("Unknown {what} unit \"{unit}\"")]
    UnknownUnit { what: &'static str, unit: String },
}
