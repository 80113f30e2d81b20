use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("{0}")]
    AdhocError(&'static str),

    /// An interaction was started without the parameters that identify what it acts on.
    #[error("Missing required context: {0}")]
    MissingContextError(String),

    /// User input failed validation; nothing was sent to the store.
    #[error("{0}")]
    InputError(String),

    /// The store rejected a request. The message is the store's own payload, verbatim.
    #[error("{0}")]
    StoreError(String),

    /// The streaming channel protocol was misused.
    #[error("Channel error occurred: {0}")]
    ChannelError(&'static str),

    #[error("JSON error occurred: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Configuration error occurred: {0}")]
    ConfigError(Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(e: figment::Error) -> Error {
        Error::ConfigError(Box::new(e))
    }
}

impl From<Error> for String {
    fn from(e: Error) -> String {
        return e.to_string();
    }
}

/// The user-visible surface on which failures are shown as titled messages.
pub trait ErrorReporter {
    fn report(&self, title: &str, error: &Error);
}

/// Logs a failure and shows it on the given reporter.
pub fn report(reporter: &dyn ErrorReporter, title: &str, error: &Error) {
    tracing::error!(title, error = %error, "request failed");
    reporter.report(title, error);
}


#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
/// A flag for a validation check that was not passed.
pub struct FailedValidation {
    pub description: String
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Recorder(RefCell<Vec<(String, String)>>);

    impl ErrorReporter for Recorder {
        fn report(&self, title: &str, error: &Error) {
            self.0.borrow_mut().push((title.to_string(), error.to_string()));
        }
    }

    #[test]
    fn store_errors_are_shown_verbatim() {
        let recorder = Recorder(RefCell::new(Vec::new()));
        let e = Error::StoreError("UNIQUE constraint failed: TABLE3.COLUMN7".into());
        report(&recorder, "Error while updating cell.", &e);

        let shown = recorder.0.borrow();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, "Error while updating cell.");
        assert_eq!(shown[0].1, "UNIQUE constraint failed: TABLE3.COLUMN7");
    }

    #[test]
    fn error_converts_into_message() {
        let message: String = Error::MissingContextError("table_oid".into()).into();
        assert_eq!(message, "Missing required context: table_oid");
    }

    #[test]
    fn failed_validation_uses_camel_case() {
        let v: FailedValidation = serde_json::from_str(r#"{"description":"Value must be unique."}"#).unwrap();
        assert_eq!(v.description, "Value must be unique.");
    }
}
