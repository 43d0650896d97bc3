#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    // Errors from external libraries
    Io(std::io::Error),
    Csv(csv::Error),
    Api(ibapi::Error),
    Format(time::error::Format),

    // Errors raised by the collector
    Config(String),
    Timeout(String),
    Simple(String),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::Io(ref err) => err.fmt(f),
            Error::Csv(ref err) => err.fmt(f),
            Error::Api(ref err) => write!(f, "gateway error: {err}"),
            Error::Format(ref err) => err.fmt(f),

            Error::Config(message) => write!(f, "invalid configuration: {message}"),
            Error::Timeout(request) => write!(f, "timed out waiting for {request}"),
            Error::Simple(ref err) => write!(f, "error occurred: {err}"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::Csv(err)
    }
}

impl From<ibapi::Error> for Error {
    fn from(err: ibapi::Error) -> Error {
        Error::Api(err)
    }
}

impl From<time::error::Format> for Error {
    fn from(err: time::error::Format) -> Error {
        Error::Format(err)
    }
}
