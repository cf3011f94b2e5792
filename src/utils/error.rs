use thiserror::Error;

/// Failures raised while reading markup.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("{0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("unexpected end of document, <{0}> is not closed")]
    UnclosedElement(String),

    #[error("document has no root element")]
    MissingRoot,

    #[error("text data outside of root node")]
    TextOutsideRoot,

    #[error("document has more than one root element, found <{0}>")]
    MultipleRoots(String),

    #[error("{0}")]
    Malformed(String),
}

/// Failures raised by the remote-call collaborator.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Http(#[source] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid service description: {message}")]
    Wsdl { message: String },

    #[error("unknown operation '{operation}', available: {available}")]
    UnknownOperation { operation: String, available: String },

    #[error("{code}: {reason}")]
    Fault { code: String, reason: String },

    #[error("invalid option {key}='{value}': {reason}")]
    InvalidOption {
        key: String,
        value: String,
        reason: String,
    },

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("invalid SOAP envelope: {message}")]
    Envelope { message: String },

    #[error("{0}")]
    Xml(#[from] XmlError),
}

impl TransportError {
    /// Collapses reqwest timeouts into [`TransportError::Timeout`].
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Http(err)
        }
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("request failed: {source}")]
    Request {
        #[source]
        source: TransportError,
    },

    #[error("retrieving failed: {source}")]
    Retrieve {
        #[source]
        source: Box<BridgeError>,
    },

    #[error("parsing failed: {source}")]
    Parse {
        #[source]
        source: XmlError,
    },

    #[error("processing failed: {source}")]
    Process {
        #[source]
        source: Box<BridgeError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Request,
    Retrieve,
    Parse,
    Process,
    Config,
    Io,
}

impl BridgeError {
    pub fn request(source: TransportError) -> Self {
        BridgeError::Request { source }
    }

    pub fn retrieve(source: BridgeError) -> Self {
        BridgeError::Retrieve {
            source: Box::new(source),
        }
    }

    pub fn parse(source: XmlError) -> Self {
        BridgeError::Parse { source }
    }

    pub fn process(source: BridgeError) -> Self {
        BridgeError::Process {
            source: Box::new(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BridgeError::Request { .. } => ErrorKind::Request,
            BridgeError::Retrieve { .. } => ErrorKind::Retrieve,
            BridgeError::Parse { .. } => ErrorKind::Parse,
            BridgeError::Process { .. } => ErrorKind::Process,
            BridgeError::IoError(_) => ErrorKind::Io,
            BridgeError::SerializationError(_)
            | BridgeError::ConfigError { .. }
            | BridgeError::MissingConfigError { .. }
            | BridgeError::InvalidConfigValueError { .. } => ErrorKind::Config,
        }
    }

    /// Innermost stage error, skipping the retrieve/process wrappers.
    pub fn root_cause(&self) -> &BridgeError {
        match self {
            BridgeError::Retrieve { source } | BridgeError::Process { source } => {
                source.root_cause()
            }
            other => other,
        }
    }

    /// The transport failure at the bottom of the chain, if the call stage failed.
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self.root_cause() {
            BridgeError::Request { source } => Some(source),
            _ => None,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.root_cause() {
            BridgeError::Request { source } => match source {
                TransportError::Timeout => "Raise timeout_seconds or check the service latency",
                TransportError::Wsdl { .. } => "Check that the WSDL location points at a SOAP service description",
                TransportError::UnknownOperation { .. } => "Pick one of the operations listed by the service description",
                TransportError::Fault { .. } => "The service rejected the call, check the arguments",
                TransportError::InvalidOption { .. } => "Fix the client option value",
                _ => "Check network connectivity and the service address",
            },
            BridgeError::Parse { .. } => "The service answered with text that is not well-formed XML",
            BridgeError::IoError(_) => "Check file paths and permissions",
            _ => "Check the configuration values",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.kind() {
            ErrorKind::Config => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
