pub mod envelope;
pub mod transport;
pub mod wsdl;

pub use transport::{SoapBinding, SoapTransport, OPTION_ENDPOINT, OPTION_TIMEOUT_SECONDS};
pub use wsdl::{OperationInfo, ServiceDescription, SoapVersion};
