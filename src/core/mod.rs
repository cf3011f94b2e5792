pub mod bridge;
pub mod decoder;
pub mod invoker;

pub use crate::domain::model::{CallOutcome, ClientOptions, Value};
pub use crate::domain::ports::{Binding, Transport};
pub use crate::utils::error::Result;
