pub mod opa;

pub use opa::{opa_authorize, OpaClient, OpaError};
