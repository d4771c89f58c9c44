mod domain;
pub use domain::*;

mod wire;
pub use wire::*;

mod error;
pub use error::ModelError;
