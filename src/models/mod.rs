mod credentials;
mod identity;

pub use credentials::*;
pub use identity::*;
