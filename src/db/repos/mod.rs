mod identity_stores;

pub use identity_stores::*;
