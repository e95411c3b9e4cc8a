mod login;

pub use login::{LoginOutcome, LoginService};
