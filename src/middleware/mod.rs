mod payload_limit;
mod request_id;

pub use payload_limit::payload_too_large_as_json;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
