pub mod request_id;

pub use request_id::{RequestId, request_id_middleware};
