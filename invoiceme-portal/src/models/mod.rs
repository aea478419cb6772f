pub mod context;
pub mod detail;

pub use context::{PortalContext, CHAT_SESSION_KEY};
pub use detail::{InvoiceDetailResponse, Outcome};
