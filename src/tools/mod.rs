//! SnapCal Tools module
//!
//! Request/response functions behind the MCP tools. Each returns
//! `Result<Response, String>`; the server serializes the response.

pub mod analysis;
pub mod awards;
pub mod logging;
pub mod persist;
pub mod profiles;
pub mod progress;
pub mod session;
pub mod status;

pub use session::Session;
