//! illdetect-web — HTTP surface of the IllDetect prediction service.

pub mod handlers;
pub mod router;
pub mod state;
