//! Best-effort push delivery to the real-time gateway.

pub mod fanout;
pub mod gateway;

pub use fanout::{BumpReport, PushFanoutService};
pub use gateway::{GatewayError, HttpPushGateway, PushGateway};
