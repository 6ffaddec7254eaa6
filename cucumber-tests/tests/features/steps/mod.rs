pub mod gating_steps;
pub mod notification_steps;
pub mod proxy_steps;
pub mod request_steps;
