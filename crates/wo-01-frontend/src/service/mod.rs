//! Front-end services.

pub mod frontend;
pub mod gate;
pub mod poller;
pub mod publisher;

pub use frontend::FrontendService;
pub use gate::{GateGuard, SubscriptionGate};
pub use poller::NotificationPoller;
pub use publisher::WorkPublisher;
