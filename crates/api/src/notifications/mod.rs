//! Outbound notification delivery.

mod email;

pub use email::{send_detached, EmailConfig, EmailError, Mailer};
