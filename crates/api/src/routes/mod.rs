pub mod chart;
pub mod chat;
pub mod payment;
pub mod usage;
