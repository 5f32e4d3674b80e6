pub mod inbound;

pub use inbound::PostFanout;
