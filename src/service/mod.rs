pub mod connection_actor;
pub mod connector;
pub mod form_flow;
