pub mod api;
pub mod backend;
pub mod rpc;
pub mod websocket;

pub use backend::BackendClient;
