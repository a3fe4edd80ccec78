pub mod responses;
pub mod status;
