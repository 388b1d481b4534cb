pub mod client;
pub mod http;

pub use client::StaffingApi;
pub use http::HttpStaffingApi;
