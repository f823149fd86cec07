//! HTTP implementation of the Medica backend interface.

mod http;

pub use http::HttpBackend;
