pub mod http_source;

pub use http_source::HttpContentSource;
