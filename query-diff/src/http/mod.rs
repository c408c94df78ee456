pub mod client;
pub mod request_builder;
pub mod response_converter;

pub use client::HttpFetcher;
pub use request_builder::RequestBuilderImpl;
pub use response_converter::ResponseConverterImpl;
