mod file_fetcher;
mod http_fetcher;
mod routing_fetcher;
mod store_fetcher;

pub use file_fetcher::FileFetcher;
pub use http_fetcher::HttpFetcher;
pub use routing_fetcher::RoutingFetcher;
pub use store_fetcher::StoreFetcher;
