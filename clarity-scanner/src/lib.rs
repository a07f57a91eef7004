pub mod error;
pub mod fetcher;
pub mod images;
pub mod page;

pub use error::FetchError;
pub use fetcher::{MAX_CONTENT_CHARS, PageFetcher};
pub use images::uncaptioned_images;
pub use page::{ImageTag, PageText};
