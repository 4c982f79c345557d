mod url;

pub use url::{CreateUrlRequest, UrlRecord};
