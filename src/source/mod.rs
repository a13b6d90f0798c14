mod file_source;
mod http_source;
mod map_source;

pub use file_source::FileSource;
pub use http_source::HttpSource;
pub use map_source::MapSource;
