pub mod http;
pub mod session_file;
pub mod session_memory;
pub mod ws;

pub use http::HttpShopAdapter;
pub use session_file::FileSessionStore;
pub use session_memory::MemorySessionStore;
pub use ws::WsFeedTransport;
