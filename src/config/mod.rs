//! Configuration module

mod site;

pub use site::RemoteConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::{KEY_ENV, URL_ENV};
