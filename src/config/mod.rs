//! Configuration module

mod site;

pub use site::{
    ContentDirsConfig, FeedConfig, NavLink, SiteConfig, ThemeConfig,
};
