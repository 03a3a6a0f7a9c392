//! Helper functions for dates, HTML and URLs

pub mod date;
pub mod html;
pub mod url;
