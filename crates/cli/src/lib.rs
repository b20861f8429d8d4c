//! Command-line front-ends for the recode tools.
pub mod deflate;
pub mod exit;
pub mod logging;
pub mod mp3tag;
pub mod txtenc;
