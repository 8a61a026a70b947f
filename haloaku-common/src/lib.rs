pub mod feed;
pub mod model;
pub mod util;
