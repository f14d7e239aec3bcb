pub mod common;
pub mod image;
pub mod product;
pub mod vision;

pub use self::common::*;
pub use self::image::*;
pub use self::product::*;
pub use self::vision::*;
