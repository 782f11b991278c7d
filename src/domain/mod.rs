pub mod category;
pub mod order_detail;
pub mod product;
pub mod seed;
pub mod supplier;

pub use category::*;
pub use order_detail::*;
pub use product::*;
pub use seed::*;
pub use supplier::*;
