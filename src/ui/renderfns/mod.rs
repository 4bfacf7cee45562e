pub mod footer;
pub mod header;
pub mod overlay;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use overlay::draw_input_overlay;
pub use utils::{format_price, truncate};
