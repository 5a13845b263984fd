pub mod plot;

pub use plot::{draw_scatter, save_png, save_svg};
