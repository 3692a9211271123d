pub mod indexes;
pub mod axis;
pub mod view;
pub mod matrix;
