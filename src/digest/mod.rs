pub mod mass;
pub mod modification;
pub mod protease;
pub mod source;
