pub mod mowse;
