pub mod application;
pub mod form;
