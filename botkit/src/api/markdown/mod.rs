pub mod macros;
pub mod string;
pub mod validate;
