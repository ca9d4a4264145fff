pub mod inputs;
pub mod reference;
