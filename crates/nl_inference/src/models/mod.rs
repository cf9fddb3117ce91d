pub mod dummy;
pub mod openai;
