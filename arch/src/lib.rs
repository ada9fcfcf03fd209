pub mod image;
pub mod mem;
pub mod op;
pub mod reg;
