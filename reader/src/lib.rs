pub mod base;
pub mod bytecode;
pub mod descriptor;

pub use base::ClassFile;
pub use binrw::BinRead;
