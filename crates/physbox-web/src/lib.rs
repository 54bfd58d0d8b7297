mod common;
mod wasm;

pub use wasm::*;
