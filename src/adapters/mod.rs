// Adapters layer: concrete implementations of the domain ports (hosted database, terminal).

pub mod console;
pub mod postgrest;
