mod common;
mod compliance;
mod properties;
