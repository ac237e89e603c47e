//! Backend module - Code generation

pub mod java;

pub use java::JavaCodeGen;
