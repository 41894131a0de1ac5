//! Core primitives for the Blobscope project.
/// EIP-4844 blob gas accounting
pub mod blob_gas;
/// Raw block input types
pub mod block;
