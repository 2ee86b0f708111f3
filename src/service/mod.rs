pub mod backup;
pub mod cleanup;
pub mod pipeline;
pub mod upload;
