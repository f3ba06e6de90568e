mod artifact_file;
pub mod packer;
pub mod process_runner;
pub mod terraform;
