pub mod performance;
pub mod session;
pub mod shadow_tree;
pub mod transcode;
