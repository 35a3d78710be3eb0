//! Interactive citation network viewer: year and cluster visibility filtering
//! over flat GPU buffers plus adaptive level of detail.

pub mod engine;
pub mod rpc;
