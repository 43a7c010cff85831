pub mod live;
pub mod rpc;
pub mod selector;
