//! Windows sources: NPF driver handles, registry stores, IP Helper stack view.

mod registry;
mod stack;
mod transport;

pub use registry::{RegistryDeviceStore, RegistryTcpipStore};
pub use stack::IpHelperStack;
pub use transport::NpfTransport;
