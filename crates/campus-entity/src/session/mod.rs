//! Session entities: the persisted record and device metadata.

pub mod device;
pub mod model;

pub use device::{DeviceInfo, DeviceMeta};
pub use model::SessionRecord;
