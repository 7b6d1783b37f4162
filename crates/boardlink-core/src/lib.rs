//! Boardlink Core - Board URI resolution and sketch binding
//!
//! This crate provides the foundational pieces of Boardlink:
//! - Board URI classification into serial or network transports
//! - Device snapshot types produced by discovery scans
//! - Board catalog lookup by USB signature or advertised name
//! - Device resolution and the attach flow that persists the binding

pub mod attach;
pub mod catalog;
pub mod device;
pub mod resolver;
pub mod sketch;
pub mod uri;

pub use attach::{attach, AttachError, AttachRequest, DeviceScanner, ErrorKind, DEFAULT_SCAN_TIMEOUT};
pub use catalog::{BoardCatalog, BoardDefinition, BoardEntry, CatalogError, CatalogIndex, UsbSignature};
pub use device::{DeviceSnapshot, NetworkDevice, SerialDevice};
pub use resolver::{AttachResult, DeviceResolver, ResolveError};
pub use sketch::{MetadataCpu, MetadataStore, Sketch, SketchError, SketchMetadata, Sketchbook};
pub use uri::{DeviceUri, Transport, UriError};
