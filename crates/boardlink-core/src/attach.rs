//! Attach a sketch to the board found at a URI
//!
//! The flow is classify → sketch lookup → scan → resolve → persist. The
//! URI and the sketch are checked before scanning so bad input never
//! waits for the scan window.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::BoardCatalog;
use crate::device::DeviceSnapshot;
use crate::resolver::{AttachResult, DeviceResolver, ResolveError};
use crate::sketch::MetadataStore;
use crate::uri::{DeviceUri, UriError};

/// Default length of the discovery window
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of device snapshots
pub trait DeviceScanner {
    /// Observe devices for `window`, then return what was seen
    fn scan(&self, window: Duration) -> impl Future<Output = DeviceSnapshot> + Send;
}

/// Coarse error classes used to pick an exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input from the caller
    BadCall,
    /// Sketch or board missing, or the binding could not be saved
    Generic,
    /// The environment is not set up (sketchbook, board index)
    Configuration,
}

#[derive(Error, Debug)]
pub enum AttachError {
    #[error(transparent)]
    InvalidUriFormat(#[from] UriError),
    #[error("Cannot find sketch `{0}` in the sketchbook")]
    SketchNotFound(String),
    #[error(transparent)]
    DeviceNotFound(ResolveError),
    #[error(transparent)]
    UnsupportedBoard(ResolveError),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Cannot export sketch metadata: {0}")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AttachError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttachError::InvalidUriFormat(_) => ErrorKind::BadCall,
            AttachError::SketchNotFound(_)
            | AttachError::DeviceNotFound(_)
            | AttachError::UnsupportedBoard(_)
            | AttachError::Persistence(_) => ErrorKind::Generic,
            AttachError::Configuration(_) => ErrorKind::Configuration,
        }
    }
}

impl From<ResolveError> for AttachError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::DeviceNotFound(_) => AttachError::DeviceNotFound(err),
            ResolveError::UnsupportedBoard { .. } => AttachError::UnsupportedBoard(err),
        }
    }
}

/// Parameters of one attach invocation
#[derive(Debug, Clone)]
pub struct AttachRequest {
    pub sketch: String,
    pub board_uri: String,
    /// CPU flavour requested by the user
    pub flavour: String,
    /// Discovery window
    pub timeout: Duration,
}

impl AttachRequest {
    pub fn new(sketch: impl Into<String>, board_uri: impl Into<String>) -> Self {
        Self {
            sketch: sketch.into(),
            board_uri: board_uri.into(),
            flavour: "default".to_string(),
            timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

/// Run one attach operation
pub async fn attach<S, C, M>(
    request: &AttachRequest,
    scanner: &S,
    catalog: &C,
    store: &M,
) -> Result<AttachResult, AttachError>
where
    S: DeviceScanner,
    C: BoardCatalog,
    M: MetadataStore,
{
    let uri = DeviceUri::classify(&request.board_uri)?;
    debug!(uri = %request.board_uri, transport = %uri.transport(), "Classified board URI");

    if !store.has_sketch(&request.sketch) {
        return Err(AttachError::SketchNotFound(request.sketch.clone()));
    }

    info!(
        timeout_ms = request.timeout.as_millis() as u64,
        flavour = %request.flavour,
        "Searching for connected boards"
    );
    let snapshot = scanner.scan(request.timeout).await;
    debug!(
        serial = snapshot.serial.len(),
        network = snapshot.network.len(),
        "Scan snapshot captured"
    );

    let result = DeviceResolver::new(catalog).resolve_attach(&uri, snapshot)?;
    info!(board = %result.board.name, fqbn = %result.board.fqbn, "Supported board found");

    store
        .attach_board(&request.sketch, &result)
        .map_err(|e| AttachError::Persistence(Box::new(e)))?;

    Ok(result)
}
