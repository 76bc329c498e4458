// ABOUTME: The release pipeline: resolve tags, build, publish, deploy.
// ABOUTME: Also the read-only status and tag listing paths sharing its naming rules.

pub mod build;
pub mod deploy;
pub mod error;
pub mod listing;
pub mod lock;
pub mod publish;
pub mod status;
pub mod tag;

pub use build::{BuildPaths, ImageBuilder};
pub use deploy::RemoteDeployer;
pub use error::{BuildError, DeployError, ListError, PublishError, ResolveError, StatusError};
pub use lock::{DeployLock, LockInfo};
pub use publish::{CONDUIT_CAPACITY, ImagePublisher, Transport};
pub use status::{ContainerState, Status, StatusProber};
pub use tag::{TagSet, apply_suffix, extract_suffix};
