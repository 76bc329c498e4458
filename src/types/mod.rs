// ABOUTME: Validated domain types shared by config and the release pipeline.
// ABOUTME: Image names, container names and the container runtime selector.

mod container_name;
mod image_name;
mod runtime;

pub use container_name::{ContainerName, ContainerNameError};
pub use image_name::{ImageName, ImageNameError};
pub use runtime::RuntimeType;
