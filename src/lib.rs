//! Release-note inference and deployment verification for component
//! updates of the Git for Windows packages.
//!
//! An update issue or pull request is parsed into an [`UpdateDescriptor`],
//! turned into a [`ReleaseNote`] that links the upstream changelog, and the
//! packages built for it are checked against the package repository.
pub mod config;
pub mod error;
pub mod extract;
pub mod forge;
pub mod package;
pub mod planner;
pub mod release_note;
pub mod verifier;

pub use error::{ComponentUpdateError, Result};
pub use extract::{UpdateDescriptor, guess_component_update_details};
pub use planner::ArtifactPlanner;
pub use release_note::{ReleaseNote, ReleaseNoteComposer};
pub use verifier::DeploymentVerifier;
