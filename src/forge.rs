//! GitHub API and raw HTTPS collaborators.
//!
//! The inference code only talks to the traits in [`traits`]; the concrete
//! clients wrap `reqwest` and are swapped for mocks in tests.

/// GitHub REST client.
pub mod github;

/// Raw HTTPS probing and page fetching.
pub mod https;

/// Request and response types shared by the collaborators.
pub mod request;

/// Collaborator traits.
pub mod traits;
