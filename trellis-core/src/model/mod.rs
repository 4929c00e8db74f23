//! Tracked entities.
//!
//! Only the `Project` entity participates in dependency layering. Its
//! serialized form matches the datasource rows (`id`, `name`,
//! `dependsOnProjects`).

mod project;

pub use project::{Project, ProjectId};
