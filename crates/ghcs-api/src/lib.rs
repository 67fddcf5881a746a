//! HTTP plumbing for ghcs.
//!
//! [`ApiClient`] implements [`CodespacesApi`], the seam the codespace
//! workflows are written against, plus the account, actions, issue,
//! repository and raw request calls used by the other commands.

pub mod client;
pub mod http_client;
pub mod issues;
pub mod repo;
pub mod repos;
pub mod rest;
pub mod types;

#[cfg(test)]
mod test_server;

pub use client::{ApiClient, CodespacesApi};
pub use issues::{Issue, IssueUpdate, MetadataWanted, NamedId, RepoMetadata};
pub use repo::RepoRef;
pub use repos::{CreatedRepository, ForkedRepository, NewRepository, Visibility};
pub use rest::{RawRequest, RawResponse, RequestError};
pub use types::{
    Codespace, CodespaceConnection, CodespaceEnvironment, CodespaceState, CreateCodespaceParams,
    GpgKey, PostCreateState, PostCreateStatus, Repository, RepositoryDetails, Sku, User,
};
