//! Client plumbing for the RBAC service and other paged REST APIs.
//!
//! [`RbacService::call`] builds a client bound to the `RBAC_URL` base, forwards
//! the caller's identity headers and folds transport failures into
//! [`ServiceError`]. [`paginate`] and [`paginate_stream`] stitch `limit`/`offset`
//! pages into one lazy sequence of records.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod pagination;
pub mod service;

pub use client::ApiClient;
pub use config::{EnvLookup, RBAC_URL_VAR};
pub use error::{ApiError, ConfigError, NetworkError, ServiceError, TimedOutError};
pub use headers::{IdentityHeaders, merge_headers};
pub use pagination::{PageOptions, PageRequest, Paged, PagedResult, Pages, PaginationMeta, paginate, paginate_stream};
pub use service::{Api, RbacService, Status, StatusApi};
