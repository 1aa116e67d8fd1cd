//! GraphQL schema assembly.
//!
//! The schema is split into per-domain query and mutation objects merged
//! into the roots. The [`ApiContext`] lives in the schema data; per-request
//! values (bearer token, user agent) are injected by the HTTP handler.

use async_graphql::{EmptySubscription, MergedObject, Schema};

use crate::state::ApiContext;

mod accounts;
mod catalog;
mod orders;

pub use accounts::{AccountMutation, AccountQuery};
pub use catalog::{CatalogMutation, CatalogQuery};
pub use orders::{OrderMutation, OrderQuery};

#[derive(MergedObject, Default)]
pub struct QueryRoot(AccountQuery, CatalogQuery, OrderQuery);

#[derive(MergedObject, Default)]
pub struct MutationRoot(AccountMutation, CatalogMutation, OrderMutation);

pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Build the executable schema with the shared context attached.
pub fn build_schema(ctx: ApiContext) -> ApiSchema {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(ctx)
    .finish()
}
