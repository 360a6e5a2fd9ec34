//! Bridge between query keys and the network

use futures::future::{BoxFuture, FutureExt};

use super::{QueryData, QueryKey};
use crate::data::{ApiError, PokeApiClient};

/// Future resolving to the payload for one query
pub type FetchFuture = BoxFuture<'static, Result<QueryData, ApiError>>;

/// Performs the underlying request for a query key
///
/// The returned future is spawned onto the runtime, so it must own
/// everything it needs.
pub trait Fetcher: Send + Sync + 'static {
    fn fetch(&self, key: &QueryKey) -> FetchFuture;
}

impl Fetcher for PokeApiClient {
    fn fetch(&self, key: &QueryKey) -> FetchFuture {
        let client = self.clone();
        let key = key.clone();
        async move {
            match key {
                QueryKey::PokemonList { limit } => {
                    client.fetch_listing(limit).await.map(QueryData::from)
                }
                QueryKey::PokemonDetail { name } => {
                    client.fetch_detail(&name).await.map(QueryData::from)
                }
            }
        }
        .boxed()
    }
}
