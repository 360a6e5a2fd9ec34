//! Query identity and payloads

use std::fmt;
use std::sync::Arc;

use crate::data::{PokemonDetailData, PokemonListing};

/// Identifies one logical request: an endpoint plus its parameters.
///
/// Two keys are equal iff both the endpoint and the parameters are equal,
/// so the cache holds exactly one entry per distinct request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The Pokémon index, first `limit` entries
    PokemonList { limit: u32 },
    /// Details for one Pokémon
    PokemonDetail { name: String },
}

impl QueryKey {
    pub fn pokemon_list(limit: u32) -> Self {
        QueryKey::PokemonList { limit }
    }

    pub fn pokemon_detail(name: impl Into<String>) -> Self {
        QueryKey::PokemonDetail { name: name.into() }
    }

    /// Endpoint name without parameters
    pub fn endpoint(&self) -> &'static str {
        match self {
            QueryKey::PokemonList { .. } => "pokemonList",
            QueryKey::PokemonDetail { .. } => "pokemonDetail",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::PokemonList { limit } => write!(f, "{}(limit={})", self.endpoint(), limit),
            QueryKey::PokemonDetail { name } => write!(f, "{}({})", self.endpoint(), name),
        }
    }
}

/// Payload of a fulfilled query
///
/// Payloads are immutable once fetched and shared between subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryData {
    Listing(Arc<PokemonListing>),
    Detail(Arc<PokemonDetailData>),
}

impl QueryData {
    pub fn as_listing(&self) -> Option<&PokemonListing> {
        match self {
            QueryData::Listing(listing) => Some(listing),
            QueryData::Detail(_) => None,
        }
    }

    pub fn as_detail(&self) -> Option<&PokemonDetailData> {
        match self {
            QueryData::Detail(detail) => Some(detail),
            QueryData::Listing(_) => None,
        }
    }
}

impl From<PokemonListing> for QueryData {
    fn from(listing: PokemonListing) -> Self {
        QueryData::Listing(Arc::new(listing))
    }
}

impl From<PokemonDetailData> for QueryData {
    fn from(detail: PokemonDetailData) -> Self {
        QueryData::Detail(Arc::new(detail))
    }
}
