//! Core data models for the Pokédex
//!
//! This module contains the response shapes returned by PokéAPI and the
//! client used to fetch them.

pub mod pokeapi;

pub use pokeapi::{ApiError, PokeApiClient, DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT};

use serde::{Deserialize, Serialize};

/// A named link to another API resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    /// Resource name (e.g. "bulbasaur", "grass")
    pub name: String,
    /// Absolute URL of the resource
    pub url: String,
}

/// One page of the Pokémon index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonListing {
    /// Total number of Pokémon known to the API
    pub count: u32,
    /// Entries on this page, in API order
    pub results: Vec<NamedResource>,
}

/// Details for a single Pokémon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonDetailData {
    /// National dex number
    pub id: u32,
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Type slots, ordered by slot
    pub types: Vec<PokemonTypeSlot>,
    pub sprites: Sprites,
}

/// A type assigned to a Pokémon in a given slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonTypeSlot {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

/// Sprite images for a Pokémon
///
/// PokéAPI returns `null` for forms without artwork, so the default
/// sprite is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
}

impl PokemonDetailData {
    /// Returns the type names in slot order
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.kind.name.as_str()).collect()
    }
}

/// Joins items as an English conjunction list.
///
/// Follows the en-GB short list style: no serial comma, so three items
/// read "fire, flying and dragon".
pub fn conjunction_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{} and {}", head.join(", "), last.as_ref())
        }
    }
}
