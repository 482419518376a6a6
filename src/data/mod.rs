//! Core data models for pokefetch
//!
//! This module contains the Pokémon list and detail types, together with the
//! API-shaped serde representations they are read from and cached as.

pub mod client;

pub use client::{ApiError, PokeApi, PokeApiClient, DEFAULT_BASE_URL};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One entry of the Pokémon list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonListEntry {
    /// Pokémon name, also used as the cache key for its detail record
    pub name: String,
    /// URL of the detail endpoint for this Pokémon
    #[serde(rename = "url")]
    pub detail_url: String,
}

/// The complete Pokémon list in API order
///
/// Serialized as a plain JSON array. Deserialization also accepts the
/// `{"timestamp": ..., "pokemon_list": [...]}` envelope written by earlier
/// versions of the tool, keeping the timestamp in `cached_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ListFile", into = "Vec<PokemonListEntry>")]
pub struct PokemonList {
    /// Entries in API order
    pub entries: Vec<PokemonListEntry>,
    /// When the list was cached, if the cache file recorded it
    pub cached_at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListFile {
    Plain(Vec<PokemonListEntry>),
    Stamped {
        timestamp: Option<NaiveDateTime>,
        pokemon_list: Vec<PokemonListEntry>,
    },
}

impl From<ListFile> for PokemonList {
    fn from(file: ListFile) -> Self {
        match file {
            ListFile::Plain(entries) => Self {
                entries,
                cached_at: None,
            },
            ListFile::Stamped {
                timestamp,
                pokemon_list,
            } => Self {
                entries: pokemon_list,
                cached_at: timestamp,
            },
        }
    }
}

impl From<PokemonList> for Vec<PokemonListEntry> {
    fn from(list: PokemonList) -> Self {
        list.entries
    }
}

impl From<Vec<PokemonListEntry>> for PokemonList {
    fn from(entries: Vec<PokemonListEntry>) -> Self {
        Self {
            entries,
            cached_at: None,
        }
    }
}

/// A single base stat of a Pokémon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// API stat name, e.g. `special-attack`
    pub name: String,
    /// Base value
    pub base: u32,
}

/// The fields of a Pokémon detail record that pokefetch uses
///
/// Reads and writes the nested API shape (`stats[].stat.name`,
/// `types[].type.name`, `sprites.front_default`), so full API payloads cached by
/// other tools are accepted and unrelated keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPokemon", into = "RawPokemon")]
pub struct PokemonDetail {
    /// National Pokédex number
    pub id: u32,
    /// Pokémon name
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base stats in API order
    pub stats: Vec<Stat>,
    /// Type names in slot order
    pub types: Vec<String>,
    /// Default front sprite URL, if the Pokémon has one
    pub sprite_url: Option<String>,
}

impl PokemonDetail {
    /// Looks up a base stat by its API name
    pub fn stat(&self, name: &str) -> Option<u32> {
        self.stats.iter().find(|s| s.name == name).map(|s| s.base)
    }
}

#[derive(Serialize, Deserialize)]
struct RawPokemon {
    id: u32,
    name: String,
    height: u32,
    weight: u32,
    #[serde(default)]
    stats: Vec<RawStat>,
    #[serde(default)]
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    sprites: RawSprites,
}

#[derive(Serialize, Deserialize)]
struct RawStat {
    base_stat: u32,
    stat: NamedResource,
}

#[derive(Serialize, Deserialize)]
struct RawTypeSlot {
    slot: u32,
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Serialize, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Default, Serialize, Deserialize)]
struct RawSprites {
    front_default: Option<String>,
}

impl From<RawPokemon> for PokemonDetail {
    fn from(raw: RawPokemon) -> Self {
        let mut types = raw.types;
        types.sort_by_key(|t| t.slot);

        Self {
            id: raw.id,
            name: raw.name,
            height: raw.height,
            weight: raw.weight,
            stats: raw
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    base: s.base_stat,
                })
                .collect(),
            types: types.into_iter().map(|t| t.kind.name).collect(),
            sprite_url: raw.sprites.front_default,
        }
    }
}

impl From<PokemonDetail> for RawPokemon {
    fn from(detail: PokemonDetail) -> Self {
        Self {
            id: detail.id,
            name: detail.name,
            height: detail.height,
            weight: detail.weight,
            stats: detail
                .stats
                .into_iter()
                .map(|s| RawStat {
                    base_stat: s.base,
                    stat: NamedResource { name: s.name },
                })
                .collect(),
            types: detail
                .types
                .into_iter()
                .enumerate()
                .map(|(i, name)| RawTypeSlot {
                    slot: i as u32 + 1,
                    kind: NamedResource { name },
                })
                .collect(),
            sprites: RawSprites {
                front_default: detail.sprite_url,
            },
        }
    }
}
