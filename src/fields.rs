//! Report field selection and extraction
//!
//! Maps user-supplied field names to the `Field` enum and turns a detail record
//! into an `OutputRow` for those fields.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::data::PokemonDetail;

/// A field name that is not in the known set
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown field: '{0}'. Valid fields: name, id, height, weight, hp, attack, defense, special-attack, special-defense, speed, types, sprite")]
pub struct UnknownFieldError(pub String);

/// A column that can be requested in the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Id,
    Height,
    Weight,
    Hp,
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Types,
    Sprite,
}

impl Field {
    /// Every field, in the order `--all-fields` uses
    pub const ALL: [Field; 12] = [
        Field::Name,
        Field::Id,
        Field::Height,
        Field::Weight,
        Field::Hp,
        Field::Attack,
        Field::Defense,
        Field::SpecialAttack,
        Field::SpecialDefense,
        Field::Speed,
        Field::Types,
        Field::Sprite,
    ];

    /// The six base stats
    pub const STATS: [Field; 6] = [
        Field::Hp,
        Field::Attack,
        Field::Defense,
        Field::SpecialAttack,
        Field::SpecialDefense,
        Field::Speed,
    ];

    /// Column name, also the API stat name for stat fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Id => "id",
            Field::Height => "height",
            Field::Weight => "weight",
            Field::Hp => "hp",
            Field::Attack => "attack",
            Field::Defense => "defense",
            Field::SpecialAttack => "special-attack",
            Field::SpecialDefense => "special-defense",
            Field::Speed => "speed",
            Field::Types => "types",
            Field::Sprite => "sprite",
        }
    }

    /// True for fields backed by a base stat
    pub fn is_stat(&self) -> bool {
        Field::STATS.contains(self)
    }

    /// The preset used by `--all-stats`: name, id, every stat, sprite
    pub fn all_stats_preset() -> Vec<Field> {
        let mut fields = vec![Field::Name, Field::Id];
        fields.extend(Field::STATS);
        fields.push(Field::Sprite);
        fields
    }
}

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| UnknownFieldError(s.trim().to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a comma-separated field list
///
/// Names are trimmed and matched case-insensitively; empty items are skipped and
/// repeated fields keep only their first position.
///
/// # Returns
/// * `Ok(Vec<Field>)` in requested order without duplicates
/// * `Err(UnknownFieldError)` for the first name that is not a known field
pub fn parse_field_list(list: &str) -> Result<Vec<Field>, UnknownFieldError> {
    let mut fields = Vec::new();
    for item in list.split(',').filter(|s| !s.trim().is_empty()) {
        let field: Field = item.parse()?;
        if !fields.contains(&field) {
            fields.push(field);
        }
    }
    Ok(fields)
}

/// A single scalar value in a report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Text(String),
    Integer(u32),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => f.write_str(s),
            Cell::Integer(n) => write!(f, "{}", n),
            Cell::Empty => Ok(()),
        }
    }
}

/// One report row: a value per requested field, in requested order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    cells: Vec<(Field, Cell)>,
}

impl OutputRow {
    /// The value for `field`, if it was requested
    pub fn get(&self, field: Field) -> Option<&Cell> {
        self.cells.iter().find(|(f, _)| *f == field).map(|(_, c)| c)
    }

    /// Fields in column order
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.cells.iter().map(|(f, _)| *f)
    }

    /// Rendered values in column order
    pub fn values(&self) -> Vec<String> {
        self.cells.iter().map(|(_, c)| c.to_string()).collect()
    }
}

/// Builds the row for one Pokémon
///
/// # Arguments
/// * `detail` - The detail record
/// * `fields` - Requested fields, already validated and deduplicated
/// * `sprite` - Value for the sprite column: a local path or remote URL, or
///   `None` when the Pokémon has no sprite
pub fn extract(detail: &PokemonDetail, fields: &[Field], sprite: Option<&str>) -> OutputRow {
    let cells = fields
        .iter()
        .map(|&field| (field, extract_cell(detail, field, sprite)))
        .collect();
    OutputRow { cells }
}

fn extract_cell(detail: &PokemonDetail, field: Field, sprite: Option<&str>) -> Cell {
    match field {
        Field::Name => Cell::Text(detail.name.clone()),
        Field::Id => Cell::Integer(detail.id),
        Field::Height => Cell::Integer(detail.height),
        Field::Weight => Cell::Integer(detail.weight),
        Field::Types => Cell::Text(detail.types.join(", ")),
        Field::Sprite => sprite.map_or(Cell::Empty, |s| Cell::Text(s.to_string())),
        stat => detail.stat(stat.as_str()).map_or(Cell::Empty, Cell::Integer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Stat;

    fn bulbasaur() -> PokemonDetail {
        PokemonDetail {
            id: 1,
            name: "bulbasaur".to_string(),
            height: 7,
            weight: 69,
            stats: vec![
                Stat {
                    name: "hp".to_string(),
                    base: 45,
                },
                Stat {
                    name: "special-attack".to_string(),
                    base: 65,
                },
                Stat {
                    name: "speed".to_string(),
                    base: 45,
                },
            ],
            types: vec!["grass".to_string(), "poison".to_string()],
            sprite_url: Some("https://example.test/1.png".to_string()),
        }
    }

    #[test]
    fn test_parse_field_names() {
        assert_eq!("name".parse::<Field>().unwrap(), Field::Name);
        assert_eq!(" Special-Attack ".parse::<Field>().unwrap(), Field::SpecialAttack);
        assert_eq!("SPRITE".parse::<Field>().unwrap(), Field::Sprite);
    }

    #[test]
    fn test_every_field_parses_from_its_own_name() {
        for field in Field::ALL {
            assert_eq!(field.as_str().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = "nickname".parse::<Field>().unwrap_err();
        assert_eq!(err, UnknownFieldError("nickname".to_string()));
        assert!(err.to_string().contains("Unknown field: 'nickname'"));
    }

    #[test]
    fn test_parse_field_list_keeps_order_and_drops_duplicates() {
        let fields = parse_field_list("speed, name,speed,types,NAME").unwrap();
        assert_eq!(fields, vec![Field::Speed, Field::Name, Field::Types]);
    }

    #[test]
    fn test_parse_field_list_skips_empty_items() {
        let fields = parse_field_list("name,,id,").unwrap();
        assert_eq!(fields, vec![Field::Name, Field::Id]);
        assert!(parse_field_list("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_field_list_fails_on_first_unknown() {
        let err = parse_field_list("name,colour,shape").unwrap_err();
        assert_eq!(err.0, "colour");
    }

    #[test]
    fn test_all_stats_preset() {
        let preset = Field::all_stats_preset();
        assert_eq!(preset.first(), Some(&Field::Name));
        assert_eq!(preset.last(), Some(&Field::Sprite));
        assert_eq!(preset.len(), 9);
        assert!(preset[2..8].iter().all(Field::is_stat));
    }

    #[test]
    fn test_extract_attributes_and_stats() {
        let detail = bulbasaur();
        let fields = [Field::Id, Field::Name, Field::Height, Field::Weight, Field::Speed, Field::SpecialAttack];

        let row = extract(&detail, &fields, None);

        assert_eq!(row.values(), vec!["1", "bulbasaur", "7", "69", "45", "65"]);
        assert_eq!(row.fields().collect::<Vec<_>>(), fields.to_vec());
    }

    #[test]
    fn test_extract_joins_types_in_order() {
        let row = extract(&bulbasaur(), &[Field::Types], None);
        assert_eq!(row.get(Field::Types), Some(&Cell::Text("grass, poison".to_string())));
    }

    #[test]
    fn test_extract_missing_stat_is_empty() {
        let row = extract(&bulbasaur(), &[Field::Defense], None);
        assert_eq!(row.get(Field::Defense), Some(&Cell::Empty));
        assert_eq!(row.values(), vec![""]);
    }

    #[test]
    fn test_extract_uses_given_sprite_value() {
        let detail = bulbasaur();

        let row = extract(&detail, &[Field::Sprite], Some("sprites/bulbasaur.png"));
        assert_eq!(row.values(), vec!["sprites/bulbasaur.png"]);

        let row = extract(&detail, &[Field::Sprite], None);
        assert_eq!(row.get(Field::Sprite), Some(&Cell::Empty));
    }

    #[test]
    fn test_unrequested_field_is_absent() {
        let row = extract(&bulbasaur(), &[Field::Name], None);
        assert!(row.get(Field::Id).is_none());
    }
}
