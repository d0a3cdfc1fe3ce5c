//! Characters: validated DNA/properties strings plus rank and government

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::characteristic::{Characteristic, CharacteristicKind, EYE_COLOR, HAIR_COLOR, MIN_DNA_LENGTH, MIN_PROPERTIES_LENGTH};
use crate::models::PortraitType;

/// Error for genome strings that cannot describe a character.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacterError {
    #[error("DNA is too short: {len} characters, at least {min} required")]
    DnaTooShort { len: usize, min: usize },
    #[error("Properties are too short: {len} characters, at least {min} required")]
    PropertiesTooShort { len: usize, min: usize },
}

/// Sex of a portrait, inferred from the portrait type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// `female` is checked first since every such name also contains `male`.
    pub fn from_portrait_type(name: &str) -> Option<Sex> {
        if name.contains("female") {
            Some(Sex::Female)
        } else if name.contains("male") {
            Some(Sex::Male)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

/// Title rank; its ordinal is the border tile index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    #[default]
    None,
    Baron,
    Count,
    Duke,
    King,
    Emperor,
}

impl Rank {
    pub const ALL: [Rank; 6] = [Rank::None, Rank::Baron, Rank::Count, Rank::Duke, Rank::King, Rank::Emperor];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rank::None => "none",
            Rank::Baron => "baron",
            Rank::Count => "count",
            Rank::Duke => "duke",
            Rank::King => "king",
            Rank::Emperor => "emperor",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rank {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rank::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown rank '{}' (expected one of: {})", s, join(Rank::ALL.map(Rank::as_str))))
    }
}

/// Government form; selects the border frame and some outfit overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Government {
    #[default]
    Feudal,
    Iqta,
    Theocracy,
    Republic,
    MerchantRepublic,
    Tribal,
    Nomadic,
    MonasticFeudal,
    ChineseImperial,
    ConfucianBureaucracy,
}

/// Border sprite name prefix; the government suffix is appended.
pub const BORDER_SPRITE_PREFIX: &str = "GFX_charframe_150";

impl Government {
    pub const ALL: [Government; 10] = [
        Government::Feudal,
        Government::Iqta,
        Government::Theocracy,
        Government::Republic,
        Government::MerchantRepublic,
        Government::Tribal,
        Government::Nomadic,
        Government::MonasticFeudal,
        Government::ChineseImperial,
        Government::ConfucianBureaucracy,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Government::Feudal => "feudal",
            Government::Iqta => "iqta",
            Government::Theocracy => "theocracy",
            Government::Republic => "republic",
            Government::MerchantRepublic => "merchant_republic",
            Government::Tribal => "tribal",
            Government::Nomadic => "nomadic",
            Government::MonasticFeudal => "monastic_feudal",
            Government::ChineseImperial => "chinese_imperial",
            Government::ConfucianBureaucracy => "confucian_bureaucracy",
        }
    }

    pub fn border_suffix(self) -> &'static str {
        match self {
            Government::Feudal => "",
            Government::Iqta => "_iqta",
            Government::Theocracy => "_theocracy",
            Government::Republic => "_republic",
            Government::MerchantRepublic => "_merchantrepublic",
            Government::Tribal => "_tribal",
            Government::Nomadic => "_nomadic",
            Government::MonasticFeudal => "_theocraticfeudal",
            Government::ChineseImperial => "_chineseimperial",
            Government::ConfucianBureaucracy => "_confucian",
        }
    }

    /// Border sprite name, e.g. `GFX_charframe_150_republic`.
    pub fn border_sprite(self) -> String {
        format!("{}{}", BORDER_SPRITE_PREFIX, self.border_suffix())
    }

    /// Outfit sprite family for governments that dress characters specially.
    pub fn outfit_prefix(self) -> Option<&'static str> {
        match self {
            Government::Theocracy => Some("religious"),
            Government::MerchantRepublic => Some("merchant"),
            _ => None,
        }
    }
}

impl fmt::Display for Government {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Government {
    type Err = String;

    /// Accepts the snake_case name, with or without underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.replace(['_', '-'], "");
        Government::ALL
            .into_iter()
            .find(|g| g.as_str().replace('_', "").eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| {
                format!("Unknown government '{}' (expected one of: {})", s, join(Government::ALL.map(Government::as_str)))
            })
    }
}

fn join<const N: usize>(names: [&str; N]) -> String {
    names.join(", ")
}

/// A character to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Character {
    dna: String,
    properties: String,
    pub portrait_type: PortraitType,
    pub rank: Rank,
    pub government: Government,
}

impl Character {
    /// Validate genome strings; short strings are rejected, never padded.
    pub fn new(
        dna: impl Into<String>,
        properties: impl Into<String>,
        portrait_type: PortraitType,
        rank: Rank,
        government: Government,
    ) -> Result<Self, CharacterError> {
        let dna = dna.into();
        let properties = properties.into();

        let len = dna.chars().count();
        if len < MIN_DNA_LENGTH {
            return Err(CharacterError::DnaTooShort { len, min: MIN_DNA_LENGTH });
        }
        let len = properties.chars().count();
        if len < MIN_PROPERTIES_LENGTH {
            return Err(CharacterError::PropertiesTooShort { len, min: MIN_PROPERTIES_LENGTH });
        }

        Ok(Self { dna, properties, portrait_type, rank, government })
    }

    pub fn dna(&self) -> &str {
        &self.dna
    }

    pub fn properties(&self) -> &str {
        &self.properties
    }

    pub fn sex(&self) -> Option<Sex> {
        Sex::from_portrait_type(&self.portrait_type.name)
    }

    /// Genome letter of a characteristic, if the strings are long enough.
    ///
    /// Hair and eye colour read the positions configured by the portrait type.
    pub fn letter(&self, characteristic: Characteristic) -> Option<char> {
        if characteristic == HAIR_COLOR {
            return self.dna.chars().nth(self.portrait_type.hair_colour_index);
        }
        if characteristic == EYE_COLOR {
            return self.dna.chars().nth(self.portrait_type.eye_colour_index);
        }
        match characteristic.kind {
            CharacteristicKind::Genome => self.dna.chars().nth(characteristic.index),
            CharacteristicKind::Trait => self.properties.chars().nth(characteristic.index),
        }
    }
}

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DNA: {}, Properties: {}", self.dna, self.properties)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::characteristic::{trait_at, CLOTHES, NECK};

    fn character(dna: &str, properties: &str) -> Result<Character, CharacterError> {
        Character::new(dna, properties, PortraitType::new("PORTRAIT_westerngfx_female"), Rank::Duke, Government::Feudal)
    }

    #[test]
    fn test_short_strings_rejected() {
        assert_eq!(character("abc", "aaaaaaaaaaa"), Err(CharacterError::DnaTooShort { len: 3, min: 10 }));
        assert_eq!(
            character("aaaaaaaaaa", "aaaaaaaaaa"),
            Err(CharacterError::PropertiesTooShort { len: 10, min: 11 })
        );
        assert!(character("aaaaaaaaaa", "aaaaaaaaaaa").is_ok());
    }

    #[test]
    fn test_letters() {
        let mut c = character("abcdefghij", "klmnopqrstu").unwrap();
        assert_eq!(c.letter(NECK), Some('a'));
        assert_eq!(c.letter(CLOTHES), Some('n'));
        assert_eq!(c.letter(HAIR_COLOR), Some('i'));
        assert_eq!(c.letter(EYE_COLOR), Some('j'));

        c.portrait_type.hair_colour_index = 2;
        c.portrait_type.eye_colour_index = 20;
        assert_eq!(c.letter(HAIR_COLOR), Some('c'));
        assert_eq!(c.letter(EYE_COLOR), None);
    }

    #[test]
    fn test_custom_trait_beyond_properties() {
        let c = character("abcdefghij", "klmnopqrstuvw").unwrap();
        assert_eq!(c.letter(trait_at(12)), Some('w'));
        assert_eq!(c.letter(trait_at(40)), None);
    }

    #[test]
    fn test_sex_inference() {
        assert_eq!(Sex::from_portrait_type("PORTRAIT_westerngfx_female"), Some(Sex::Female));
        assert_eq!(Sex::from_portrait_type("PORTRAIT_westerngfx_male"), Some(Sex::Male));
        assert_eq!(Sex::from_portrait_type("PORTRAIT_westerngfx_child"), None);
    }

    #[test]
    fn test_border_sprites() {
        assert_eq!(Government::Feudal.border_sprite(), "GFX_charframe_150");
        assert_eq!(Government::MonasticFeudal.border_sprite(), "GFX_charframe_150_theocraticfeudal");
        assert_eq!(Government::ConfucianBureaucracy.border_sprite(), "GFX_charframe_150_confucian");
        assert_eq!(Government::Theocracy.outfit_prefix(), Some("religious"));
        assert_eq!(Government::MerchantRepublic.outfit_prefix(), Some("merchant"));
        assert_eq!(Government::Republic.outfit_prefix(), None);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("merchant_republic".parse(), Ok(Government::MerchantRepublic));
        assert_eq!("MerchantRepublic".parse(), Ok(Government::MerchantRepublic));
        assert_eq!("chinese-imperial".parse(), Ok(Government::ChineseImperial));
        assert!("anarchy".parse::<Government>().is_err());

        assert_eq!("Emperor".parse(), Ok(Rank::Emperor));
        assert_eq!(Rank::Emperor.ordinal(), 5);
        assert!("pope".parse::<Rank>().is_err());
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Government::MerchantRepublic).unwrap(), "\"merchant_republic\"");
        assert_eq!(serde_json::from_str::<Rank>("\"count\"").unwrap(), Rank::Count);
    }
}
