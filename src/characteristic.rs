//! Characteristic catalog - what each position of a DNA/properties string means
//!
//! A character is encoded as two strings: the DNA (genome) and the properties
//! (traits). Every position in those strings is a characteristic such as the
//! neck shape, the hair colour or the worn headgear. Layers of a portrait type
//! bind to one characteristic with a `d<N>` or `p<N>` modifier.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Which string a characteristic indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacteristicKind {
    /// Position in the DNA string (`d<N>` layer modifier)
    Genome,
    /// Position in the properties string (`p<N>` layer modifier)
    Trait,
}

impl CharacteristicKind {
    /// Modifier prefix used by layer declarations.
    pub fn prefix(self) -> char {
        match self {
            CharacteristicKind::Genome => 'd',
            CharacteristicKind::Trait => 'p',
        }
    }
}

/// Error when looking up a characteristic that cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CharacteristicError {
    #[error("Characteristic d{0} does not exist")]
    UnknownGenome(usize),
}

/// One DNA or properties slot.
///
/// Two characteristics are equal when they address the same position of the
/// same string; name, custom and randomizable flags do not take part.
/// Serialized as its `(kind, index)` reference and re-resolved against the
/// catalogs on load.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(into = "CharacteristicRef")]
pub struct Characteristic {
    pub name: &'static str,
    /// Position within its string
    pub index: usize,
    pub kind: CharacteristicKind,
    /// Not part of the built-in catalog (declared by add-on content)
    pub is_custom: bool,
    /// Whether random generation may pick a value for this slot
    pub randomizable: bool,
}

impl Characteristic {
    const fn builtin(name: &'static str, index: usize, kind: CharacteristicKind, randomizable: bool) -> Self {
        Self { name, index, kind, is_custom: false, randomizable }
    }

    /// A trait slot beyond the built-in catalog.
    pub const fn custom(index: usize) -> Self {
        Self {
            name: "Custom",
            index,
            kind: CharacteristicKind::Trait,
            is_custom: true,
            randomizable: true,
        }
    }

    pub fn is_genome(&self) -> bool {
        self.kind == CharacteristicKind::Genome
    }
}

/// Serialized form of a [`Characteristic`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct CharacteristicRef {
    kind: CharacteristicKind,
    index: usize,
}

impl From<CharacteristicRef> for Characteristic {
    fn from(r: CharacteristicRef) -> Self {
        match r.kind {
            CharacteristicKind::Genome => genome(r.index).unwrap_or(Characteristic {
                kind: CharacteristicKind::Genome,
                ..Characteristic::custom(r.index)
            }),
            CharacteristicKind::Trait => trait_at(r.index),
        }
    }
}

impl<'de> Deserialize<'de> for Characteristic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        CharacteristicRef::deserialize(deserializer).map(Into::into)
    }
}

impl From<Characteristic> for CharacteristicRef {
    fn from(c: Characteristic) -> Self {
        Self { kind: c.kind, index: c.index }
    }
}

impl PartialEq for Characteristic {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.kind == other.kind
    }
}

impl Eq for Characteristic {}

impl Hash for Characteristic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.kind.hash(state);
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}{})", self.name, self.kind.prefix(), self.index)
    }
}

use CharacteristicKind::{Genome, Trait};

pub const NECK: Characteristic = Characteristic::builtin("Neck", 0, Genome, true);
pub const CHIN: Characteristic = Characteristic::builtin("Chin", 1, Genome, true);
pub const MOUTH: Characteristic = Characteristic::builtin("Mouth", 2, Genome, true);
pub const NOSE: Characteristic = Characteristic::builtin("Nose", 3, Genome, true);
pub const CHEEKS: Characteristic = Characteristic::builtin("Cheeks", 4, Genome, true);
pub const D5: Characteristic = Characteristic::builtin("Unused", 5, Genome, true);
pub const EYES: Characteristic = Characteristic::builtin("Eyes", 6, Genome, true);
pub const EARS: Characteristic = Characteristic::builtin("Ears", 7, Genome, true);
pub const HAIR_COLOR: Characteristic = Characteristic::builtin("Haircolor", 8, Genome, true);
pub const EYE_COLOR: Characteristic = Characteristic::builtin("Eyecolor", 9, Genome, true);
pub const D10: Characteristic = Characteristic::builtin("Unused", 10, Genome, true);

pub const BACKGROUND: Characteristic = Characteristic::builtin("Background", 0, Trait, true);
pub const HAIR: Characteristic = Characteristic::builtin("Hair", 1, Trait, true);
pub const HEAD: Characteristic = Characteristic::builtin("Head", 2, Trait, true);
pub const CLOTHES: Characteristic = Characteristic::builtin("Clothes", 3, Trait, true);
pub const BEARD: Characteristic = Characteristic::builtin("Beard", 4, Trait, true);
pub const HEADGEAR: Characteristic = Characteristic::builtin("Headgear", 5, Trait, true);
pub const IMPRISONED: Characteristic = Characteristic::builtin("Imprisoned", 6, Trait, false);
pub const SCARS: Characteristic = Characteristic::builtin("Scars", 7, Trait, false);
pub const RED_DOTS: Characteristic = Characteristic::builtin("Reddots", 8, Trait, false);
pub const BOILS: Characteristic = Characteristic::builtin("Boils", 9, Trait, false);
pub const BLINDED: Characteristic = Characteristic::builtin("Blinded", 10, Trait, false);
pub const PLAYER: Characteristic = Characteristic::builtin("Player", 11, Trait, false);
pub const MASK: Characteristic = Characteristic::builtin("Mask", 12, Trait, false);
pub const EYEPATCH: Characteristic = Characteristic::builtin("Eyepatch", 13, Trait, false);
pub const MAKEUP: Characteristic = Characteristic::builtin("Makeup", 14, Trait, false);
pub const MAKEUP_2: Characteristic = Characteristic::builtin("Makeup2", 15, Trait, false);
pub const JEWELRY: Characteristic = Characteristic::builtin("Jewelry", 16, Trait, false);
pub const IMMORTALITY: Characteristic = Characteristic::builtin("Immortality", 17, Trait, false);
pub const SPECIAL_CROWN_BEHIND: Characteristic = Characteristic::builtin("Crown behind", 18, Trait, false);
pub const SPECIAL_CROWN: Characteristic = Characteristic::builtin("Crown", 19, Trait, false);
pub const FRECKLES: Characteristic = Characteristic::builtin("Freckles", 20, Trait, false);
pub const PHYSIQUE: Characteristic = Characteristic::builtin("Physique", 21, Trait, false);
pub const PALE: Characteristic = Characteristic::builtin("Pale", 22, Trait, false);
pub const BLACK_EYE: Characteristic = Characteristic::builtin("Black eye", 23, Trait, false);
pub const HAIRELIP: Characteristic = Characteristic::builtin("Hairelip", 24, Trait, false);
pub const SCARS_MID: Characteristic = Characteristic::builtin("Scars mid", 25, Trait, false);
pub const SCARS_HIGH: Characteristic = Characteristic::builtin("Scars high", 26, Trait, false);
pub const BLOOD: Characteristic = Characteristic::builtin("Blood", 27, Trait, false);
pub const TATTOO: Characteristic = Characteristic::builtin("Tattoo", 28, Trait, false);
pub const WARPAINT: Characteristic = Characteristic::builtin("Warpaint", 29, Trait, false);
pub const POSSESSED: Characteristic = Characteristic::builtin("Possessed", 30, Trait, false);
pub const OVERLAYER_BEHIND: Characteristic = Characteristic::builtin("Overlayer behind", 31, Trait, false);
pub const OVERLAYER: Characteristic = Characteristic::builtin("Overlayer", 32, Trait, false);
pub const UNDERMAIN: Characteristic = Characteristic::builtin("Undermain", 33, Trait, false);
pub const SPECIAL_HELMET: Characteristic = Characteristic::builtin("Helmet", 34, Trait, false);
pub const SPECIAL_MASK: Characteristic = Characteristic::builtin("Mask", 35, Trait, false);
pub const SPECIAL_SCEPTER: Characteristic = Characteristic::builtin("Scepter", 36, Trait, false);
pub const RELATIONSHIP: Characteristic = Characteristic::builtin("Relationship", 37, Trait, false);

/// Built-in DNA catalog, in string order.
pub const GENOME: [Characteristic; 11] =
    [NECK, CHIN, MOUTH, NOSE, CHEEKS, D5, EYES, EARS, HAIR_COLOR, EYE_COLOR, D10];

/// Built-in properties catalog, in string order.
pub const TRAITS: [Characteristic; 38] = [
    BACKGROUND, HAIR, HEAD, CLOTHES, BEARD, HEADGEAR, IMPRISONED, SCARS, RED_DOTS, BOILS,
    BLINDED, PLAYER, MASK, EYEPATCH, MAKEUP, MAKEUP_2, JEWELRY, IMMORTALITY,
    SPECIAL_CROWN_BEHIND, SPECIAL_CROWN, FRECKLES, PHYSIQUE, PALE, BLACK_EYE, HAIRELIP,
    SCARS_MID, SCARS_HIGH, BLOOD, TATTOO, WARPAINT, POSSESSED, OVERLAYER_BEHIND, OVERLAYER,
    UNDERMAIN, SPECIAL_HELMET, SPECIAL_MASK, SPECIAL_SCEPTER, RELATIONSHIP,
];

/// Minimum DNA length accepted for a character.
pub const MIN_DNA_LENGTH: usize = 10;

/// Minimum properties length accepted for a character.
pub const MIN_PROPERTIES_LENGTH: usize = 11;

/// Look up a DNA characteristic. Only the built-in positions exist.
pub fn genome(index: usize) -> Result<Characteristic, CharacteristicError> {
    GENOME.get(index).copied().ok_or(CharacteristicError::UnknownGenome(index))
}

/// Look up a properties characteristic.
///
/// Indices past the built-in catalog are valid custom characteristics, since
/// add-on content may declare its own trait positions.
pub fn trait_at(index: usize) -> Characteristic {
    TRAITS.get(index).copied().unwrap_or(Characteristic::custom(index))
}

/// Find a built-in characteristic by name (case-insensitive).
pub fn by_name(name: &str) -> Option<Characteristic> {
    GENOME.iter().chain(TRAITS.iter()).find(|c| c.name.eq_ignore_ascii_case(name)).copied()
}

/// Built-in characteristics that take part in randomization.
pub fn randomizable() -> impl Iterator<Item = Characteristic> {
    GENOME.into_iter().chain(TRAITS).filter(|c| c.randomizable)
}
