//! The closed set of 17 address components (§6) and the bitset used to
//! filter expansions and phrases by which components they apply to.

use serde::{Deserialize, Serialize};

/// One of the 17 semantic labels a span of tokens can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressComponent {
    HouseNumber,
    Road,
    Unit,
    Level,
    Staircase,
    Entrance,
    PoBox,
    Postcode,
    Suburb,
    CityDistrict,
    City,
    Island,
    StateDistrict,
    State,
    CountryRegion,
    Country,
    WorldRegion,
}

impl AddressComponent {
    pub const ALL: [AddressComponent; 17] = [
        AddressComponent::HouseNumber,
        AddressComponent::Road,
        AddressComponent::Unit,
        AddressComponent::Level,
        AddressComponent::Staircase,
        AddressComponent::Entrance,
        AddressComponent::PoBox,
        AddressComponent::Postcode,
        AddressComponent::Suburb,
        AddressComponent::CityDistrict,
        AddressComponent::City,
        AddressComponent::Island,
        AddressComponent::StateDistrict,
        AddressComponent::State,
        AddressComponent::CountryRegion,
        AddressComponent::Country,
        AddressComponent::WorldRegion,
    ];

    pub fn bit(&self) -> u32 {
        1u32 << (*self as u32)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AddressComponent::HouseNumber => "house_number",
            AddressComponent::Road => "road",
            AddressComponent::Unit => "unit",
            AddressComponent::Level => "level",
            AddressComponent::Staircase => "staircase",
            AddressComponent::Entrance => "entrance",
            AddressComponent::PoBox => "po_box",
            AddressComponent::Postcode => "postcode",
            AddressComponent::Suburb => "suburb",
            AddressComponent::CityDistrict => "city_district",
            AddressComponent::City => "city",
            AddressComponent::Island => "island",
            AddressComponent::StateDistrict => "state_district",
            AddressComponent::State => "state",
            AddressComponent::CountryRegion => "country_region",
            AddressComponent::Country => "country",
            AddressComponent::WorldRegion => "world_region",
        }
    }
}

/// Bitset over [`AddressComponent`], used to scope expansions and phrases to
/// a subset of components (§3, §4.I, §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComponentMask(pub u32);

impl ComponentMask {
    pub fn none() -> Self {
        ComponentMask(0)
    }

    pub fn all() -> Self {
        ComponentMask(AddressComponent::ALL.iter().fold(0, |acc, c| acc | c.bit()))
    }

    pub fn single(component: AddressComponent) -> Self {
        ComponentMask(component.bit())
    }

    pub fn contains(&self, component: AddressComponent) -> bool {
        self.0 & component.bit() != 0
    }

    pub fn union(&self, other: ComponentMask) -> ComponentMask {
        ComponentMask(self.0 | other.0)
    }

    pub fn intersects(&self, other: ComponentMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Dictionary category an [`crate::phrase::AddressExpansion`] belongs to;
/// used only for feature naming (`phrase_dict=<DictionaryType>`, §4.J).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DictionaryType {
    StreetType,
    Directional,
    PostOffice,
    Building,
    Unit,
    Level,
    Entrance,
    Stopword,
    Toponym,
    Given,
    Surname,
    Other,
}

impl DictionaryType {
    pub fn name(&self) -> &'static str {
        match self {
            DictionaryType::StreetType => "street_type",
            DictionaryType::Directional => "directional",
            DictionaryType::PostOffice => "post_office",
            DictionaryType::Building => "building",
            DictionaryType::Unit => "unit",
            DictionaryType::Level => "level",
            DictionaryType::Entrance => "entrance",
            DictionaryType::Stopword => "stopword",
            DictionaryType::Toponym => "toponym",
            DictionaryType::Given => "given",
            DictionaryType::Surname => "surname",
            DictionaryType::Other => "other",
        }
    }
}

impl std::fmt::Display for DictionaryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
