use std::sync::Arc;

use bimap::BiMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{DefinitionError, ErrorList, LibraryError, ResultReport},
    vector::Vec2i,
};

pub mod summary;

pub use summary::PartSummary;

/// Library index of a part definition, as stored in serialized boards.
pub type PartId = u8;

/// The serialized part byte keeps its top bit for the configuration flag.
pub const MAX_PART_TYPES: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinKind {
    Input,
    Output,
    Structural,
}

impl PinKind {
    pub fn name(self) -> &'static str {
        match self {
            PinKind::Input => "in",
            PinKind::Output => "out",
            PinKind::Structural => "structural",
        }
    }
}

impl<'de> Deserialize<'de> for PinKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        match name.as_str() {
            "in" => Ok(Self::Input),
            "out" => Ok(Self::Output),
            "structural" => Ok(Self::Structural),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["in", "out", "structural"],
            )),
        }
    }
}

impl Serialize for PinKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.name().serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub x: i32,
    pub y: i32,
    #[serde(rename = "type")]
    pub kind: PinKind,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

impl Pin {
    pub fn offset(&self) -> Vec2i {
        Vec2i::new(self.x, self.y)
    }
}

/// Cells a configuration covers, relative to the part origin.
///
/// `points` are occupied by the part, `space` cells must exist on the board
/// without being occupied, and `air` cells must stay off the board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    pub points: Vec<Vec2i>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub air: Vec<Vec2i>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub space: Vec<Vec2i>,
}

impl Footprint {
    /// First footprint point in row-major order.
    pub fn first_point(&self) -> Option<Vec2i> {
        self.points.iter().copied().min_by_key(|p| (p.y(), p.x()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub footprint: Footprint,
    #[serde(default)]
    pub io: Vec<Pin>,
}

impl Configuration {
    pub fn pin_index_at(&self, offset: Vec2i) -> Option<usize> {
        self.io.iter().position(|p| p.offset() == offset)
    }

    pub fn outputs(&self) -> impl Iterator<Item = &Pin> {
        self.io.iter().filter(|p| p.kind == PinKind::Output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartDefinition {
    pub name: String,
    pub configurations: Vec<Configuration>,
}

impl PartDefinition {
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.configurations.is_empty() {
            return Err(DefinitionError::NoConfigurations(self.name.clone()));
        }
        for (i, config) in self.configurations.iter().enumerate() {
            if config.footprint.points.is_empty() {
                return Err(DefinitionError::EmptyFootprint {
                    part: self.name.clone(),
                    configuration: i,
                });
            }
            if let Some(pin) = config
                .io
                .iter()
                .find(|p| !config.footprint.points.contains(&p.offset()))
            {
                return Err(DefinitionError::PinOffFootprint {
                    part: self.name.clone(),
                    x: pin.x,
                    y: pin.y,
                });
            }
        }
        Ok(())
    }
}

/// A part type in one of its configurations. Definitions are shared
/// between copies.
#[derive(Debug, Clone)]
pub struct Part {
    id: PartId,
    definition: Arc<PartDefinition>,
    configuration: u8,
}

impl PartialEq for Part {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.configuration == other.configuration
    }
}

impl Eq for Part {}

impl Part {
    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn definition(&self) -> &Arc<PartDefinition> {
        &self.definition
    }

    pub fn configuration_index(&self) -> u8 {
        self.configuration
    }

    pub fn configuration(&self) -> &Configuration {
        // Index is checked on construction.
        &self.definition.configurations[self.configuration as usize]
    }

    pub fn pin_index_at(&self, offset: Vec2i) -> Option<usize> {
        self.configuration().pin_index_at(offset)
    }
}

/// Registered part definitions, addressable by name or [`PartId`].
#[derive(Debug, Clone, Default)]
pub struct PartLibrary {
    definitions: Vec<Arc<PartDefinition>>,
    names: BiMap<String, PartId>,
}

impl PartLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: PartDefinition) -> Result<PartId, DefinitionError> {
        definition.validate()?;
        if self.names.contains_left(&definition.name) {
            return Err(DefinitionError::DuplicateName(definition.name));
        }
        if self.definitions.len() >= MAX_PART_TYPES {
            return Err(DefinitionError::TooManyParts(definition.name));
        }

        let id = self.definitions.len() as PartId;
        debug!(name = %definition.name, id, "registered part");
        self.names.insert(definition.name.clone(), id);
        self.definitions.push(Arc::new(definition));
        Ok(id)
    }

    /// Parses a RON list of definitions. Invalid definitions are skipped
    /// and reported in the returned list.
    pub fn from_ron(text: &str) -> Result<(Self, ErrorList), LibraryError> {
        let definitions: Vec<PartDefinition> = ron::from_str(text)?;
        let mut library = Self::new();
        let mut errors = ErrorList::new();

        for definition in definitions {
            let name = definition.name.clone();
            let context_name = name.clone();
            let mut ctx = errors.enter_context(move || format!("part {context_name}"));
            if library.register(definition).report_error(&mut ctx).is_none() {
                warn!(part = %name, "skipped invalid part definition");
            }
        }
        Ok((library, errors))
    }

    pub fn get(&self, id: PartId) -> Option<&Arc<PartDefinition>> {
        self.definitions.get(id as usize)
    }

    pub fn id_of(&self, name: &str) -> Option<PartId> {
        self.names.get_by_left(name).copied()
    }

    pub fn name_of(&self, id: PartId) -> Option<&str> {
        self.names.get_by_right(&id).map(String::as_str)
    }

    pub fn part(&self, name: &str, configuration: u8) -> Option<Part> {
        self.part_by_id(self.id_of(name)?, configuration)
    }

    pub fn part_by_id(&self, id: PartId, configuration: u8) -> Option<Part> {
        let definition = self.get(id)?;
        ((configuration as usize) < definition.configurations.len()).then(|| Part {
            id,
            definition: definition.clone(),
            configuration,
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartId, &PartDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, d)| (i as PartId, d.as_ref()))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Library used across the crate's tests: a one-cell output source, a
    /// one-cell input sink, a two-cell resistor-like part, a sensor with
    /// air and space cells, and a two-cell part with two outputs.
    pub(crate) const TEST_LIBRARY: &str = r#"[
        (
            name: "source",
            configurations: [
                (footprint: (points: [(0, 0)]), io: [(x: 0, y: 0, type: "out")]),
            ],
        ),
        (
            name: "sink",
            configurations: [
                (footprint: (points: [(0, 0)]), io: [(x: 0, y: 0, type: "in")]),
            ],
        ),
        (
            name: "resistor",
            configurations: [
                (
                    footprint: (points: [(0, 0), (1, 0)]),
                    io: [(x: 0, y: 0, type: "in", name: "a"), (x: 1, y: 0, type: "out", name: "b")],
                ),
                (
                    footprint: (points: [(0, 0), (0, 1)]),
                    io: [(x: 0, y: 0, type: "in"), (x: 0, y: 1, type: "out")],
                ),
            ],
        ),
        (
            name: "sensor",
            configurations: [
                (
                    footprint: (points: [(0, 1)], air: [(0, 0)], space: [(1, 1)]),
                    io: [(x: 0, y: 1, type: "structural")],
                ),
            ],
        ),
        (
            name: "splitter",
            configurations: [
                (
                    footprint: (points: [(0, 0), (1, 0)]),
                    io: [(x: 0, y: 0, type: "out"), (x: 1, y: 0, type: "out")],
                ),
            ],
        ),
    ]"#;

    pub(crate) fn test_library() -> PartLibrary {
        let (library, errors) = PartLibrary::from_ron(TEST_LIBRARY).unwrap();
        assert!(errors.is_empty(), "{errors}");
        library
    }

    #[test]
    fn loads_definitions_in_order() {
        let library = test_library();
        assert_eq!(library.len(), 5);
        assert_eq!(library.id_of("resistor"), Some(2));
        assert_eq!(library.name_of(3), Some("sensor"));

        let resistor = library.part("resistor", 1).unwrap();
        assert_eq!(resistor.configuration().footprint.points.len(), 2);
        assert_eq!(resistor.pin_index_at(Vec2i::new(0, 1)), Some(1));
        assert_eq!(resistor.pin_index_at(Vec2i::new(1, 0)), None);
        assert!(library.part("resistor", 2).is_none());
        assert!(library.part("capacitor", 0).is_none());
    }

    #[test]
    fn invalid_definitions_are_reported_and_skipped() {
        let text = r#"[
            (name: "empty", configurations: []),
            (name: "ok", configurations: [(footprint: (points: [(0, 0)]))]),
            (name: "stray", configurations: [
                (footprint: (points: [(0, 0)]), io: [(x: 2, y: 0, type: "in")]),
            ]),
            (name: "ok", configurations: [(footprint: (points: [(0, 0)]))]),
        ]"#;
        let (library, errors) = PartLibrary::from_ron(text).unwrap();
        assert_eq!(library.len(), 1);
        assert_eq!(errors.count(), 3);
        assert!(errors.to_string().contains("part stray:"));
    }

    #[test]
    fn unknown_pin_kind_is_a_parse_error() {
        let text = r#"[(name: "x", configurations: [
            (footprint: (points: [(0, 0)]), io: [(x: 0, y: 0, type: "sideways")]),
        ])]"#;
        assert!(PartLibrary::from_ron(text).is_err());
    }

    #[test]
    fn first_point_is_row_major() {
        let footprint = Footprint {
            points: vec![Vec2i::new(1, 1), Vec2i::new(2, 0), Vec2i::new(0, 1)],
            ..Default::default()
        };
        assert_eq!(footprint.first_point(), Some(Vec2i::new(2, 0)));
    }
}
