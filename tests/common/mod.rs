#![allow(dead_code)]

use etchboard::{PartLibrary, Pcb, Vec2i};

pub const LIBRARY: &str = r#"[
    (
        name: "source",
        configurations: [(footprint: (points: [(0, 0)]), io: [(x: 0, y: 0, type: "out")])],
    ),
    (
        name: "sink",
        configurations: [(footprint: (points: [(0, 0)]), io: [(x: 0, y: 0, type: "in")])],
    ),
    (
        name: "resistor",
        configurations: [
            (
                footprint: (points: [(0, 0), (1, 0)]),
                io: [(x: 0, y: 0, type: "in"), (x: 1, y: 0, type: "out")],
            ),
            (
                footprint: (points: [(0, 0), (0, 1)]),
                io: [(x: 0, y: 0, type: "in"), (x: 0, y: 1, type: "out")],
            ),
        ],
    ),
    (
        name: "bracket",
        configurations: [
            (
                footprint: (points: [(0, 1)], air: [(0, 0)], space: [(1, 1)]),
                io: [(x: 0, y: 1, type: "structural")],
            ),
        ],
    ),
]"#;

pub fn library() -> PartLibrary {
    let (library, errors) = PartLibrary::from_ron(LIBRARY).unwrap();
    assert!(errors.is_empty(), "{errors}");
    library
}

pub fn v(x: i32, y: i32) -> Vec2i {
    Vec2i::new(x, y)
}

/// Every point with its links, lock flag and pin, row-major.
pub fn cells(board: &Pcb) -> Vec<(Vec2i, u8, bool, Option<etchboard::PinKind>)> {
    board
        .points()
        .map(|(pos, p)| (pos, p.directions.bits(), p.locked, p.pin()))
        .collect()
}

/// Placed parts as sorted (name, configuration, origin) triples.
pub fn fixtures(board: &Pcb) -> Vec<(String, u8, (i32, i32))> {
    let mut list: Vec<_> = board
        .fixtures()
        .map(|f| {
            (
                f.part.name().to_owned(),
                f.part.configuration_index(),
                (f.pos.x(), f.pos.y()),
            )
        })
        .collect();
    list.sort();
    list
}
