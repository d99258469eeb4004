//! Compact board encoding.
//!
//! A big-endian head word holds the board width in its low 15 bits, the top
//! bit is set when cell (0, 0) is empty. Cells follow in row-major order as
//! alternating runs: an empty run is a length (see [`write_run`]), a point
//! run is a sequence of point bytes. A point byte stores the links towards
//! cells that precede it (NE, N, NW, W in bits 0 to 3) and the flags below.
//! The first footprint point of every placed part is followed by the part id
//! and, for configurations other than the first, the configuration index.

use std::collections::HashSet;

use tracing::{trace, warn};

use super::{ByteReader, ByteWriter};
use crate::{
    board::Pcb,
    error::DecodeError,
    parts::PartLibrary,
    point::Point,
    vector::Vec2i,
    Direction,
};

const HEAD_EMPTY_FIRST: u16 = 0x8000;
const HEAD_WIDTH: u16 = 0x7FFF;

const POINT_LINKS: u8 = 0x0F;
/// Another point byte follows directly.
const POINT_CHAIN: u8 = 0x10;
/// A part byte follows.
const POINT_PART: u8 = 0x20;
/// Final point of the board.
const POINT_LAST: u8 = 0x40;
const POINT_LOCKED: u8 = 0x80;

const PART_ID: u8 = 0x7F;
/// A configuration byte follows the part byte.
const PART_CONFIGURATION: u8 = 0x80;

/// Run byte meaning "255 empty cells, and the run goes on".
const RUN_CONTINUE: u8 = 0xFF;

/// Raster cells a decoded board may span. Rows are allocated up to their
/// last point, so this bounds the grid memory a stream can demand.
const MAX_CELLS: usize = 1 << 20;

/// Links stored in a point byte, lowest bit first.
const STORED_LINKS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::North,
    Direction::NorthWest,
    Direction::West,
];

/// Writes `length` empty cells as [`RUN_CONTINUE`] bytes followed by the
/// remainder, which may be zero.
///
/// [`RUN_CONTINUE`] has the same value as a point byte with every flag set.
/// No valid point byte sets both chain and last, and run bytes only appear
/// where a run is expected, so the two never collide. Both directions of this
/// overload live in this function pair.
fn write_run(writer: &mut ByteWriter, mut length: usize) {
    while length >= RUN_CONTINUE as usize {
        writer.write_u8(RUN_CONTINUE);
        length -= RUN_CONTINUE as usize;
    }
    writer.write_u8(length as u8);
}

fn read_run(reader: &mut ByteReader) -> Result<usize, DecodeError> {
    let mut length = 0;
    loop {
        let byte = reader.read_u8()?;
        length += byte as usize;
        if byte != RUN_CONTINUE {
            return Ok(length);
        }
    }
}

fn point_byte(point: &Point, chain: bool, last: bool, part: bool) -> u8 {
    let mut byte = (point.directions.bits() >> 1) & POINT_LINKS;
    for (set, flag) in [
        (chain, POINT_CHAIN),
        (part, POINT_PART),
        (last, POINT_LAST),
        (point.locked, POINT_LOCKED),
    ] {
        if set {
            byte |= flag;
        }
    }
    byte
}

pub fn encode(board: &Pcb) -> Vec<u8> {
    let mut writer = ByteWriter::new();

    if board.width() > HEAD_WIDTH as u32 {
        warn!(width = board.width(), "board is too wide to encode faithfully");
    }
    let width = board.width() as u16 & HEAD_WIDTH;
    let first_empty = board.point(Vec2i::new(0, 0)).is_none();
    writer.write_u16(width | if first_empty { HEAD_EMPTY_FIRST } else { 0 });

    let raster = |pos: Vec2i| pos.y() as usize * width as usize + pos.x() as usize;
    let points: Vec<(Vec2i, &Point)> = board.points().collect();
    let mut encoded_fixtures = HashSet::new();
    let mut next_index = 0;

    for (i, (pos, point)) in points.iter().enumerate() {
        let index = raster(*pos);
        if index > next_index {
            write_run(&mut writer, index - next_index);
        }

        let last = i + 1 == points.len();
        let chain = points
            .get(i + 1)
            .is_some_and(|(next, _)| raster(*next) == index + 1);
        let fixture = point
            .part()
            .and_then(|id| board.fixture(id))
            .filter(|f| encoded_fixtures.insert(f.id));

        writer.write_u8(point_byte(point, chain, last, fixture.is_some()));
        if let Some(fixture) = fixture {
            let id = fixture.part.id() & PART_ID;
            match fixture.part.configuration_index() {
                0 => writer.write_u8(id),
                configuration => {
                    writer.write_u8(id | PART_CONFIGURATION);
                    writer.write_u8(configuration);
                }
            }
            trace!(%pos, part = fixture.part.name(), "encoded part");
        }
        next_index = index + 1;
    }

    writer.into_bytes()
}

fn position(index: usize, width: usize) -> Result<Vec2i, DecodeError> {
    if index >= MAX_CELLS {
        return Err(DecodeError::TooLarge);
    }
    Ok(Vec2i::new((index % width) as i32, (index / width) as i32))
}

pub fn decode(bytes: &[u8], library: &PartLibrary) -> Result<Pcb, DecodeError> {
    let mut reader = ByteReader::new(bytes);
    let head = reader.read_u16()?;
    let width = (head & HEAD_WIDTH) as usize;
    let first_empty = head & HEAD_EMPTY_FIRST != 0;

    if width == 0 {
        if first_empty && reader.is_empty() {
            return Ok(Pcb::new());
        }
        return Err(DecodeError::ZeroWidth);
    }

    let mut board = Pcb::new();
    let mut pending_parts = vec![];
    let mut index = 0;
    let mut run_next = first_empty;

    loop {
        if run_next {
            let length = read_run(&mut reader)?;
            trace!(index, length, "empty run");
            index += length;
        }

        let offset = reader.offset();
        let byte = reader.read_u8()?;
        if byte & POINT_CHAIN != 0 && byte & POINT_LAST != 0 {
            return Err(DecodeError::InvalidPointByte { offset, byte });
        }

        let pos = position(index, width)?;
        let point = board.extend(pos).ok_or(DecodeError::TooLarge)?;
        point.locked = byte & POINT_LOCKED != 0;

        for (bit, direction) in STORED_LINKS.into_iter().enumerate() {
            if byte & (1 << bit) != 0 && !board.etch(pos, direction) {
                return Err(DecodeError::MissingNeighbor {
                    x: pos.x(),
                    y: pos.y(),
                    direction,
                });
            }
        }

        if byte & POINT_PART != 0 {
            let part = reader.read_u8()?;
            let configuration = if part & PART_CONFIGURATION != 0 {
                reader.read_u8()?
            } else {
                0
            };
            pending_parts.push((pos, part & PART_ID, configuration));
        }

        index += 1;
        if byte & POINT_LAST != 0 {
            break;
        }
        run_next = byte & POINT_CHAIN == 0;
    }

    if !reader.is_empty() {
        return Err(DecodeError::TrailingBytes {
            offset: reader.offset(),
        });
    }
    board.reserve_width(width as u32);

    // Footprints may reach cells that come later in the stream, so parts are
    // placed once every point exists.
    for (pos, id, configuration) in pending_parts {
        let definition = library.get(id).ok_or(DecodeError::UnknownPart { id })?;
        let part = library.part_by_id(id, configuration).ok_or_else(|| {
            DecodeError::UnknownConfiguration {
                part: definition.name.clone(),
                index: configuration,
            }
        })?;

        let first = part.configuration().footprint.first_point().unwrap_or_default();
        let origin = pos - first;
        if !board.fits_footprint(origin, part.configuration()) {
            return Err(DecodeError::PartDoesNotFit {
                part: part.name().to_owned(),
                x: origin.x(),
                y: origin.y(),
            });
        }
        trace!(%origin, part = part.name(), "decoded part");
        board.place(part, origin);
    }

    Ok(board)
}
