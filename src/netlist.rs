//! Signal assignment for placed parts.
//!
//! Every output pin drives its own signal, numbered from 1 in fixture order.
//! An input pin reads the signal of the output whose network reaches it, or
//! [`FLOATING`] when no output does.

use std::collections::HashMap;

use tracing::trace;

use crate::{
    board::{FixtureId, Pcb},
    parts::PinKind,
    path::Path,
    vector::Vec2i,
};

pub type Signal = usize;

/// Signal of an input that no output reaches.
pub const FLOATING: Signal = 0;

#[derive(Debug, Clone, Default)]
pub struct Netlist {
    /// Per fixture, one signal for each input or output pin in pin order.
    pointers: HashMap<FixtureId, Vec<Signal>>,
    networks: Vec<Path>,
    fan_out: Vec<usize>,
}

impl Netlist {
    pub fn build(board: &Pcb) -> Self {
        let mut netlist = Self {
            fan_out: vec![0],
            ..Default::default()
        };
        let mut inputs: Vec<(FixtureId, usize, Vec2i)> = vec![];

        for fixture in board.fixtures() {
            let mut pointers = vec![];
            for (pos, pin) in fixture.pins() {
                match pin.kind {
                    PinKind::Output => {
                        netlist.networks.push(Path::from_board(board, pos));
                        netlist.fan_out.push(0);
                        pointers.push(netlist.networks.len());
                    }
                    PinKind::Input => {
                        inputs.push((fixture.id, pointers.len(), pos));
                        pointers.push(FLOATING);
                    }
                    PinKind::Structural => {}
                }
            }
            netlist.pointers.insert(fixture.id, pointers);
        }

        for (id, slot, pos) in inputs {
            let signal = netlist.driver_of(pos);
            netlist.fan_out[signal] += 1;
            if let Some(pointer) = netlist.pointers.get_mut(&id).and_then(|p| p.get_mut(slot)) {
                *pointer = signal;
            }
            trace!(fixture = id, %pos, signal, "connected input");
        }
        netlist
    }

    /// Output signals plus the floating one.
    pub fn signal_count(&self) -> usize {
        self.networks.len() + 1
    }

    pub fn pointers(&self, fixture: FixtureId) -> Option<&[Signal]> {
        self.pointers.get(&fixture).map(Vec::as_slice)
    }

    /// Signal carried by the cell at `pos`.
    pub fn driver_of(&self, pos: Vec2i) -> Signal {
        self.networks
            .iter()
            .position(|n| n.contains_position(pos))
            .map_or(FLOATING, |i| i + 1)
    }

    /// Number of inputs reading `signal`.
    pub fn fan_out(&self, signal: Signal) -> usize {
        self.fan_out.get(signal).copied().unwrap_or(0)
    }
}
