//! Interactive editing on top of [`Pcb`]: etch gestures, network selection,
//! part placement and reshaping, each committed with an undo snapshot.

use tracing::debug;

use crate::{
    board::{
        history::History,
        selection::{prevent_split, Region},
        Fixture, FixtureId, PackReport, Pcb,
    },
    config::EditorConfig,
    error::Result,
    io,
    parts::{Part, PartLibrary, PinKind},
    path::Path,
    vector::Vec2i,
    Direction,
};

/// What committing a planned path would do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectMode {
    /// Add the path's links to the board.
    Etch,
    /// Remove the path's links from the board.
    Delete,
    /// The path would join more than one output. Never committed.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EtchPlan {
    pub mode: SelectMode,
    pub path: Option<Path>,
}

impl EtchPlan {
    fn new(mode: SelectMode, path: Option<Path>) -> Self {
        Self { mode, path }
    }

    pub fn is_committable(&self) -> bool {
        self.mode != SelectMode::Invalid && self.path.as_ref().is_some_and(Path::is_valid)
    }
}

/// Counts the outputs `path` would join, including every network it touches.
pub fn evaluate_extend(board: &Pcb, path: &Path) -> SelectMode {
    let mut outputs = 0;
    let mut networks: Vec<Path> = vec![];

    for pos in path.positions() {
        if networks.iter().any(|n| n.contains_position(pos)) {
            continue;
        }

        let network = Path::from_board(board, pos);
        outputs += network.count_outputs();
        if outputs > 1 {
            return SelectMode::Invalid;
        }
        networks.push(network);
    }
    SelectMode::Etch
}

/// A drag from a fixed start cell towards the cursor.
///
/// Once a drag has retraced existing wiring the gesture stays in delete mode
/// and later cursor positions look for a route along that wiring first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EtchGesture {
    start: Vec2i,
    deleting: bool,
}

impl EtchGesture {
    pub fn new(start: Vec2i) -> Self {
        Self {
            start,
            deleting: false,
        }
    }

    pub fn start(&self) -> Vec2i {
        self.start
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// Plan for the cursor at `cursor`. `None` while the cursor is off the
    /// board.
    pub fn drag(&mut self, board: &Pcb, cursor: Vec2i) -> Option<EtchPlan> {
        board.point(cursor)?;
        let line = Path::from_line(board, self.start, cursor);
        Some(self.determine_mode(board, cursor, line))
    }

    fn determine_mode(&mut self, board: &Pcb, cursor: Vec2i, line: Option<Path>) -> EtchPlan {
        let has_paths = |pos: Vec2i| board.point(pos).is_some_and(|p| p.has_paths());

        if self.deleting {
            match line.as_ref().map(|path| (path.start(), path.end())) {
                Some((Some(start), Some(end))) => {
                    if has_paths(start) && has_paths(end) {
                        return Self::delete_route(board, start, end, line);
                    }
                }
                Some(_) => {}
                None => {
                    if board.point(self.start).is_some() && board.point(cursor).is_some() {
                        return Self::delete_route(board, self.start, cursor, None);
                    }
                }
            }
        }
        self.drag_line(board, line)
    }

    /// Deletes along existing wiring when a route exists, otherwise falls
    /// back to etching `line`.
    fn delete_route(board: &Pcb, start: Vec2i, end: Vec2i, line: Option<Path>) -> EtchPlan {
        let route = Path::from_route(board, start, end);
        if route.is_valid() {
            return EtchPlan::new(SelectMode::Delete, Some(route));
        }

        match line {
            Some(path) => EtchPlan::new(evaluate_extend(board, &path), Some(path)),
            None => EtchPlan::new(SelectMode::Etch, None),
        }
    }

    /// Walks the line while its relation to the board stays the same: either
    /// every point retraces existing links or none touches them. The line is
    /// cut after the first point that breaks the pattern.
    fn drag_line(&mut self, board: &Pcb, line: Option<Path>) -> EtchPlan {
        let Some(mut path) = line else {
            return EtchPlan::new(SelectMode::Etch, None);
        };

        let mut overlapped: Option<bool> = None;
        let mut length = 0;
        for (pos, point) in path.iter() {
            let overlaps = board.point(pos).is_some_and(|existing| {
                if overlapped == Some(true) {
                    existing.path_equals(point)
                } else {
                    existing.path_overlaps(point)
                }
            });

            length += 1;
            if overlapped.is_some_and(|o| o != overlaps) {
                break;
            }
            overlapped = Some(overlaps);
        }
        path.trim(length);

        if overlapped == Some(true) {
            self.deleting = true;
            return EtchPlan::new(SelectMode::Delete, Some(path));
        }
        EtchPlan::new(evaluate_extend(board, &path), Some(path))
    }
}

/// Output pin found on a selected network, with the side its label goes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLabel {
    pub fixture: FixtureId,
    pub pin: usize,
    pub pos: Vec2i,
    pub outward: Vec2i,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedNetwork {
    pub path: Path,
    pub label: Option<PinLabel>,
}

/// Editing session owning a board and its undo history.
#[derive(Debug, Clone)]
pub struct Editor {
    board: Pcb,
    history: History,
    config: EditorConfig,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Session on a fresh board of the configured default size.
    pub fn new(config: EditorConfig) -> Self {
        let board = Pcb::with_size(config.default_width, config.default_height);
        Self::with_board(config, board)
    }

    pub fn with_board(config: EditorConfig, board: Pcb) -> Self {
        Self {
            board,
            history: History::new(config.undo_capacity),
            config,
        }
    }

    pub fn board(&self) -> &Pcb {
        &self.board
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    fn snapshot(&mut self) {
        self.history.push(self.board.clone());
    }

    pub fn undo(&mut self) -> bool {
        let previous = unwrap_option_or_return!(self.history.undo(&self.board), false);
        self.board = previous;
        debug!("undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        let next = unwrap_option_or_return!(self.history.redo(&self.board), false);
        self.board = next;
        debug!("redo");
        true
    }

    /// Starts an etch drag. The start cell must hold a point.
    pub fn begin_etch(&self, pos: Vec2i) -> Option<EtchGesture> {
        self.board.point(pos)?;
        Some(EtchGesture::new(pos))
    }

    /// Applies a plan from [`EtchGesture::drag`]. Invalid plans, plans
    /// without a valid path and plans the board no longer agrees with leave
    /// the board and history untouched.
    pub fn commit_etch(&mut self, plan: &EtchPlan) -> bool {
        if !plan.is_committable() {
            return false;
        }
        let path = unwrap_option_or_return!(&plan.path, false);
        if !self.plan_applies(plan.mode, path) {
            debug!(mode = ?plan.mode, "plan is stale for the current board");
            return false;
        }

        self.snapshot();
        match plan.mode {
            SelectMode::Etch => self.board.etch_path(path),
            SelectMode::Delete => self.board.erase_path(path),
            SelectMode::Invalid => {}
        }
        debug!(mode = ?plan.mode, points = path.len(), "committed etch");
        true
    }

    /// Re-checks a plan against the board, which may have changed since the
    /// plan was made.
    fn plan_applies(&self, mode: SelectMode, path: &Path) -> bool {
        if !path.positions().all(|pos| self.board.point(pos).is_some()) {
            return false;
        }
        match mode {
            SelectMode::Etch => evaluate_extend(&self.board, path) == SelectMode::Etch,
            SelectMode::Delete => path.iter().all(|(pos, point)| {
                self.board
                    .point(pos)
                    .is_some_and(|existing| existing.path_overlaps(point))
            }),
            SelectMode::Invalid => false,
        }
    }

    /// The network of links through `pos`, if the point there has any.
    pub fn select_network(&self, pos: Vec2i) -> Option<SelectedNetwork> {
        if !self.board.point(pos)?.has_paths() {
            return None;
        }

        let path = Path::from_board(&self.board, pos);
        let label = path.iter().find_map(|(at, point)| {
            let fixture = self.board.fixture(point.part()?)?;
            let pin = fixture.part.pin_index_at(at - fixture.pos)?;
            (fixture.configuration().io[pin].kind == PinKind::Output).then(|| PinLabel {
                fixture: fixture.id,
                pin,
                pos: at,
                outward: path.outward_vector(at),
            })
        });
        Some(SelectedNetwork { path, label })
    }

    /// Erases every link of the network through `pos`.
    pub fn delete_network(&mut self, pos: Vec2i) -> bool {
        let network = unwrap_option_or_return!(self.select_network(pos), false);

        self.snapshot();
        self.board.erase_path(&network.path);
        debug!(%pos, points = network.path.len(), "deleted network");
        true
    }

    pub fn place(&mut self, part: Part, pos: Vec2i) -> Option<FixtureId> {
        if !self.board.fits(pos, part.configuration()) {
            return None;
        }
        self.snapshot();
        Some(self.board.place(part, pos))
    }

    pub fn remove(&mut self, id: FixtureId) -> Option<Fixture> {
        self.board.fixture(id)?;
        self.snapshot();
        self.board.remove(id)
    }

    /// Extends every free cell between `anchor` and `corner`. The anchor must
    /// be free and next to an existing point. Returns the shift applied to
    /// keep coordinates non-negative.
    pub fn extend_region(&mut self, anchor: Vec2i, corner: Vec2i) -> Option<Vec2i> {
        let touches_board = Direction::iter_cardinal()
            .any(|dir| self.board.point(anchor + dir.unit_vector()).is_some());
        if !self.board.is_extendable(anchor) || !touches_board {
            return None;
        }

        let cells: Vec<Vec2i> = Region::new(anchor, corner)
            .cells()
            .filter(|c| self.board.is_extendable(*c))
            .collect();

        self.snapshot();
        let shift = self.board.extend_all(cells);
        debug!(%anchor, %corner, %shift, "extended region");
        Some(shift)
    }

    /// Erases the points between `anchor` and `corner` along with any part
    /// of the board cut off by the erasure, then packs the board. Refused
    /// when it would erase every point or a locked point.
    pub fn erase_region(&mut self, anchor: Vec2i, corner: Vec2i) -> Option<PackReport> {
        self.board.point(anchor)?;

        let deletion = prevent_split(&self.board, Region::new(anchor, corner).cells());
        if deletion.is_empty() {
            return None;
        }
        if deletion
            .iter()
            .any(|pos| self.board.point(*pos).is_some_and(|p| p.locked))
        {
            debug!(%anchor, %corner, "erase touches locked points");
            return None;
        }

        self.snapshot();
        for pos in deletion.iter() {
            self.board.erase(*pos);
        }
        let report = self.board.pack();
        debug!(points = deletion.len(), ?report, "erased region");
        Some(report)
    }

    pub fn set_locked(&mut self, pos: Vec2i, locked: bool) -> bool {
        let point = unwrap_option_or_return!(self.board.point(pos), false);
        if point.locked == locked {
            return false;
        }
        self.snapshot();
        self.board.set_locked(pos, locked)
    }

    /// Board as base64 text of its compressed encoding.
    pub fn save(&self) -> Result<String> {
        io::board_to_text(&self.board, self.config.compression_level)
    }

    /// Replaces the board with one decoded from [`Editor::save`] output.
    pub fn load(&mut self, text: &str, library: &PartLibrary) -> Result<()> {
        let board = io::board_from_text(text, library)?;
        self.snapshot();
        self.board = board;
        debug!(points = self.board.point_count(), "loaded board");
        Ok(())
    }
}
