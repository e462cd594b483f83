use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace, warn};

use crate::columns::{ColumnPrefs, INDEX_COLUMN};
use crate::domain::{CmdMode, HELP_TEXT, Message, RowedConfig, RowedError};
use crate::edits::EditBuffer;
use crate::gateway::{Gateway, SaveOutcome};
use crate::inputter::{InputResult, Inputter};
use crate::reorder::{self, DragState, EdgeScroll};
use crate::store::{RecordId, RecordStore};
use crate::ui::{CMDLINE_HEIGHT, COLUMN_WIDTH_MARGIN, HANDLE_WIDTH, TABLE_HEADER_HEIGHT};
use crate::view::{ViewState, project};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    PREFS,
    POPUP,
    CMDINPUT,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

impl ColumnView {
    fn empty() -> Self {
        ColumnView {
            name: "".to_string(),
            width: 3,
            data: Vec::new(),
        }
    }
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub handle_width: usize,
    pub table_height: usize,
    pub header_height: usize,
    pub statusline_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            handle_width: HANDLE_WIDTH,
            table_height: ui_height.saturating_sub(TABLE_HEADER_HEIGHT + CMDLINE_HEIGHT),
            header_height: TABLE_HEADER_HEIGHT,
            statusline_height: CMDLINE_HEIGHT,
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }

    /// Rendered row slot under screen row `y`, not yet bounded by the
    /// number of rows actually on screen.
    pub fn hit_row(&self, y: u16) -> Option<usize> {
        let y = y as usize;
        if y >= self.header_height && y < self.header_height + self.table_height {
            Some(y - self.header_height)
        } else {
            None
        }
    }

    pub fn in_handle(&self, x: u16) -> bool {
        (x as usize) < self.handle_width
    }

    pub fn surface_top(&self) -> u16 {
        self.header_height as u16
    }

    pub fn surface_bottom(&self) -> u16 {
        (self.header_height + self.table_height.max(1) - 1) as u16
    }
}

/// Snapshot of everything the UI needs for one frame. The renderer reads
/// only this, never the model internals.
pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub index: ColumnView,
    pub nrows: usize,
    pub total_matching: usize,
    pub page: usize,
    pub total_pages: usize,
    pub rows_per_page: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub drag_source_row: Option<usize>,
    pub drag_over_row: Option<usize>,
    pub modified_rows: Vec<bool>,
    pub marked_rows: Vec<bool>,
    pub pending_edits: bool,
    pub search: String,
    pub show_popup: bool,
    pub popup_message: String,
    pub show_prefs: bool,
    pub prefs: Vec<(String, bool)>,
    pub prefs_selected: usize,
    pub layout: UILayout,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CmdMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            table: Vec::new(),
            index: ColumnView::empty(),
            nrows: 0,
            total_matching: 0,
            page: 1,
            total_pages: 1,
            rows_per_page: 0,
            selected_row: 0,
            selected_column: 0,
            drag_source_row: None,
            drag_over_row: None,
            modified_rows: Vec::new(),
            marked_rows: Vec::new(),
            pending_edits: false,
            search: String::new(),
            show_popup: false,
            popup_message: String::new(),
            show_prefs: false,
            prefs: Vec::new(),
            prefs_selected: 0,
            layout: UILayout::default(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    config: RowedConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    store: RecordStore,
    view: ViewState,
    prefs: ColumnPrefs,
    prefs_draft: ColumnPrefs,
    prefs_curser: usize,
    edits: EditBuffer,
    drag: DragState,
    gateway: Gateway,
    page_len: usize,
    page_ids: Vec<RecordId>,
    visible_data_columns: Vec<String>,
    offset_row: usize,
    curser_row: usize,
    curser_column: usize,
    total_matching: usize,
    uilayout: UILayout,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CmdMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    pub fn init(
        config: RowedConfig,
        store: RecordStore,
        prefs: ColumnPrefs,
        gateway: Gateway,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let view = ViewState::new(config.rows_per_page);
        let mut model = Self {
            config,
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            store,
            view,
            prefs_draft: prefs.clone(),
            prefs,
            prefs_curser: 0,
            edits: EditBuffer::default(),
            drag: DragState::Idle,
            gateway,
            page_len: 0,
            page_ids: Vec::new(),
            visible_data_columns: Vec::new(),
            offset_row: 0,
            curser_row: 0,
            curser_column: 0,
            total_matching: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        model.uidata.name = model.config.server.clone();
        model.set_status_message(format!("Loaded {} records", model.store.len()));
        model.update_table_data();
        model
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, msg: Message) -> Result<(), RowedError> {
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MoveLeft => self.move_table_selection_left(),
                Message::MoveRight => self.move_table_selection_right(),
                Message::NextPage => self.next_page(),
                Message::PrevPage => self.prev_page(),
                Message::FirstPage => self.first_page(),
                Message::LastPage => self.last_page(),
                Message::CycleRowsPerPage => self.cycle_rows_per_page(),
                Message::Search => self.enter_cmd_mode(CmdMode::Search),
                Message::Enter => self.start_cell_edit(),
                Message::BulkEdit => self.start_bulk_edit(),
                Message::ToggleSelect => self.toggle_row_mark(),
                Message::Save => self.save_changes(),
                Message::Cancel => self.cancel_changes(),
                Message::ColumnPrefs => self.open_prefs(),
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Help => self.show_help(),
                Message::Exit => self.clear_search(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::MouseDown(x, y) => self.mouse_down(x, y),
                Message::MouseDrag(x, y) => self.mouse_drag(x, y),
                Message::MouseUp(x, y) => self.mouse_up(x, y),
                _ => (),
            },
            Modus::PREFS => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_prefs_selection(-1),
                Message::MoveDown => self.move_prefs_selection(1),
                Message::ToggleSelect => self.toggle_pref_visibility(),
                Message::ShiftUp => self.shift_pref(-1),
                Message::ShiftDown => self.shift_pref(1),
                Message::Enter | Message::Save => self.commit_prefs(),
                Message::Exit | Message::Cancel => self.close_prefs(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key);
                }
            }
        }
        Ok(())
    }

    // -------------------- view rebuilding ---------------------- //

    fn effective_value(&self, id: RecordId, column: &str) -> String {
        if let Some(pending) = self.edits.pending_value(id, column) {
            return pending.to_string();
        }
        self.store
            .get(id)
            .and_then(|r| r.get(column))
            .unwrap_or("")
            .to_string()
    }

    /// Rebuilds the rendered slice from the store: projection, ordinal
    /// recomputation, pending edit overlay and drag decoration mapping.
    fn update_table_data(&mut self) {
        let (mut page_records, mut total) = project(
            &self.store,
            self.view.search(),
            self.view.page(),
            self.view.rows_per_page(),
        );
        // The matching set can shrink under the current page.
        if page_records.is_empty() && total > 0 && self.view.page() > 1 {
            self.view.clamp_page(total);
            (page_records, total) = project(
                &self.store,
                self.view.search(),
                self.view.page(),
                self.view.rows_per_page(),
            );
        }
        self.total_matching = total;
        self.page_len = page_records.len();

        let height = self.uilayout.table_height.max(1);
        self.offset_row = self.offset_row.min(self.page_len.saturating_sub(1));
        let rbegin = self.offset_row;
        let rend = (rbegin + height).min(self.page_len);
        let slice = &page_records[rbegin..rend];

        self.page_ids = slice.iter().map(|r| r.id()).collect();
        let nrows = self.page_ids.len();
        self.curser_row = self.curser_row.min(nrows.saturating_sub(1));

        // Ordinal column: 1-based position in the filtered view at render
        // time. Never stored, never editable.
        let base = (self.view.page() - 1) * self.view.rows_per_page() + rbegin;
        let index_data: Vec<String> = (0..nrows).map(|i| (base + i + 1).to_string()).collect();
        let digits = index_data.last().map(|s| s.len()).unwrap_or(1);
        let index = ColumnView {
            name: INDEX_COLUMN.to_string(),
            width: digits.max(INDEX_COLUMN.len()),
            data: index_data,
        };

        let visible: Vec<String> = self
            .prefs
            .visible_data_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        self.curser_column = self.curser_column.min(visible.len().saturating_sub(1));

        let ids = self.page_ids.clone();
        let mut table: Vec<ColumnView> = Vec::with_capacity(visible.len());
        for name in &visible {
            let data: Vec<String> = ids
                .iter()
                .map(|&id| self.effective_value(id, name))
                .collect();
            let content_width = data.iter().map(|v| v.chars().count()).max().unwrap_or(0);
            let width = (name.chars().count().max(content_width) + COLUMN_WIDTH_MARGIN)
                .min(self.config.max_column_width);
            table.push(ColumnView {
                name: name.clone(),
                width,
                data,
            });
        }
        self.visible_data_columns = visible;

        let modified: Vec<bool> = ids.iter().map(|&id| self.edits.is_modified(id)).collect();
        let marked: Vec<bool> = ids.iter().map(|&id| self.edits.is_selected(id)).collect();
        let slot_of =
            |id: Option<RecordId>| id.and_then(|id| ids.iter().position(|&other| other == id));
        let drag_source_row = slot_of(self.drag.source());
        let drag_over_row = slot_of(self.drag.hover());

        let uidata = &mut self.uidata;
        uidata.table = table;
        uidata.index = index;
        uidata.nrows = nrows;
        uidata.total_matching = total;
        uidata.page = self.view.page();
        uidata.total_pages = self.view.total_pages(total);
        uidata.rows_per_page = self.view.rows_per_page();
        uidata.selected_row = self.curser_row;
        uidata.selected_column = self.curser_column;
        uidata.drag_source_row = drag_source_row;
        uidata.drag_over_row = drag_over_row;
        uidata.modified_rows = modified;
        uidata.marked_rows = marked;
        uidata.pending_edits = self.edits.has_pending();
        uidata.search = self.view.search().to_string();
        uidata.layout = self.uilayout.clone();
        uidata.status_message = self.status_message.clone();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.update_table_data();
    }

    // -------------------- edits & synchronization ---------------------- //

    /// Flushes pending edits into the store. Forced before page changes,
    /// saves and drops, so ordinal-based reasoning always sees committed
    /// data.
    fn sync_edits(&mut self) {
        let applied = self.edits.sync(&mut self.store);
        if applied > 0 {
            self.set_status_message(format!("Applied {applied} edits"));
        }
    }

    fn cancel_changes(&mut self) {
        let dropped = self.edits.discard();
        self.set_status_message(format!("Discarded {dropped} pending edits"));
        self.update_table_data();
    }

    fn start_cell_edit(&mut self) {
        let (Some(&id), Some(column)) = (
            self.page_ids.get(self.curser_row),
            self.visible_data_columns.get(self.curser_column).cloned(),
        ) else {
            self.set_status_message("Nothing to edit".to_string());
            return;
        };
        let current = self.effective_value(id, &column);
        self.enter_cmd_mode(CmdMode::EditCell);
        self.input.set(&current);
        self.last_input = self.input.get();
        self.uidata.cmdinput = self.last_input.clone();
    }

    fn start_bulk_edit(&mut self) {
        if self.edits.selected_count() == 0 {
            self.set_status_message("No rows selected for bulk edit".to_string());
            return;
        }
        if self.visible_data_columns.is_empty() {
            self.set_status_message("No editable column".to_string());
            return;
        }
        self.enter_cmd_mode(CmdMode::BulkEdit);
    }

    fn toggle_row_mark(&mut self) {
        if let Some(&id) = self.page_ids.get(self.curser_row) {
            self.edits.toggle_selected(id);
            self.update_table_data();
        }
    }

    fn save_changes(&mut self) {
        self.sync_edits();
        self.set_status_message("Saving ...".to_string());
        match self.gateway.save_records(&self.store, &self.prefs) {
            Ok(SaveOutcome::Saved) => {
                info!("Saved {} records", self.store.len());
                self.set_status_message(format!("Saved {} records", self.store.len()));
            }
            Ok(SaveOutcome::Rejected(message)) => {
                warn!("Server rejected save: {}", message);
                self.show_popup(format!("Error saving data: {message}"));
            }
            Err(err) => {
                error!("Save failed: {:?}", err);
                self.show_popup(format!("Error: {err:?}"));
            }
        }
        self.update_table_data();
    }

    // -------------------- command line input ---------------------- //

    fn enter_cmd_mode(&mut self, mode: CmdMode) {
        trace!("Entering command mode {:?} ...", mode);
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.cmd_mode = self.cmd_mode;
        self.uidata.active_cmdinput = self.active_cmdinput;
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {}", self.last_input.input);
        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.uidata.active_cmdinput = self.active_cmdinput;

        let result = self.last_input.clone();
        match self.cmd_mode {
            Some(CmdMode::Search) => {
                if !result.canceled {
                    self.view.set_search(result.input);
                    self.offset_row = 0;
                    self.curser_row = 0;
                }
            }
            Some(CmdMode::EditCell) => {
                if !result.canceled
                    && let (Some(&id), Some(column)) = (
                        self.page_ids.get(self.curser_row),
                        self.visible_data_columns.get(self.curser_column),
                    )
                {
                    self.edits.stage(id, column, result.input);
                }
            }
            Some(CmdMode::BulkEdit) => {
                if !result.canceled
                    && let Some(column) = self.visible_data_columns.get(self.curser_column)
                {
                    let column = column.clone();
                    let count = self.edits.stage_bulk(&column, &result.input);
                    self.set_status_message(format!(
                        "Staged '{}' for {} rows in column {}",
                        result.input, count, column
                    ));
                }
            }
            None => {
                debug!("Cmd input finished without a mode");
            }
        }
        self.cmd_mode = None;
        self.uidata.cmd_mode = None;
        self.update_table_data();
    }

    // -------------------- paging & navigation ---------------------- //

    fn next_page(&mut self) {
        self.sync_edits();
        self.view.next_page(self.total_matching);
        self.offset_row = 0;
        self.curser_row = 0;
        self.update_table_data();
    }

    fn prev_page(&mut self) {
        self.sync_edits();
        self.view.prev_page();
        self.offset_row = 0;
        self.curser_row = 0;
        self.update_table_data();
    }

    fn first_page(&mut self) {
        self.sync_edits();
        self.view.first_page();
        self.offset_row = 0;
        self.curser_row = 0;
        self.update_table_data();
    }

    fn last_page(&mut self) {
        self.sync_edits();
        self.view.last_page(self.total_matching);
        self.offset_row = 0;
        self.curser_row = 0;
        self.update_table_data();
    }

    fn cycle_rows_per_page(&mut self) {
        self.sync_edits();
        self.view.cycle_rows_per_page();
        self.offset_row = 0;
        self.curser_row = 0;
        self.set_status_message(format!("{} rows per page", self.view.rows_per_page()));
        self.update_table_data();
    }

    fn clear_search(&mut self) {
        if !self.view.search().is_empty() {
            self.view.set_search("");
            self.offset_row = 0;
            self.curser_row = 0;
            self.set_status_message("Search cleared".to_string());
            self.update_table_data();
        }
    }

    fn move_table_selection_up(&mut self, size: usize) {
        if self.curser_row > 0 {
            self.curser_row = self.curser_row.saturating_sub(size);
        } else if self.offset_row > 0 {
            self.offset_row = self.offset_row.saturating_sub(size);
        }
        self.update_table_data();
    }

    fn move_table_selection_down(&mut self, size: usize) {
        if self.page_len == 0 {
            return;
        }
        let height = self.uilayout.table_height.max(1);
        if self.curser_row + self.offset_row < self.page_len - 1 {
            if self.curser_row < height - 1 {
                self.curser_row = (self.curser_row + size).min(self.page_len - self.offset_row - 1);
            } else {
                self.offset_row = (self.offset_row + size).min(self.page_len - 1);
            }
            self.update_table_data();
        }
    }

    fn move_table_selection_left(&mut self) {
        self.curser_column = self.curser_column.saturating_sub(1);
        self.update_table_data();
    }

    fn move_table_selection_right(&mut self) {
        if self.curser_column + 1 < self.visible_data_columns.len() {
            self.curser_column += 1;
            self.update_table_data();
        }
    }

    // -------------------- drag & drop reordering ---------------------- //

    fn mouse_down(&mut self, x: u16, y: u16) {
        let Some(slot) = self.uilayout.hit_row(y).filter(|s| *s < self.page_ids.len()) else {
            return;
        };
        if self.uilayout.in_handle(x) {
            self.drag = DragState::begin(self.page_ids[slot], y);
        } else {
            self.curser_row = slot;
            if let Some(column) = self.hit_column(x) {
                self.curser_column = column;
            }
        }
        self.update_table_data();
    }

    fn mouse_drag(&mut self, _x: u16, y: u16) {
        if !self.drag.is_dragging() {
            return;
        }
        // Near the surface edges the visible window creeps toward the
        // pointer so off-screen rows become drop targets.
        let scrolled = match reorder::edge_scroll(
            y,
            self.uilayout.surface_top(),
            self.uilayout.surface_bottom(),
        ) {
            Some(EdgeScroll::Up) if self.offset_row > 0 => {
                self.offset_row = self.offset_row.saturating_sub(reorder::AUTOSCROLL_STEP);
                true
            }
            Some(EdgeScroll::Down) => {
                let max_offset = self.page_len.saturating_sub(1);
                let next = (self.offset_row + reorder::AUTOSCROLL_STEP).min(max_offset);
                let moved = next != self.offset_row;
                self.offset_row = next;
                moved
            }
            _ => false,
        };
        if scrolled {
            self.update_table_data();
        }

        let candidate = self
            .uilayout
            .hit_row(y)
            .filter(|slot| *slot < self.page_ids.len())
            .map(|slot| self.page_ids[slot]);
        self.drag.set_hover(candidate);
        self.update_table_data();
    }

    fn mouse_up(&mut self, _x: u16, y: u16) {
        let DragState::Dragging {
            source, origin_y, ..
        } = self.drag
        else {
            return;
        };
        self.drag.finish();

        let target = self
            .uilayout
            .hit_row(y)
            .filter(|slot| *slot < self.page_ids.len())
            .map(|slot| self.page_ids[slot]);
        match target {
            Some(target) if target != source => {
                // Reorder resolution expects committed data.
                self.sync_edits();
                let above = reorder::drop_above_by_travel(y, origin_y);
                if reorder::reorder(&mut self.store, source, target, above) {
                    self.set_status_message("Row moved".to_string());
                }
            }
            _ => {
                trace!("Drag ended without a valid target, gesture cancelled");
            }
        }
        self.update_table_data();
    }

    fn hit_column(&self, x: u16) -> Option<usize> {
        let x = x as usize;
        let mut begin = self.uilayout.handle_width + self.uidata.index.width + 1;
        for (idx, column) in self.uidata.table.iter().enumerate() {
            let end = begin + column.width + 1;
            if x >= begin && x < end {
                return Some(idx);
            }
            begin = end;
        }
        None
    }

    // -------------------- column preferences ---------------------- //

    fn open_prefs(&mut self) {
        self.prefs_draft = self.prefs.clone();
        self.prefs_curser = 0;
        self.previous_modus = self.modus;
        self.modus = Modus::PREFS;
        self.uidata.show_prefs = true;
        self.update_prefs_uidata();
    }

    fn close_prefs(&mut self) {
        self.modus = Modus::TABLE;
        self.previous_modus = Modus::PREFS;
        self.uidata.show_prefs = false;
        self.update_table_data();
    }

    fn commit_prefs(&mut self) {
        self.prefs = self.prefs_draft.clone();
        match self.prefs.save(&self.config.prefs_path) {
            Ok(()) => self.set_status_message("Column preferences saved".to_string()),
            Err(err) => {
                error!("Saving column preferences failed: {:?}", err);
                self.set_status_message(format!("Could not save column preferences: {err:?}"));
            }
        }
        self.close_prefs();
    }

    fn move_prefs_selection(&mut self, step: i32) {
        let len = self.prefs_draft.len();
        if len == 0 {
            return;
        }
        if step < 0 {
            self.prefs_curser = self.prefs_curser.saturating_sub(step.unsigned_abs() as usize);
        } else {
            self.prefs_curser = (self.prefs_curser + step as usize).min(len - 1);
        }
        self.update_prefs_uidata();
    }

    fn toggle_pref_visibility(&mut self) {
        self.prefs_draft.toggle(self.prefs_curser);
        self.update_prefs_uidata();
    }

    fn shift_pref(&mut self, step: i32) {
        self.prefs_curser = if step < 0 {
            self.prefs_draft.move_up(self.prefs_curser)
        } else {
            self.prefs_draft.move_down(self.prefs_curser)
        };
        self.update_prefs_uidata();
    }

    fn update_prefs_uidata(&mut self) {
        self.uidata.prefs = self
            .prefs_draft
            .columns()
            .iter()
            .map(|c| (c.name.clone(), c.visible))
            .collect();
        self.uidata.prefs_selected = self.prefs_curser;
    }

    // -------------------- popups & clipboard ---------------------- //

    fn show_help(&mut self) {
        self.show_popup(HELP_TEXT.to_string());
    }

    fn show_popup(&mut self, message: String) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
        self.uidata.popup_message = message;
        self.uidata.show_popup = true;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
        self.uidata.show_popup = false;
    }

    fn clipboard_set(&mut self, text: String) {
        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new()
                .map_err(|err| warn!("Clipboard unavailable: {:?}", err))
                .ok();
        }
        let outcome = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text),
            None => {
                self.set_status_message("Clipboard unavailable".to_string());
                return;
            }
        };
        match outcome {
            Ok(_) => self.set_status_message("Copied to clipboard".to_string()),
            Err(err) => self.set_status_message(format!("Error copying to clipboard: {err:?}")),
        }
    }

    fn copy_table_cell(&mut self) {
        let (Some(&id), Some(column)) = (
            self.page_ids.get(self.curser_row),
            self.visible_data_columns.get(self.curser_column),
        ) else {
            return;
        };
        let cell = self.effective_value(id, column);
        trace!("Cell content: {}", cell);
        self.clipboard_set(cell);
    }

    fn wrap_cell_content(content: &str) -> String {
        let needs_escaping = content.contains('"');
        let needs_wrapping = content.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(content);
        if needs_escaping {
            out = out.replace("\"", "\"\"");
        }
        if needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn copy_table_row(&mut self) {
        let Some(&id) = self.page_ids.get(self.curser_row) else {
            return;
        };
        let content = self
            .visible_data_columns
            .clone()
            .iter()
            .map(|column| Self::wrap_cell_content(&self.effective_value(id, column)))
            .collect::<Vec<String>>();
        self.clipboard_set(content.join(","));
    }
}
