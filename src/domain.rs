use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

#[derive(Debug)]
pub enum RowedError {
    IoError(Error),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    LoadingFailed(String),
    SavingFailed(String),
}

impl From<Error> for RowedError {
    fn from(err: Error) -> Self {
        RowedError::IoError(err)
    }
}

impl From<reqwest::Error> for RowedError {
    fn from(err: reqwest::Error) -> Self {
        RowedError::HttpError(err)
    }
}

impl From<serde_json::Error> for RowedError {
    fn from(err: serde_json::Error) -> Self {
        RowedError::JsonError(err)
    }
}

// Messages are produced by the controller from raw terminal events and
// interpreted by the model depending on its current modus.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CycleRowsPerPage,
    Search,
    Enter,
    BulkEdit,
    ToggleSelect,
    ShiftUp,
    ShiftDown,
    Save,
    Cancel,
    ColumnPrefs,
    CopyCell,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
    MouseDown(u16, u16),
    MouseDrag(u16, u16),
    MouseUp(u16, u16),
}

// What the line input at the bottom of the screen is currently collecting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CmdMode {
    Search,
    EditCell,
    BulkEdit,
}

#[derive(Debug, Clone, Setters)]
pub struct RowedConfig {
    pub server: String,
    pub prefs_path: PathBuf,
    pub rows_per_page: usize,
    pub max_column_width: usize,
    pub event_poll_time: u64,
}

impl Default for RowedConfig {
    fn default() -> Self {
        RowedConfig {
            server: "http://localhost:5000".to_string(),
            prefs_path: PathBuf::from("columnPreferences.json"),
            rows_per_page: 20,
            max_column_width: 40,
            event_poll_time: 100,
        }
    }
}

pub const HELP_TEXT: &str = "rowed - tabular record editor

Navigation
  Up/Down/k/j     Move row cursor
  Left/Right/h/l  Move column cursor
  n / p           Next / previous page
  g / G           First / last page
  r               Cycle rows per page (10/20/50/100)

Editing
  Enter / e       Edit current cell
  Space           Select/deselect current row
  b               Bulk edit current column for selected rows
  s               Save all records to the server
  c               Discard pending edits

Reordering
  Drag a row by its handle (leftmost column) with the mouse
  and drop it on another row.

Other
  /               Search (filters all columns)
  o               Column preferences (Space toggle, J/K move, s save)
  y / Y           Copy cell / row to clipboard
  ?               This help
  Esc             Close popup / clear search
  q               Quit
";
