// src/session.rs
//
// Session-scoped UI state and the event -> update pipeline. Each event
// mutates at most the piece of state it carries and recomputes the outputs
// that depend on it.

use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::encoding::{encode, EncodingState, Figure};
use crate::table::{DropdownOption, Granularity};
use crate::viewer::{project, RepetitionSpec, ViewerPayload, ViewerSettings};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A new structure file. Resets the selection to the first row.
    DataLoaded {
        path: String,
        #[serde(default)]
        mode: Option<Granularity>,
    },
    /// Click on the scatter plot. `None` when the event carries no point.
    Click {
        #[serde(default)]
        point: Option<usize>,
    },
    PeriodicRepetition { value: String },
    Encoding { state: EncodingState },
}

impl Event {
    /// Converts plot click data, `{"points": [{"pointNumber": N, ...}]}`.
    pub fn from_click_data(data: &serde_json::Value) -> Self {
        let point = data
            .get("points")
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("pointNumber"))
            .and_then(serde_json::Value::as_u64)
            .map(|n| n as usize);
        Event::Click { point }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "update", rename_all = "snake_case")]
pub enum Update {
    DropdownOptions { options: Vec<DropdownOption> },
    Figure { figure: Figure },
    Viewer { payload: ViewerPayload },
}

pub struct Session {
    dataset: Dataset,
    encoding: EncodingState,
    // Last selected row; only clicks carrying a point change it
    selected_row: usize,
    repetition: RepetitionSpec,
    settings: ViewerSettings,
    graph_height: Option<u32>,
}

impl Session {
    pub fn new(dataset: Dataset, settings: ViewerSettings) -> Self {
        Self {
            dataset,
            encoding: EncodingState::default(),
            selected_row: 0,
            repetition: RepetitionSpec::default(),
            settings,
            graph_height: None,
        }
    }

    pub fn with_graph_height(mut self, height: u32) -> Self {
        self.graph_height = Some(height);
        self
    }

    pub fn with_encoding(mut self, encoding: EncodingState) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selected_row(&self) -> usize {
        self.selected_row
    }

    pub fn repetition(&self) -> &RepetitionSpec {
        &self.repetition
    }

    pub fn encoding(&self) -> &EncodingState {
        &self.encoding
    }

    /// Every output for the current state, as after a data load.
    pub fn initial_updates(&self) -> Vec<Update> {
        let mut updates = vec![Update::DropdownOptions {
            options: self.dataset.table.dropdown_options(),
        }];
        updates.extend(self.figure_update());
        updates.extend(self.viewer_update());
        updates
    }

    /// Swaps in a new dataset and resets the selection.
    pub fn replace_dataset(&mut self, dataset: Dataset) -> Vec<Update> {
        self.dataset = dataset;
        self.selected_row = 0;
        self.initial_updates()
    }

    pub fn handle(&mut self, event: Event) -> Vec<Update> {
        log::debug!("Session event: {:?}", event);

        match event {
            Event::DataLoaded { path, mode } => {
                let mode = mode.unwrap_or_else(|| self.dataset.granularity());
                match Dataset::load_with_species(&path, mode, &self.dataset.species) {
                    Ok(dataset) => self.replace_dataset(dataset),
                    Err(e) => {
                        log::warn!("Could not load {}: {}. Keeping the current data.", path, e);
                        Vec::new()
                    }
                }
            }

            Event::Click { point: None } => Vec::new(),

            Event::Click { point: Some(row) } => {
                if row >= self.dataset.table.n_rows() {
                    log::warn!(
                        "Ignoring click on point {} ({} rows)",
                        row,
                        self.dataset.table.n_rows()
                    );
                    return Vec::new();
                }
                self.selected_row = row;
                self.viewer_update().into_iter().collect()
            }

            Event::PeriodicRepetition { value } => match value.parse::<RepetitionSpec>() {
                Ok(spec) => {
                    self.repetition = spec;
                    self.viewer_update().into_iter().collect()
                }
                Err(e) => {
                    log::warn!("Ignoring periodic repetition '{}': {}", value, e);
                    Vec::new()
                }
            },

            Event::Encoding { state } => {
                let previous = std::mem::replace(&mut self.encoding, state);
                match self.figure_update() {
                    Some(update) => vec![update],
                    None => {
                        self.encoding = previous;
                        Vec::new()
                    }
                }
            }
        }
    }

    fn figure_update(&self) -> Option<Update> {
        match encode(&self.dataset.table, &self.encoding, self.dataset.hover_texts()) {
            Ok(enc) => Some(Update::Figure { figure: enc.figure(self.graph_height) }),
            Err(e) => {
                log::warn!("Plot not updated: {}", e);
                None
            }
        }
    }

    fn viewer_update(&self) -> Option<Update> {
        match project(&self.dataset, self.selected_row, &self.repetition, &self.settings) {
            Ok(payload) => Some(Update::Viewer { payload }),
            Err(e) => {
                log::warn!("Viewer not updated: {}", e);
                None
            }
        }
    }
}
