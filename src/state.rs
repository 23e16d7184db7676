use std::sync::Arc;

use crate::analysis::report::{build_report, Report};
use crate::config::EdaConfig;
use crate::data::error::LoadError;
use crate::data::example;
use crate::data::loader::{self, LoadOutcome, UploadedFile};
use crate::data::model::Table;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Where the pipeline currently stands.
#[derive(Debug, Default)]
pub enum Phase {
    /// Nothing loaded yet, or the last load failed.
    #[default]
    AwaitingInput,
    /// A multi-sheet workbook is waiting for a sheet choice.
    SelectingSheet { sheets: Vec<String> },
    /// A table is analysed. `sheets` is empty unless it came from a
    /// multi-sheet workbook, in which case `sheet` names the one shown.
    Ready {
        table: Arc<Table>,
        report: Box<Report>,
        sheets: Vec<String>,
        sheet: Option<String>,
    },
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: EdaConfig,

    pub phase: Phase,

    /// The current upload, kept to detect re-uploads and to read a chosen sheet.
    pub upload: Option<UploadedFile>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn report(&self) -> Option<&Report> {
        match &self.phase {
            Phase::Ready { report, .. } => Some(&**report),
            _ => None,
        }
    }

    pub fn sheet_choices(&self) -> Option<&[String]> {
        match &self.phase {
            Phase::SelectingSheet { sheets } => Some(sheets.as_slice()),
            Phase::Ready { sheets, .. } if !sheets.is_empty() => Some(sheets.as_slice()),
            _ => None,
        }
    }

    pub fn current_sheet(&self) -> Option<&str> {
        match &self.phase {
            Phase::Ready { sheet, .. } => sheet.as_deref(),
            _ => None,
        }
    }

    /// Start over with a newly uploaded file. Re-uploading the file that is
    /// already shown keeps the current state.
    pub fn open_upload(&mut self, file: UploadedFile) {
        let unchanged = self.upload.as_ref() == Some(&file)
            && !matches!(self.phase, Phase::AwaitingInput);
        if unchanged {
            log::debug!("'{}' is unchanged; keeping current analysis", file.name);
            return;
        }

        self.phase = Phase::AwaitingInput;
        self.status_message = None;
        let result = loader::load(&file, &self.config.formats);
        let name = file.name.clone();
        self.upload = Some(file);

        match result {
            Ok(LoadOutcome::Table(table)) => {
                self.show_table(&name, Arc::new(table), Vec::new(), None)
            }
            Ok(LoadOutcome::Sheets(sheets)) => {
                self.phase = Phase::SelectingSheet { sheets };
            }
            Err(e) => self.fail(&name, e),
        }
    }

    /// Materialize the chosen sheet of the current workbook. The sheet list
    /// stays available so another sheet can be picked afterwards.
    pub fn select_sheet(&mut self, sheet: &str) {
        let Some(file) = self.upload.clone() else {
            return;
        };
        if self.current_sheet() == Some(sheet) {
            return;
        }
        let sheets = self.sheet_choices().map(<[String]>::to_vec).unwrap_or_default();
        match loader::load_sheet(&file, sheet) {
            Ok(table) => {
                log::info!("Showing sheet '{sheet}' of '{}'", file.name);
                let source = format!("{} [{sheet}]", file.name);
                self.show_table(&source, Arc::new(table), sheets, Some(sheet.to_string()));
            }
            Err(e) => self.fail(&file.name, e),
        }
    }

    /// Analyse the example dataset, fetching it unless cached.
    pub fn use_example(&mut self, refetch: bool) {
        let url = self.config.example_url.clone();
        if refetch {
            example::cache().invalidate(&url);
        }
        let result = example::load_example(&url);
        self.apply_example(&url, result);
    }

    fn apply_example(&mut self, url: &str, result: Result<Arc<Table>, LoadError>) {
        self.upload = None;
        self.status_message = None;
        match result {
            Ok(table) => {
                self.show_table(&example::file_name_from_url(url), table, Vec::new(), None)
            }
            Err(e) => self.fail("example dataset", e),
        }
    }

    /// Recompute the report for the current table, e.g. after a settings change.
    pub fn rebuild_report(&mut self) {
        if let Phase::Ready { table, report, .. } = &mut self.phase {
            let source = report.source.clone();
            **report = build_report(&source, table, &self.config);
        }
    }

    fn show_table(
        &mut self,
        source: &str,
        table: Arc<Table>,
        sheets: Vec<String>,
        sheet: Option<String>,
    ) {
        let report = build_report(source, &table, &self.config);
        self.phase = Phase::Ready {
            table,
            report: Box::new(report),
            sheets,
            sheet,
        };
        self.status_message = None;
    }

    fn fail(&mut self, source: &str, err: LoadError) {
        log::error!("Failed to load {source}: {err}");
        self.status_message = Some(format!("Error loading {source}: {err}"));
        self.phase = Phase::AwaitingInput;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::distribution::CategoricalFigure;
    use crate::data::loader::load_csv;

    fn csv_upload(name: &str, content: &str) -> UploadedFile {
        UploadedFile::new(name, content.as_bytes().to_vec())
    }

    /// Workbook with sheets Q1 (one column, two rows) and Q2 (two columns, three rows).
    fn quarterly_workbook() -> UploadedFile {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let q1 = workbook.add_worksheet();
        q1.set_name("Q1").unwrap();
        q1.write_string(0, 0, "sales").unwrap();
        q1.write_number(1, 0, 10.0).unwrap();
        q1.write_number(2, 0, 12.5).unwrap();
        let q2 = workbook.add_worksheet();
        q2.set_name("Q2").unwrap();
        q2.write_string(0, 0, "sales").unwrap();
        q2.write_string(0, 1, "region").unwrap();
        for (row, (sales, region)) in [(8.0, "north"), (9.5, "south"), (11.0, "east")]
            .into_iter()
            .enumerate()
        {
            q2.write_number(row as u32 + 1, 0, sales).unwrap();
            q2.write_string(row as u32 + 1, 1, region).unwrap();
        }
        UploadedFile::new("sales.xlsx", workbook.save_to_buffer().unwrap())
    }

    #[test]
    fn starts_awaiting_input() {
        let state = AppState::default();
        assert!(matches!(state.phase, Phase::AwaitingInput));
        assert!(state.report().is_none());
        assert!(state.status_message.is_none());
    }

    #[test]
    fn csv_upload_produces_a_report() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("a.csv", "x,y\n1,a\n2,b\n"));
        let report = state.report().expect("report");
        assert_eq!(report.source, "a.csv");
        assert_eq!(report.shape, (2, 2));
    }

    #[test]
    fn failed_load_returns_to_awaiting_with_message() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("a.csv", "x\n1\n"));
        state.open_upload(csv_upload("notes.txt", "hello"));
        assert!(matches!(state.phase, Phase::AwaitingInput));
        let msg = state.status_message.as_deref().unwrap();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("unsupported"));
    }

    #[test]
    fn new_upload_replaces_previous_table() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("a.csv", "x\n1\n"));
        state.open_upload(csv_upload("b.csv", "p,q\n1,2\n3,4\n"));
        let report = state.report().unwrap();
        assert_eq!(report.source, "b.csv");
        assert_eq!(report.shape, (2, 2));
    }

    #[test]
    fn unchanged_upload_keeps_state() {
        let mut state = AppState::default();
        let file = csv_upload("a.csv", "x\n1\n");
        state.open_upload(file.clone());
        state.config.preview_rows = 0;
        state.open_upload(file);
        assert_eq!(state.report().unwrap().preview.rows.len(), 1);
    }

    #[test]
    fn settings_change_rebuilds_report() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("c.csv", "c\na\nb\nc\n"));
        assert!(matches!(
            state.report().unwrap().categorical[0],
            CategoricalFigure::Frequencies { .. }
        ));

        state.config.max_categories = 2;
        state.rebuild_report();
        assert!(matches!(
            state.report().unwrap().categorical[0],
            CategoricalFigure::TooManyValues { .. }
        ));
    }

    #[test]
    fn workbook_sheets_stay_selectable_after_choosing_one() {
        let mut state = AppState::default();
        let file = quarterly_workbook();
        state.open_upload(file.clone());
        assert_eq!(state.sheet_choices().unwrap(), ["Q1", "Q2"]);
        assert!(state.report().is_none());

        state.select_sheet("Q1");
        assert_eq!(state.report().unwrap().source, "sales.xlsx [Q1]");
        assert_eq!(state.report().unwrap().shape, (2, 1));
        assert_eq!(state.current_sheet(), Some("Q1"));
        assert_eq!(state.sheet_choices().unwrap(), ["Q1", "Q2"]);

        state.select_sheet("Q2");
        assert_eq!(state.report().unwrap().source, "sales.xlsx [Q2]");
        assert_eq!(state.report().unwrap().shape, (3, 2));
        assert_eq!(state.current_sheet(), Some("Q2"));

        // Re-uploading the same workbook keeps the chosen sheet and the list.
        state.open_upload(file);
        assert_eq!(state.current_sheet(), Some("Q2"));
        assert_eq!(state.sheet_choices().unwrap(), ["Q1", "Q2"]);
    }

    #[test]
    fn single_table_has_no_sheet_choices() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("a.csv", "x\n1\n"));
        assert!(state.sheet_choices().is_none());
        assert!(state.current_sheet().is_none());
    }

    #[test]
    fn select_sheet_without_workbook_reports_error() {
        let mut state = AppState::default();
        state.open_upload(csv_upload("a.csv", "x\n1\n"));
        state.select_sheet("Sheet1");
        assert!(matches!(state.phase, Phase::AwaitingInput));
        assert!(state.status_message.is_some());
    }

    #[test]
    fn example_result_is_shown_or_reported() {
        let mut state = AppState::default();
        let table = Arc::new(load_csv(b"a,b\n1,x\n").unwrap());
        state.apply_example("https://host/data/Titanic.csv", Ok(table));
        assert_eq!(state.report().unwrap().source, "Titanic.csv");
        assert!(state.upload.is_none());

        state.apply_example(
            "https://host/data/Titanic.csv",
            Err(LoadError::Fetch {
                url: "https://host/data/Titanic.csv".into(),
                cause: "timed out".into(),
            }),
        );
        assert!(matches!(state.phase, Phase::AwaitingInput));
        assert!(state.status_message.as_deref().unwrap().contains("timed out"));
    }
}
