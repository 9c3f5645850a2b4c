use litterview_domain::{
	AddressRecord,
	selection::{self, SelectionPolicy, SelectionReport},
};
use litterview_storage::table::{self, InputRow, InputTable};

use crate::{LitterService, Result};

#[derive(Debug, Clone)]
pub struct SelectStage {
	pub input: InputTable,
	pub selected: Vec<AddressRecord>,
	/// Positions of the selected records in `input.rows`, in table order.
	pub positions: Vec<usize>,
	pub report: SelectionReport,
}
impl SelectStage {
	/// Source rows of the selected records.
	pub fn selected_rows(&self) -> impl Iterator<Item = &InputRow> {
		self.positions.iter().filter_map(|position| self.input.rows.get(*position))
	}
}

impl LitterService {
	pub fn read_input(&self) -> Result<InputTable> {
		Ok(table::read_input(&self.cfg.paths.input)?)
	}

	/// Loads the input table and keeps the rows that still need imagery.
	///
	/// A record counts as fetched once its folder holds one image per configured heading, so a
	/// partly fetched record is selected again.
	pub fn select_records(&self) -> Result<SelectStage> {
		let input = self.read_input()?;
		let policy = SelectionPolicy::from_config(&self.cfg.selection);
		let expected = self.cfg.imagery.headings.len();
		let already_fetched = self.store.complete_ids(expected)?;

		for (record_id, held) in self.store.partial_folders(expected)? {
			tracing::warn!(record_id, held, expected, "Refetching partly fetched record.");
		}

		let records = input.records();
		let (positions, report) =
			selection::select_positions(&records, &policy, &already_fetched);
		let selected =
			positions.iter().filter_map(|position| records.get(*position)).cloned().collect();

		tracing::info!(
			input = report.input,
			rejected_rows = input.rejected,
			non_numeric_block = report.non_numeric_block,
			street_class = report.street_class,
			score_color = report.score_color,
			duplicate_address = report.duplicate_address,
			already_fetched = report.already_fetched,
			truncated = report.truncated,
			selected = report.selected,
			"Selected records."
		);

		Ok(SelectStage { input, selected, positions, report })
	}
}
