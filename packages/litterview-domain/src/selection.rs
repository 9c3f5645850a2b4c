use std::collections::HashSet;

use crate::{AddressRecord, ScoreColor, address};

/// Allow-sets and the cost cap applied by the row selector.
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
	pub street_classes: HashSet<String>,
	pub score_colors: HashSet<ScoreColor>,
	pub max_records: usize,
}
impl SelectionPolicy {
	pub fn from_config(cfg: &litterview_config::Selection) -> Self {
		Self {
			street_classes: cfg.street_classes.iter().cloned().collect(),
			score_colors: cfg
				.score_colors
				.iter()
				.map(|color| ScoreColor::from(color.as_str()))
				.collect(),
			max_records: cfg.max_records,
		}
	}
}

/// How many rows each filter removed, in filter order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionReport {
	pub input: usize,
	pub non_numeric_block: usize,
	pub street_class: usize,
	pub score_color: usize,
	pub duplicate_address: usize,
	pub already_fetched: usize,
	pub truncated: usize,
	pub selected: usize,
}

/// Filters the table down to the records that still need imagery.
///
/// `already_fetched` holds the ids whose image folder is populated. The result depends only on
/// the inputs, so re-running over the same table and folder state selects the same records.
pub fn select(
	records: &[AddressRecord],
	policy: &SelectionPolicy,
	already_fetched: &HashSet<i64>,
) -> (Vec<AddressRecord>, SelectionReport) {
	let (positions, report) = select_positions(records, policy, already_fetched);
	let selected = positions.into_iter().map(|position| records[position].clone()).collect();

	(selected, report)
}

/// Same as [`select`], but returns positions into `records` in table order.
pub fn select_positions(
	records: &[AddressRecord],
	policy: &SelectionPolicy,
	already_fetched: &HashSet<i64>,
) -> (Vec<usize>, SelectionReport) {
	let mut report = SelectionReport { input: records.len(), ..Default::default() };
	let mut seen_addresses = HashSet::new();
	let mut selected = Vec::new();

	for (position, record) in records.iter().enumerate() {
		if !address::has_numeric_prefix(&record.raw_address) {
			report.non_numeric_block += 1;

			continue;
		}
		if !policy.street_classes.contains(record.street_class.trim()) {
			report.street_class += 1;

			continue;
		}
		if !policy.score_colors.contains(&record.score_color) {
			report.score_color += 1;

			continue;
		}
		if !seen_addresses.insert(record.raw_address.trim()) {
			report.duplicate_address += 1;

			continue;
		}
		if already_fetched.contains(&record.id) {
			report.already_fetched += 1;

			continue;
		}

		selected.push(position);
	}

	if selected.len() > policy.max_records {
		report.truncated = selected.len() - policy.max_records;

		selected.truncate(policy.max_records);
	}

	report.selected = selected.len();

	(selected, report)
}
