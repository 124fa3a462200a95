//! Containment layout metrics: nested system ⊃ API ⊃ endpoint boxes.
//!
//! All API and endpoint positions are relative to their parent box. Sizes are
//! derived bottom-up (endpoint grid → API height → system height) so a parent
//! is always large enough for its children.

use serde::Deserialize;

use super::geometry::Rect;

/// Fixed dimensions of the containment layout.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContainmentMetrics {
	/// Left of the first grid column.
	pub origin_x: f64,
	/// Top of the first grid row.
	pub origin_y: f64,
	/// Systems per grid row.
	pub columns: usize,
	/// Minimum system width; wide APIs widen it.
	pub system_width: f64,
	/// Height of a system without APIs.
	pub system_min_height: f64,
	/// Space above the first API (title and description).
	pub system_header: f64,
	/// Gap between neighbouring systems, both axes.
	pub system_spacing: f64,
	/// Horizontal inset of APIs inside their system.
	pub api_inset: f64,
	/// Minimum API width; long endpoint rows widen it.
	pub api_width: f64,
	/// Space above the endpoint grid inside an API.
	pub api_header: f64,
	/// Space below the endpoint grid inside an API.
	pub api_bottom_padding: f64,
	/// Vertical gap after each API.
	pub api_spacing: f64,
	/// Endpoint cells per grid row.
	pub endpoints_per_row: usize,
	/// Side of one endpoint square.
	pub endpoint_size: f64,
	/// Distance between neighbouring endpoint cells, both axes.
	pub endpoint_pitch: f64,
	/// Inset of the endpoint grid inside its API.
	pub endpoint_inset: f64,
}

impl Default for ContainmentMetrics {
	fn default() -> Self {
		Self {
			origin_x: 40.0,
			origin_y: 40.0,
			columns: 3,
			system_width: 350.0,
			system_min_height: 200.0,
			system_header: 50.0,
			system_spacing: 80.0,
			api_inset: 15.0,
			api_width: 320.0,
			api_header: 30.0,
			api_bottom_padding: 15.0,
			api_spacing: 15.0,
			endpoints_per_row: 4,
			endpoint_size: 20.0,
			endpoint_pitch: 35.0,
			endpoint_inset: 15.0,
		}
	}
}

impl ContainmentMetrics {
	fn per_row(&self) -> usize {
		self.endpoints_per_row.max(1)
	}

	/// Rows in an API's endpoint grid; an empty API still reserves one.
	pub fn endpoint_rows(&self, endpoint_count: usize) -> usize {
		endpoint_count.div_ceil(self.per_row()).max(1)
	}

	/// Width of every API box: the configured width, widened when a full
	/// endpoint row would not fit.
	pub fn api_box_width(&self) -> f64 {
		let grid = 2.0 * self.endpoint_inset
			+ (self.per_row() - 1) as f64 * self.endpoint_pitch
			+ self.endpoint_size;
		self.api_width.max(grid)
	}

	/// Width of every system box: the configured width, widened when its
	/// inset APIs would not fit.
	pub fn system_box_width(&self) -> f64 {
		self.system_width.max(2.0 * self.api_inset + self.api_box_width())
	}

	/// Height of an API holding `endpoint_count` endpoints.
	pub fn api_height(&self, endpoint_count: usize) -> f64 {
		self.api_header
			+ self.endpoint_rows(endpoint_count) as f64 * self.endpoint_pitch
			+ self.api_bottom_padding
	}

	/// Box of the `index`-th endpoint, relative to its API.
	pub fn endpoint_rect(&self, index: usize) -> Rect {
		let (row, col) = (index / self.per_row(), index % self.per_row());
		Rect::new(
			self.endpoint_inset + col as f64 * self.endpoint_pitch,
			self.api_header + row as f64 * self.endpoint_pitch,
			self.endpoint_size,
			self.endpoint_size,
		)
	}

	/// Height of a system whose APIs have the given heights.
	pub fn system_height(&self, api_heights: &[f64]) -> f64 {
		let stacked: f64 = api_heights.iter().map(|h| h + self.api_spacing).sum();
		(self.system_header + stacked).max(self.system_min_height)
	}

	/// Grid cell `(row, column)` of the system ranked `rank` by connectivity.
	///
	/// Rank 0 takes the middle column of the first row; the remaining first-row
	/// cells are filled left to right, then every later row in order.
	pub fn grid_cell(&self, rank: usize) -> (usize, usize) {
		let columns = self.columns.max(1);
		if rank >= columns {
			return (rank / columns, rank % columns);
		}
		let center = columns / 2;
		let col = match rank {
			0 => center,
			r if r <= center => r - 1,
			r => r,
		};
		(0, col)
	}

	/// Places systems of the given heights (in rank order) on the grid.
	///
	/// Returns the top-left corner of each. Each row is as tall as its tallest
	/// system, so boxes never overlap.
	pub fn place_systems(&self, heights: &[f64]) -> Vec<(f64, f64)> {
		let cells: Vec<(usize, usize)> = (0..heights.len()).map(|r| self.grid_cell(r)).collect();
		let rows = cells.iter().map(|&(row, _)| row + 1).max().unwrap_or(0);

		let mut row_height = vec![0.0_f64; rows];
		for (&(row, _), &h) in cells.iter().zip(heights) {
			row_height[row] = row_height[row].max(h);
		}
		let mut row_top = Vec::with_capacity(rows);
		let mut y = self.origin_y;
		for h in &row_height {
			row_top.push(y);
			y += h + self.system_spacing;
		}

		cells
			.iter()
			.map(|&(row, col)| {
				(
					self.origin_x + col as f64 * (self.system_box_width() + self.system_spacing),
					row_top[row],
				)
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn api_height_grows_per_endpoint_row() {
		let m = ContainmentMetrics::default();
		assert_eq!(m.api_height(0), 30.0 + 35.0 + 15.0);
		assert_eq!(m.api_height(4), m.api_height(1));
		assert_eq!(m.api_height(5), 30.0 + 70.0 + 15.0);
	}

	#[test]
	fn endpoint_cells_wrap_after_four() {
		let m = ContainmentMetrics::default();
		assert_eq!(m.endpoint_rect(0), Rect::new(15.0, 30.0, 20.0, 20.0));
		assert_eq!(m.endpoint_rect(3), Rect::new(120.0, 30.0, 20.0, 20.0));
		assert_eq!(m.endpoint_rect(4), Rect::new(15.0, 65.0, 20.0, 20.0));
	}

	#[test]
	fn last_endpoint_fits_inside_its_api() {
		let m = ContainmentMetrics::default();
		for n in 1..20 {
			let last = m.endpoint_rect(n - 1);
			assert!(last.bottom() <= m.api_height(n));
			assert!(last.right() <= m.api_box_width());
		}
	}

	#[test]
	fn wide_endpoint_rows_widen_apis_and_systems() {
		let m = ContainmentMetrics {
			endpoints_per_row: 10,
			..Default::default()
		};
		let last = m.endpoint_rect(9);
		assert_eq!(last.right(), 350.0);
		assert_eq!(m.api_box_width(), 365.0);
		assert!(last.right() <= m.api_box_width());
		assert_eq!(m.system_box_width(), 395.0);
		assert_eq!(m.place_systems(&[200.0, 200.0])[1].0, 40.0);
		assert_eq!(m.place_systems(&[200.0, 200.0])[0].0, 40.0 + 395.0 + 80.0);
	}

	#[test]
	fn wide_apis_widen_their_system() {
		let m = ContainmentMetrics {
			api_width: 500.0,
			..Default::default()
		};
		assert_eq!(m.api_box_width(), 500.0);
		assert_eq!(m.system_box_width(), 530.0);
	}

	#[test]
	fn default_widths_are_unchanged() {
		let m = ContainmentMetrics::default();
		assert_eq!(m.api_box_width(), m.api_width);
		assert_eq!(m.system_box_width(), m.system_width);
	}

	#[test]
	fn system_height_respects_minimum_and_content() {
		let m = ContainmentMetrics::default();
		assert_eq!(m.system_height(&[]), 200.0);
		assert_eq!(m.system_height(&[80.0, 115.0]), 50.0 + 95.0 + 130.0);
	}

	#[test]
	fn most_connected_system_takes_the_middle_column() {
		let m = ContainmentMetrics::default();
		assert_eq!(m.grid_cell(0), (0, 1));
		assert_eq!(m.grid_cell(1), (0, 0));
		assert_eq!(m.grid_cell(2), (0, 2));
		assert_eq!(m.grid_cell(3), (1, 0));
		assert_eq!(m.grid_cell(7), (2, 1));
	}

	#[test]
	fn rows_are_as_tall_as_their_tallest_system() {
		let m = ContainmentMetrics::default();
		let spots = m.place_systems(&[200.0, 500.0, 200.0, 200.0]);
		assert_eq!(spots[0], (470.0, 40.0));
		assert_eq!(spots[1], (40.0, 40.0));
		assert_eq!(spots[2], (900.0, 40.0));
		assert_eq!(spots[3], (40.0, 40.0 + 500.0 + 80.0));
	}
}
