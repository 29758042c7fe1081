use egui_plot::PlotPoint;

use crate::columns::ColumnBuffers;
use crate::record::Batch;

/// Renderer-side state: the accumulated columns plus one curve per plotted series.
///
/// Series `i` plots column `i + 1` against the time column. A hidden series
/// always has an empty curve; a visible one always mirrors its whole column.
#[derive(Debug)]
pub struct PlotModel {
    buffers: ColumnBuffers,
    hidden: Vec<bool>,
    curves: Vec<Vec<PlotPoint>>,
    redraws: u64,
}

impl PlotModel {
    pub fn new(columns: usize) -> Self {
        let series = columns.saturating_sub(1);
        Self {
            buffers: ColumnBuffers::new(columns),
            hidden: vec![false; series],
            curves: vec![Vec::new(); series],
            redraws: 0,
        }
    }

    pub fn series_count(&self) -> usize {
        self.curves.len()
    }

    pub fn buffers(&self) -> &ColumnBuffers {
        &self.buffers
    }

    pub fn curve(&self, series: usize) -> &[PlotPoint] {
        self.curves.get(series).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_hidden(&self, series: usize) -> bool {
        self.hidden.get(series).copied().unwrap_or(false)
    }

    /// How many times the curves were refreshed from a batch.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Appends a batch and refreshes the visible curves. An empty batch is
    /// ignored entirely and returns `false`.
    pub fn apply_batch(&mut self, batch: &Batch) -> bool {
        if batch.is_empty() || self.buffers.apply(batch) == 0 {
            return false;
        }
        self.redraw();
        true
    }

    /// Hiding clears the curve at once; showing rebuilds it at once.
    pub fn set_hidden(&mut self, series: usize, hidden: bool) {
        let Some(flag) = self.hidden.get_mut(series) else {
            return;
        };
        *flag = hidden;
        self.curves[series].clear();
        if !hidden {
            self.extend_curve(series);
        }
    }

    /// Drops all accumulated samples, keeping visibility flags.
    pub fn clear(&mut self) {
        self.buffers.clear();
        for curve in &mut self.curves {
            curve.clear();
        }
    }

    fn redraw(&mut self) {
        for series in 0..self.curves.len() {
            if self.hidden[series] {
                self.curves[series].clear();
            } else {
                self.extend_curve(series);
            }
        }
        self.redraws += 1;
    }

    // Visible curves only ever grow, so appending the new tail is enough.
    fn extend_curve(&mut self, series: usize) {
        let columns = self.buffers.columns();
        let (time, values) = (&columns[0], &columns[series + 1]);
        let curve = &mut self.curves[series];
        let start = curve.len();
        curve.extend(
            time[start..]
                .iter()
                .zip(&values[start..])
                .map(|(t, v)| PlotPoint::new(*t, *v)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xy(curve: &[PlotPoint]) -> Vec<[f64; 2]> {
        curve.iter().map(|p| [p.x, p.y]).collect()
    }

    fn model_with_data() -> PlotModel {
        let mut model = PlotModel::new(3);
        model.apply_batch(&vec![vec![0.0, 1.0, 2.0], vec![1.0, 1.1, 2.1]]);
        model
    }

    #[test]
    fn batch_updates_every_visible_curve() {
        let model = model_with_data();
        assert_eq!(model.series_count(), 2);
        assert_eq!(xy(model.curve(0)), [[0.0, 1.0], [1.0, 1.1]]);
        assert_eq!(xy(model.curve(1)), [[0.0, 2.0], [1.0, 2.1]]);
        assert_eq!(model.redraw_count(), 1);
    }

    #[test]
    fn empty_batch_does_not_redraw() {
        let mut model = model_with_data();
        assert!(!model.apply_batch(&Vec::new()));
        assert_eq!(model.redraw_count(), 1);
    }

    #[test]
    fn batch_of_wrong_width_records_does_not_redraw() {
        let mut model = model_with_data();
        assert!(!model.apply_batch(&vec![vec![1.0]]));
        assert_eq!(model.redraw_count(), 1);
        assert_eq!(model.buffers().len(), 2);
    }

    #[test]
    fn hiding_clears_immediately() {
        let mut model = model_with_data();
        model.set_hidden(1, true);
        assert!(model.is_hidden(1));
        assert!(model.curve(1).is_empty());
        assert_eq!(model.curve(0).len(), 2);
    }

    #[test]
    fn hidden_series_stays_empty_while_data_arrives() {
        let mut model = model_with_data();
        model.set_hidden(0, true);
        model.apply_batch(&vec![vec![2.0, 1.2, 2.2]]);
        assert!(model.curve(0).is_empty());
        assert_eq!(model.curve(1).len(), 3);
        assert_eq!(model.buffers().column(1), Some(&[1.0, 1.1, 1.2][..]));
    }

    #[test]
    fn showing_rebuilds_immediately() {
        let mut model = model_with_data();
        model.set_hidden(0, true);
        model.apply_batch(&vec![vec![2.0, 1.2, 2.2]]);
        model.set_hidden(0, false);
        assert_eq!(xy(model.curve(0)), [[0.0, 1.0], [1.0, 1.1], [2.0, 1.2]]);
    }

    #[test]
    fn out_of_range_series_is_ignored() {
        let mut model = model_with_data();
        model.set_hidden(5, true);
        assert!(!model.is_hidden(5));
        assert!(model.curve(5).is_empty());
    }

    #[test]
    fn single_column_has_no_series() {
        let mut model = PlotModel::new(1);
        assert_eq!(model.series_count(), 0);
        assert!(model.apply_batch(&vec![vec![3.0]]));
        assert_eq!(model.buffers().len(), 1);
    }

    #[test]
    fn clear_empties_curves_and_keeps_flags() {
        let mut model = model_with_data();
        model.set_hidden(1, true);
        model.clear();
        assert!(model.buffers().is_empty());
        assert!(model.curve(0).is_empty());
        assert!(model.is_hidden(1));
        model.apply_batch(&vec![vec![5.0, 6.0, 7.0]]);
        assert_eq!(xy(model.curve(0)), [[5.0, 6.0]]);
    }
}
