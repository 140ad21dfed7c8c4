//! Path statistics
//!
//! Per-path metrics are averaged over many paths to give one `StatsRow`
//! per step count. A `StatsTable` collects the rows and exports them.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::types::Point;

/// Radius of the circle used for the exit-time metric
pub const EXIT_RADIUS: f64 = 10.0;

pub const CSV_HEADER: &str = "num_steps,avg_distance_from_origin,avg_distance_from_x_axis,\
avg_distance_from_y_axis,avg_num_steps_to_exit_circle,avg_y_axis_crossings";

/// Metrics of a single path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathStats {
    pub distance_from_origin: f64,
    /// |y| of the final point
    pub distance_from_x_axis: f64,
    /// |x| of the final point
    pub distance_from_y_axis: f64,
    /// Index of the first point farther than `EXIT_RADIUS` from the origin
    pub steps_to_exit_circle: Option<usize>,
    /// Consecutive points whose x coordinates have strictly opposite signs
    pub y_axis_crossings: usize,
}

impl PathStats {
    /// None for an empty path
    pub fn of<const D: usize>(points: &[Point<D>]) -> Option<Self> {
        let last = points.last()?;
        let x = |p: &Point<D>| p.coords().first().copied().unwrap_or(0.0);
        let y = |p: &Point<D>| p.coords().get(1).copied().unwrap_or(0.0);

        Some(Self {
            distance_from_origin: last.norm(),
            distance_from_x_axis: y(last).abs(),
            distance_from_y_axis: x(last).abs(),
            steps_to_exit_circle: points.iter().position(|p| p.norm() > EXIT_RADIUS),
            y_axis_crossings: points
                .windows(2)
                .filter(|pair| x(&pair[0]) * x(&pair[1]) < 0.0)
                .count(),
        })
    }
}

/// Averages over every path run with the same step count
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatsRow {
    pub num_steps: usize,
    pub paths: usize,
    pub avg_distance_from_origin: f64,
    pub avg_distance_from_x_axis: f64,
    pub avg_distance_from_y_axis: f64,
    /// None when no path left the circle
    pub avg_num_steps_to_exit_circle: Option<f64>,
    pub avg_y_axis_crossings: f64,
}

impl StatsRow {
    /// None if `stats` is empty
    pub fn from_paths(num_steps: usize, stats: &[PathStats]) -> Option<Self> {
        if stats.is_empty() {
            return None;
        }
        let n = stats.len() as f64;
        let mean = |f: fn(&PathStats) -> f64| stats.iter().map(f).sum::<f64>() / n;

        let exits: Vec<usize> = stats.iter().filter_map(|s| s.steps_to_exit_circle).collect();
        let avg_exit = if exits.is_empty() {
            tracing::warn!(
                "No path left the radius-{} circle within {} steps",
                EXIT_RADIUS,
                num_steps
            );
            None
        } else {
            Some(exits.iter().sum::<usize>() as f64 / exits.len() as f64)
        };

        Some(Self {
            num_steps,
            paths: stats.len(),
            avg_distance_from_origin: mean(|s: &PathStats| s.distance_from_origin),
            avg_distance_from_x_axis: mean(|s: &PathStats| s.distance_from_x_axis),
            avg_distance_from_y_axis: mean(|s: &PathStats| s.distance_from_y_axis),
            avg_num_steps_to_exit_circle: avg_exit,
            avg_y_axis_crossings: mean(|s: &PathStats| s.y_axis_crossings as f64),
        })
    }

    fn csv_line(&self) -> String {
        let exit = self
            .avg_num_steps_to_exit_circle
            .map(|v| v.to_string())
            .unwrap_or_default();
        format!(
            "{},{},{},{},{},{}",
            self.num_steps,
            self.avg_distance_from_origin,
            self.avg_distance_from_x_axis,
            self.avg_distance_from_y_axis,
            exit,
            self.avg_y_axis_crossings
        )
    }
}

/// Rows ordered by step count
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsTable {
    pub rows: Vec<StatsRow>,
}

impl StatsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping rows sorted by `num_steps`; replaces an existing row for the same count
    pub fn insert(&mut self, row: StatsRow) {
        match self.rows.binary_search_by_key(&row.num_steps, |r| r.num_steps) {
            Ok(i) => self.rows[i] = row,
            Err(i) => self.rows.insert(i, row),
        }
    }

    pub fn get(&self, num_steps: usize) -> Option<&StatsRow> {
        self.rows.iter().find(|r| r.num_steps == num_steps)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for row in &self.rows {
            let _ = writeln!(out, "{}", row.csv_line());
        }
        out
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_csv())?;
        Ok(())
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
