/// Axis configuration with tick generation and data→pixel mapping.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
    /// Tick label rotation in degrees, counter-clockwise.
    pub tick_label_rotation: f64,
    /// Draw a grid line per major tick.
    pub grid: bool,
}

impl Axis {
    /// Auto-scale linear axis with "nice number" ticks.
    pub fn auto_linear(data_min: f64, data_max: f64, target_ticks: usize) -> Self {
        let (nice_min, nice_max, step) = nice_range(data_min, data_max, target_ticks);
        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut v = nice_min;
        while v <= nice_max + step * 0.01 {
            ticks.push(v);
            labels.push(format_tick(v, step));
            v += step;
        }

        // Minor ticks: 5 subdivisions per major
        let minor_step = step / 5.0;
        let mut minor = Vec::new();
        let mut mv = nice_min;
        while mv <= nice_max + minor_step * 0.01 {
            if !ticks.iter().any(|t| (t - mv).abs() < minor_step * 0.01) {
                minor.push(mv);
            }
            mv += minor_step;
        }

        Self {
            min: nice_min,
            max: nice_max,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
            tick_label_rotation: 0.0,
            grid: true,
        }
    }

    /// Linear axis anchored at zero, for counts.
    pub fn counts(data_max: f64, target_ticks: usize) -> Self {
        Self::auto_linear(0.0, data_max.max(1.0), target_ticks)
    }

    /// One slot per category; category `i` is centered at `i + 0.5`.
    pub fn categorical<S: AsRef<str>>(labels: &[S]) -> Self {
        let n = labels.len().max(1);
        Self {
            min: 0.0,
            max: n as f64,
            label: String::new(),
            tick_positions: (0..labels.len()).map(|i| i as f64 + 0.5).collect(),
            tick_labels: labels.iter().map(|l| l.as_ref().to_string()).collect(),
            minor_ticks: Vec::new(),
            tick_label_rotation: 0.0,
            grid: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.tick_label_rotation = if degrees.is_finite() { degrees } else { 0.0 };
        self
    }

    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return px_min;
        }
        let frac = (value - self.min) / span;
        px_min + frac * (px_max - px_min)
    }

    /// Pixel width of one data unit.
    pub fn unit_pixels(&self, px_min: f64, px_max: f64) -> f64 {
        (self.data_to_pixel(1.0, px_min, px_max) - self.data_to_pixel(0.0, px_min, px_max)).abs()
    }
}

/// "Nice numbers" algorithm for pleasant tick spacing.
fn nice_range(data_min: f64, data_max: f64, target_ticks: usize) -> (f64, f64, f64) {
    if (data_max - data_min).abs() < 1e-15 {
        return (data_min - 1.0, data_max + 1.0, 1.0);
    }
    let range = data_max - data_min;
    let rough_step = range / (target_ticks.max(2) - 1) as f64;
    let step = nice_step(rough_step);
    let nice_min = (data_min / step).floor() * step;
    let nice_max = (data_max / step).ceil() * step;
    (nice_min, nice_max, step)
}

fn nice_step(rough: f64) -> f64 {
    let exp = rough.abs().log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn decimals_for(step: f64) -> usize {
    if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize }
}

/// Tick text. Large counts use `k`/`M` suffixes so labels stay short.
fn format_tick(value: f64, step: f64) -> String {
    // Avoid "-0"
    let v = if value.abs() < step * 0.01 { 0.0 } else { value };
    if step < 1.0 {
        return format!("{:.prec$}", v, prec = decimals_for(step));
    }
    let abs = v.abs();
    if abs >= 1e6 && step >= 1e5 {
        compact(v / 1e6, step / 1e6, "M")
    } else if abs >= 1e3 && step >= 1e2 {
        compact(v / 1e3, step / 1e3, "k")
    } else {
        format!("{}", v as i64)
    }
}

fn compact(v: f64, step: f64, suffix: &str) -> String {
    format!("{:.prec$}{suffix}", v, prec = decimals_for(step))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_linear_basic() {
        let ax = Axis::auto_linear(0.0, 10.0, 6);
        assert!(!ax.tick_positions.is_empty());
        assert!(ax.min <= 0.0);
        assert!(ax.max >= 10.0);
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::auto_linear(0.0, 100.0, 5);
        let px = ax.data_to_pixel(50.0, 0.0, 500.0);
        assert!((px - 250.0).abs() < 1.0);
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
        assert!((nice_step(1.2) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn counts_axis_starts_at_zero() {
        let ax = Axis::counts(37.0, 6);
        assert_eq!(ax.min, 0.0);
        assert!(ax.max >= 37.0);
        assert_eq!(ax.tick_labels[0], "0");

        let empty = Axis::counts(0.0, 6);
        assert_eq!(empty.min, 0.0);
        assert!(empty.max >= 1.0);
    }

    #[test]
    fn categorical_slots() {
        let ax = Axis::categorical(&["0.5", "1.0", "1.5"]);
        assert_eq!(ax.max, 3.0);
        assert_eq!(ax.tick_positions, vec![0.5, 1.5, 2.5]);
        assert_eq!(ax.tick_labels[2], "1.5");
        assert!((ax.data_to_pixel(1.5, 0.0, 300.0) - 150.0).abs() < 1e-9);
        assert!((ax.unit_pixels(0.0, 300.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn compact_tick_labels() {
        assert_eq!(format_tick(4_000_000.0, 2_000_000.0), "4M");
        assert_eq!(format_tick(1_500_000.0, 500_000.0), "1.5M");
        assert_eq!(format_tick(1_400.0, 200.0), "1.4k");
        assert_eq!(format_tick(200.0, 200.0), "200");
        assert_eq!(format_tick(-0.0000001, 1.0), "0");
        assert_eq!(format_tick(0.25, 0.05), "0.25");
    }
}
