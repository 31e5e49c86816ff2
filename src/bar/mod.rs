//! Front ends that present resolve passes.
//!
//! With the `bar-gtk` feature, [`gtk::run_main_loop`] takes over the main
//! thread and shows the slots as buttons in a layer-shell bar.
//! [`JsonLines`] is the headless alternative: one JSON document per pass.

#[cfg(feature = "bar-gtk")]
pub mod gtk;

use crate::model::WORKSPACE_COUNT;
use crate::resolver::SlotView;
use crate::traits::SlotDisplay;
use log::warn;
use std::io::Write;

/// Writes every pass as a single line of JSON (an array of nine slot
/// objects).
pub struct JsonLines<W: Write> {
    out: W,
}

impl<W: Write> JsonLines<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SlotDisplay for JsonLines<W> {
    fn present(&mut self, views: &[SlotView; WORKSPACE_COUNT]) {
        let written = serde_json::to_writer(&mut self.out, views)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            warn!("failed to write resolve pass: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::{Model, MonitorIdentity};
    use crate::resolver::resolve_all;

    #[test]
    fn json_lines_writes_one_line_per_pass() {
        let mut model = Model::new(MonitorIdentity::resolved("DP-1"));
        model.slots[1].window_count = 1;
        let views = resolve_all(&model, &Config::default());

        let mut display = JsonLines::new(Vec::new());
        display.present(&views);
        display.present(&views);
        let out = String::from_utf8(display.into_inner()).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let slots = parsed.as_array().unwrap();
        assert_eq!(slots.len(), WORKSPACE_COUNT);
        assert_eq!(slots[0]["style"], "active");
        assert_eq!(slots[1]["visible"], true);
        assert_eq!(slots[2]["visible"], false);
    }
}
