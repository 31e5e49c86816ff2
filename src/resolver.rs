//! Maps the model to per-slot display decisions.
//!
//! Visibility, first match wins:
//!
//! 1. the slot active on this monitor is always shown;
//! 2. unless all outputs are shown, a slot owned by a known, different
//!    monitor is hidden;
//! 3. unless empty workspaces are shown, a slot without regular or
//!    satellite windows is hidden;
//! 4. everything else is shown.
//!
//! A slot with unknown owner, or an instance whose monitor is still
//! unresolved, is never hidden by rule 2.

use crate::config::Config;
use crate::model::{Model, WORKSPACE_COUNT};
use serde::Serialize;

/// Highlight of a slot.  At most one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlotStyle {
    None,
    /// Active here and the input focus is here.
    Active,
    /// Active here but the input focus is on another monitor.
    Visible,
}

impl SlotStyle {
    /// CSS class carrying this style, if any.
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            SlotStyle::None => None,
            SlotStyle::Active => Some("active"),
            SlotStyle::Visible => Some("visible"),
        }
    }
}

/// Display decision for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// 1-based workspace number.
    pub workspace: usize,
    pub visible: bool,
    pub style: SlotStyle,
    /// No regular and no satellite windows.
    pub is_empty: bool,
    /// The satellite workspace holds windows.
    pub show_indicator: bool,
}

/// Decide how slot `n` (1-based) is displayed.
pub fn resolve(n: usize, model: &Model, config: &Config) -> SlotView {
    let slot = model.slot(n);
    let local = &model.local;
    let is_active = local.active_workspace == Some(n);

    let elsewhere = match (&slot.owning_monitor, local.monitor.name()) {
        (Some(owner), Some(here)) => owner != here,
        _ => false,
    };

    let visible = if is_active {
        true
    } else if !config.show_all_outputs && elsewhere {
        false
    } else {
        config.show_empty_workspaces || !slot.is_empty()
    };

    let style = match (is_active, local.focus_here) {
        (true, true) => SlotStyle::Active,
        (true, false) => SlotStyle::Visible,
        (false, _) => SlotStyle::None,
    };

    SlotView {
        workspace: n,
        visible,
        style,
        is_empty: slot.is_empty(),
        show_indicator: slot.satellite_window_count > 0,
    }
}

/// One resolve pass over every slot.
pub fn resolve_all(model: &Model, config: &Config) -> [SlotView; WORKSPACE_COUNT] {
    std::array::from_fn(|i| resolve(i + 1, model, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MonitorIdentity;

    fn config(show_all_outputs: bool, show_empty_workspaces: bool) -> Config {
        Config {
            show_all_outputs,
            show_empty_workspaces,
            ..Config::default()
        }
    }

    /// DP-1 instance: 1 and 2 on DP-1 with windows, 3 on DP-1 empty,
    /// 5 on HDMI-A-1 with windows, 6 unassigned with a satellite window.
    fn sample_model() -> Model {
        let mut model = Model::new(MonitorIdentity::resolved("DP-1"));
        for (n, windows, owner) in [
            (1, 2, Some("DP-1")),
            (2, 1, Some("DP-1")),
            (3, 0, Some("DP-1")),
            (5, 1, Some("HDMI-A-1")),
        ] {
            model.slots[n - 1].window_count = windows;
            model.slots[n - 1].owning_monitor = owner.map(String::from);
        }
        model.slots[5].satellite_window_count = 2;
        model
    }

    fn visible(model: &Model, cfg: &Config) -> Vec<usize> {
        resolve_all(model, cfg)
            .iter()
            .filter(|v| v.visible)
            .map(|v| v.workspace)
            .collect()
    }

    #[test]
    fn default_filters_hide_empty_and_foreign() {
        let model = sample_model();
        assert_eq!(visible(&model, &config(false, false)), vec![1, 2, 6]);
    }

    #[test]
    fn show_all_outputs_includes_foreign_workspaces() {
        let model = sample_model();
        assert_eq!(visible(&model, &config(true, false)), vec![1, 2, 5, 6]);
    }

    #[test]
    fn show_empty_includes_empty_local_and_unassigned() {
        let model = sample_model();
        assert_eq!(
            visible(&model, &config(false, true)),
            vec![1, 2, 3, 4, 6, 7, 8, 9]
        );
        assert_eq!(visible(&model, &config(true, true)), (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn active_slot_is_never_hidden() {
        let mut model = sample_model();
        for active in 1..=WORKSPACE_COUNT {
            model.local.active_workspace = Some(active);
            for cfg in [
                config(false, false),
                config(true, false),
                config(false, true),
                config(true, true),
            ] {
                assert!(resolve(active, &model, &cfg).visible, "slot {}", active);
            }
        }
    }

    #[test]
    fn foreign_active_slot_still_shown() {
        let mut model = sample_model();
        model.local.active_workspace = Some(5);
        let view = resolve(5, &model, &config(false, false));
        assert!(view.visible);
        assert_eq!(view.style, SlotStyle::Active);
    }

    #[test]
    fn style_follows_focus() {
        let mut model = sample_model();
        let cfg = config(false, false);
        assert_eq!(resolve(1, &model, &cfg).style, SlotStyle::Active);
        assert_eq!(resolve(2, &model, &cfg).style, SlotStyle::None);

        model.local.focus_here = false;
        assert_eq!(resolve(1, &model, &cfg).style, SlotStyle::Visible);
        assert_eq!(resolve(2, &model, &cfg).style, SlotStyle::None);

        model.local.active_workspace = None;
        assert!(resolve_all(&model, &cfg)
            .iter()
            .all(|v| v.style == SlotStyle::None));
    }

    #[test]
    fn empty_slots_have_no_indicator() {
        let model = sample_model();
        for view in resolve_all(&model, &config(true, true)) {
            let slot = model.slot(view.workspace);
            if slot.window_count == 0 && slot.satellite_window_count == 0 {
                assert!(view.is_empty);
                assert!(!view.show_indicator);
            }
        }
    }

    #[test]
    fn satellite_windows_make_slot_non_empty() {
        let model = sample_model();
        let view = resolve(6, &model, &config(false, false));
        assert!(view.visible);
        assert!(!view.is_empty);
        assert!(view.show_indicator);
    }

    #[test]
    fn unresolved_monitor_fails_open() {
        let mut model = sample_model();
        model.local.monitor = MonitorIdentity::unresolved();
        assert_eq!(visible(&model, &config(false, false)), vec![1, 2, 5, 6]);
    }

    #[test]
    fn hidden_slot_still_reports_emptiness() {
        let model = sample_model();
        let view = resolve(3, &model, &config(false, false));
        assert!(!view.visible);
        assert!(view.is_empty);
    }

    #[test]
    fn style_css_classes() {
        assert_eq!(SlotStyle::None.css_class(), None);
        assert_eq!(SlotStyle::Active.css_class(), Some("active"));
        assert_eq!(SlotStyle::Visible.css_class(), Some("visible"));
    }

    #[test]
    fn view_serializes_kebab_case_style() {
        let mut model = sample_model();
        model.local.focus_here = false;
        let json = serde_json::to_string(&resolve(1, &model, &config(false, false))).unwrap();
        assert_eq!(
            json,
            r#"{"workspace":1,"visible":true,"style":"visible","is_empty":false,"show_indicator":false}"#
        );
    }
}
