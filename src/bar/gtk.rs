//! GTK4 + layer-shell bar that runs on the **main thread**.
//!
//! # Widget tree
//!
//! ```text
//! window                          (layer-shell, anchored to one edge)
//! └ box#workspaces
//!     └ button.workspace          (one per slot, 1-9)
//!         └ gtk4::Overlay
//!             ├ label             (workspace number)
//!             └ label.indicator   (satellite glyph, top right)
//! ```
//!
//! # CSS selectors
//!
//! | Selector                     | Targets                                  |
//! |------------------------------|------------------------------------------|
//! | `#workspaces`                | The button row                           |
//! | `.workspace`                 | Every slot button                        |
//! | `.workspace.active`          | Active here, input focus here            |
//! | `.workspace.visible`         | Active here, input focus on another monitor |
//! | `.workspace.empty`           | No windows, satellite included           |
//! | `.workspace.has-satellite`   | Satellite workspace holds windows        |
//! | `.indicator`                 | The satellite glyph                      |
//!
//! The sync thread never touches widgets.  It posts [`redisplay`] to the
//! default main context, which runs it here; the bar itself lives in a
//! thread-local so the posted function can find it.

use crate::config::{BarPosition, Config};
use crate::fetch::resolve_identity;
use crate::hyprland::ctl::HyprlandCtl;
use crate::hyprland::events::EventStream;
use crate::model::{MonitorIdentity, WORKSPACE_COUNT};
use crate::resolver::SlotView;
use crate::sync::SyncHandle;
use crate::traits::{ControlInterface, SlotDisplay};
use gtk4::prelude::*;
use gtk4::{gdk, glib};
use gtk4_layer_shell::{Edge, KeyboardMode, Layer, LayerShell};
use log::{debug, info, warn};
use signal_hook::consts::SIGUSR1;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

//  Default CSS

const DEFAULT_CSS: &str = r#"
#workspaces {
    padding: 0 4px;
}

.workspace {
    min-width: 24px;
    padding: 0 4px;
    border-radius: 6px;
    background: none;
    color: rgba(255, 255, 255, 0.8);
}

.workspace.empty {
    color: rgba(255, 255, 255, 0.4);
}

.workspace.visible {
    background-color: rgba(255, 255, 255, 0.12);
}

.workspace.active {
    background-color: rgba(255, 255, 255, 0.25);
    box-shadow: inset 0 -2px rgba(255, 255, 255, 0.9);
}

.indicator {
    font-size: 6px;
    color: #adc8f8;
}
"#;

/// Errors that prevent the bar from starting.
#[derive(Debug, thiserror::Error)]
pub enum BarError {
    #[error("failed to initialise GTK4: {0}")]
    Gtk(#[from] glib::BoolError),
    #[error("failed to start sync thread: {0}")]
    Spawn(#[from] std::io::Error),
}

//  Slot buttons

struct SlotButton {
    button: gtk4::Button,
    indicator: gtk4::Label,
}

impl SlotButton {
    fn new(n: usize, glyph: &str, ctl: HyprlandCtl) -> Self {
        let overlay = gtk4::Overlay::new();

        let label = gtk4::Label::new(Some(&n.to_string()));
        label.set_halign(gtk4::Align::Center);
        label.set_valign(gtk4::Align::Center);
        overlay.set_child(Some(&label));

        let indicator = gtk4::Label::new(Some(glyph));
        indicator.add_css_class("indicator");
        indicator.set_halign(gtk4::Align::End);
        indicator.set_valign(gtk4::Align::Start);
        indicator.set_can_target(false);
        indicator.set_visible(false);
        overlay.add_overlay(&indicator);

        let button = gtk4::Button::new();
        button.add_css_class("workspace");
        button.set_has_frame(false);
        button.set_can_focus(false);
        button.set_child(Some(&overlay));
        button.connect_clicked(move |_| ctl.switch_workspace(n));

        Self { button, indicator }
    }

    fn apply(&self, view: &SlotView) {
        self.button.set_visible(view.visible);
        for class in ["active", "visible"] {
            set_class(&self.button, class, view.style.css_class() == Some(class));
        }
        set_class(&self.button, "empty", view.is_empty);
        set_class(&self.button, "has-satellite", view.show_indicator);
        self.indicator.set_visible(view.show_indicator);
    }
}

fn set_class(widget: &impl IsA<gtk4::Widget>, class: &str, on: bool) {
    if on {
        widget.add_css_class(class);
    } else {
        widget.remove_css_class(class);
    }
}

//  The bar

struct Bar {
    slots: Vec<SlotButton>,
    sync: SyncHandle,
    ctl: HyprlandCtl,
    config: Config,
}

impl SlotDisplay for Bar {
    fn present(&mut self, views: &[SlotView; WORKSPACE_COUNT]) {
        for (slot, view) in self.slots.iter().zip(views) {
            slot.apply(view);
        }
    }
}

thread_local! {
    static BAR: RefCell<Option<Bar>> = const { RefCell::new(None) };
}

/// Run one resolve pass and apply it to the widgets.
fn redisplay() {
    BAR.with(|bar| {
        if let Some(bar) = bar.borrow_mut().as_mut() {
            let views = bar.sync.resolve_pass(&bar.config);
            bar.present(&views);
        }
    });
}

/// Find out which monitor the mapped `window` landed on.
fn detect_monitor(window: &gtk4::Window) {
    BAR.with(|bar| {
        let bar = bar.borrow();
        let Some(bar) = bar.as_ref() else {
            return;
        };
        if bar.sync.monitor().is_resolved() {
            return;
        }
        let width = window.width();
        debug!("bar surface is {}px wide", width);
        let found = resolve_identity(
            &bar.ctl,
            None,
            &bar.config.bar.namespace,
            (width > 0).then_some(width),
        );
        match found {
            Some(name) => {
                info!("bar is on monitor {}", name);
                bar.sync.monitor().resolve(name);
                bar.sync.request_resync();
            }
            None => warn!("could not determine the bar's monitor; not filtering by monitor"),
        }
    });
}

fn find_gdk_monitor(name: &str) -> Option<gdk::Monitor> {
    let display = gdk::Display::default()?;
    let monitors = display.monitors();
    (0..monitors.n_items())
        .filter_map(|i| monitors.item(i).and_downcast::<gdk::Monitor>())
        .find(|m| m.connector().as_deref() == Some(name))
}

//  Public API

/// Run the GTK4 main loop on the **current** (main) thread until the bar
/// window is closed.
pub fn run_main_loop(
    config: Config,
    ctl: HyprlandCtl,
    stream: EventStream,
    css_path: Option<PathBuf>,
) -> Result<(), BarError> {
    gtk4::init()?;
    info!("GTK4 initialised on main thread");

    install_css(&stylesheet(css_path.as_deref(), DEFAULT_CSS));

    let monitor = match config.monitor_name_override.as_deref() {
        Some(name) if !name.is_empty() => MonitorIdentity::resolved(name),
        _ => MonitorIdentity::unresolved(),
    };

    //  Layer-shell bar window
    let window = gtk4::Window::new();
    window.init_layer_shell();
    window.set_layer(Layer::Top);
    window.set_namespace(&config.bar.namespace);
    window.set_keyboard_mode(KeyboardMode::None);
    let edge = match config.bar.position {
        BarPosition::Top => Edge::Top,
        BarPosition::Bottom => Edge::Bottom,
    };
    window.set_anchor(edge, true);
    window.set_anchor(Edge::Left, true);
    window.set_anchor(Edge::Right, true);
    window.auto_exclusive_zone_enable();
    window.set_decorated(false);

    if let Some(name) = monitor.name() {
        match find_gdk_monitor(name) {
            Some(gdk_monitor) => window.set_monitor(Some(&gdk_monitor)),
            None => warn!("monitor {} not found; letting the compositor place the bar", name),
        }
    }

    let container = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    container.set_widget_name("workspaces");
    window.set_child(Some(&container));

    let slots: Vec<SlotButton> = (1..=WORKSPACE_COUNT)
        .map(|n| {
            let slot = SlotButton::new(n, &config.bar.indicator, ctl.clone());
            container.append(&slot.button);
            slot
        })
        .collect();

    //  Sync thread
    let mut sync = SyncHandle::spawn(ctl.clone(), &config, monitor, stream, || {
        glib::MainContext::default().invoke(redisplay);
    })?;
    if let Err(e) = sync.resync_on_signal(SIGUSR1) {
        warn!("SIGUSR1 refresh unavailable: {}", e);
    }

    BAR.with(|bar| {
        *bar.borrow_mut() = Some(Bar {
            slots,
            sync,
            ctl,
            config,
        });
    });

    window.connect_map(|window| {
        let window = window.clone();
        glib::idle_add_local_once(move || detect_monitor(&window));
    });

    let main_loop = glib::MainLoop::new(None, false);
    window.connect_close_request({
        let main_loop = main_loop.clone();
        move |_| {
            main_loop.quit();
            glib::Propagation::Proceed
        }
    });

    window.present();
    // Catch up on a notification posted before the bar was in place.
    redisplay();

    info!("entering GLib main loop");
    main_loop.run();
    info!("GLib main loop exited");

    // Joins the sync thread.
    BAR.with(|bar| bar.borrow_mut().take());
    Ok(())
}

//  Styling

/// Contents of the stylesheet at `user_path`, or `fallback` when there is
/// none or it cannot be read.
fn stylesheet(user_path: Option<&Path>, fallback: &str) -> String {
    let user_css = user_path.and_then(|path| match std::fs::read_to_string(path) {
        Ok(css) => {
            info!("styling from {}", path.display());
            Some(css)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!("cannot read {}: {}", path.display(), e);
            None
        }
    });
    user_css.unwrap_or_else(|| fallback.to_string())
}

fn install_css(css: &str) {
    let provider = gtk4::CssProvider::new();
    #[allow(deprecated)]
    provider.load_from_data(css);

    match gdk::Display::default() {
        Some(display) => gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        ),
        None => warn!("no display to style"),
    }
}
