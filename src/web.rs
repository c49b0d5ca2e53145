//! Browser binding
//!
//! Expected markup inside the container:
//! - `[data-reveal-panel]`: the floating video card (optional, hidden on small screens)
//! - `[data-fragment="key"]`: collision-aware words
//! - `[data-particle-layer]`: where particle dots are created (defaults to the container)
//! - `[data-beam-layer]`: where light beams are created (defaults to the particle layer)
//!
//! Anywhere in the document, optionally:
//! - `[data-dock]` holding `[data-dock-icon]` children: the magnifying navbar
//!
//! One requestAnimationFrame loop runs while the field is mounted. It always
//! draws the float, beams and dock from the rAF clock; the physics tick (and
//! every layout read it needs) only runs while the pointer is over the
//! container.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, EventTarget, HtmlElement, MouseEvent};

use crate::Settings;
use crate::consts::FRAME_DT;
use crate::sim::{
    BeamTone, Dock, FieldState, FrameLoop, FrameOutcome, HighlightChange, Rect, StaticLayout,
};

/// Class toggled on fragments under the panel
const HIGHLIGHT_CLASS: &str = "highlighted";

type Listener = Closure<dyn FnMut(MouseEvent)>;

fn dom_rect(el: &Element) -> Rect {
    let r = el.get_bounding_client_rect();
    Rect::new(
        r.left() as f32,
        r.right() as f32,
        r.top() as f32,
        r.bottom() as f32,
    )
}

fn set_style(el: &HtmlElement, property: &str, value: &str) {
    let _ = el.style().set_property(property, value);
}

fn query_html(root: &Element, selector: &str) -> Vec<HtmlElement> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
        .collect()
}

/// Navbar icons and their magnification springs
struct DockBar {
    dock: Dock,
    root: HtmlElement,
    icons: Vec<HtmlElement>,
}

impl DockBar {
    fn measure(&self) -> Vec<Option<Rect>> {
        self.icons
            .iter()
            .map(|el| el.is_connected().then(|| dom_rect(el)))
            .collect()
    }

    fn render(&self) {
        for (el, icon) in self.icons.iter().zip(self.dock.icons()) {
            set_style(el, "width", &format!("{}px", icon.width()));
            set_style(el, "height", &format!("{}px", icon.height()));
        }
    }
}

struct App {
    state: FieldState,
    frames: FrameLoop,
    container: Element,
    panel: Option<HtmlElement>,
    fragments: Vec<(String, Element)>,
    dots: Vec<HtmlElement>,
    beams: Vec<HtmlElement>,
    dock: Option<DockBar>,
    /// Attached listeners, removed on destroy
    listeners: Vec<(EventTarget, &'static str, Listener)>,
    /// rAF timestamp of the first frame
    origin_ms: Option<f64>,
    /// Seconds on the rAF clock at the last drawn frame
    wall_time: f32,
    /// A requestAnimationFrame callback is pending
    scheduled: bool,
}

impl App {
    /// Snapshot the live layout for this frame
    fn measure(&self) -> StaticLayout {
        let container = dom_rect(&self.container);
        if container.is_empty() {
            return StaticLayout::unmounted();
        }

        let mut layout = StaticLayout::new(Vec2::new(container.width(), container.height()));
        layout.obstacle_mounted = self
            .panel
            .as_ref()
            .is_some_and(|p| p.is_connected() && p.offset_width() > 0);
        for (key, el) in &self.fragments {
            if el.is_connected() {
                layout.set_fragment(key.clone(), dom_rect(el).relative_to(&container));
            }
        }
        layout
    }

    fn apply_changes(&self, changes: &[HighlightChange]) {
        for change in changes {
            let Some((_, el)) = self.fragments.iter().find(|(k, _)| *k == change.key) else {
                continue;
            };
            let classes = el.class_list();
            let _ = if change.highlighted {
                classes.add_1(HIGHLIGHT_CLASS)
            } else {
                classes.remove_1(HIGHLIGHT_CLASS)
            };
        }
    }

    /// Advance everything owed for the rAF timestamp `now_ms`
    ///
    /// Returns true while anything still needs another frame.
    fn step(&mut self, now_ms: f64) -> bool {
        let origin = *self.origin_ms.get_or_insert(now_ms);
        self.wall_time = ((now_ms - origin) / 1000.0) as f32;

        let mut busy = self.state.has_ambient_motion();
        if self.frames.is_active() {
            let layout = self.measure();
            let report = self.frames.frame(now_ms, &mut self.state, &layout);
            self.apply_changes(&report.changes);
            busy |= report.outcome == FrameOutcome::Continue;
        } else {
            busy |= !self.state.settle_display(FRAME_DT);
        }

        if let Some(bar) = self.dock.as_mut() {
            let bounds = bar.measure();
            bar.dock.step(&bounds, FRAME_DT);
            busy |= !bar.dock.is_settled();
        }
        busy
    }

    fn render(&self) {
        if let Some(panel) = &self.panel {
            let pos = self.state.smoothed();
            let hovered = self.state.is_hovered();
            let scale = if hovered { 1.0 } else { 0.8 };
            set_style(
                panel,
                "transform",
                &format!("translate({}px, {}px) scale({})", pos.x, pos.y, scale),
            );
            set_style(panel, "opacity", if hovered { "1" } else { "0" });
        }

        for (dot, view) in self.dots.iter().zip(self.state.particle_views(self.wall_time)) {
            let offset = view.display_offset + Vec2::new(0.0, view.float_dy);
            set_style(
                dot,
                "transform",
                &format!("translate({}px, {}px)", offset.x, offset.y),
            );
            set_style(dot, "opacity", &view.opacity.to_string());
        }

        for (el, beam) in self.beams.iter().zip(self.state.beam_frames(self.wall_time)) {
            set_style(el, "transform", &format!("translateX({}%)", beam.x_percent));
            set_style(el, "opacity", &beam.opacity.to_string());
        }

        if let Some(bar) = &self.dock {
            bar.render();
        }
    }
}

fn request_frame(app: Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    app.borrow_mut().scheduled = true;
    let closure = Closure::once(move |time: f64| {
        run_frame(app, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

/// Schedule a frame unless one is pending or the field is gone
fn wake(app: &Rc<RefCell<App>>) {
    let idle = {
        let a = app.borrow();
        a.frames.is_mounted() && !a.scheduled
    };
    if idle {
        request_frame(app.clone());
    }
}

fn run_frame(app: Rc<RefCell<App>>, time: f64) {
    let keep_going = {
        let mut a = app.borrow_mut();
        a.scheduled = false;
        // Destroyed while this callback was pending
        if !a.frames.is_mounted() {
            return;
        }
        let busy = a.step(time);
        a.render();
        busy
    };

    if keep_going {
        request_frame(app);
    }
}

fn create_dots(document: &Document, layer: &Element, state: &FieldState) -> Vec<HtmlElement> {
    let mut dots = Vec::with_capacity(state.particles().len());
    for particle in state.particles() {
        let Ok(el) = document.create_element("div") else {
            continue;
        };
        let Ok(dot) = el.dyn_into::<HtmlElement>() else {
            continue;
        };
        dot.set_class_name("reveal-particle");
        let base = particle.base_percent();
        set_style(&dot, "position", "absolute");
        set_style(&dot, "left", &format!("{}%", base.x));
        set_style(&dot, "top", &format!("{}%", base.y));
        set_style(&dot, "width", &format!("{}px", particle.size()));
        set_style(&dot, "height", &format!("{}px", particle.size()));
        if layer.append_child(&dot).is_ok() {
            dots.push(dot);
        }
    }
    dots
}

fn create_beams(document: &Document, layer: &Element, state: &FieldState) -> Vec<HtmlElement> {
    let mut beams = Vec::new();
    for frame in state.beam_frames(0.0) {
        let Some(beam) = document
            .create_element("div")
            .ok()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            continue;
        };
        beam.set_class_name(match frame.tone {
            BeamTone::Primary => "reveal-beam reveal-beam--primary",
            BeamTone::Secondary => "reveal-beam reveal-beam--secondary",
        });
        set_style(&beam, "position", "absolute");
        set_style(&beam, "top", "0");
        set_style(&beam, "height", "100%");
        set_style(&beam, "left", &format!("{}%", frame.left_percent));
        set_style(&beam, "opacity", "0");
        if layer.append_child(&beam).is_ok() {
            beams.push(beam);
        }
    }
    beams
}

fn collect_fragments(container: &Element) -> Vec<(String, Element)> {
    let mut fragments = Vec::new();
    let Ok(nodes) = container.query_selector_all("[data-fragment]") else {
        return fragments;
    };
    for i in 0..nodes.length() {
        let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        if let Some(key) = el.get_attribute("data-fragment") {
            fragments.push((key, el));
        }
    }
    fragments
}

fn find_dock(document: &Document, state: &FieldState) -> Option<DockBar> {
    let root = document
        .query_selector("[data-dock]")
        .ok()
        .flatten()?
        .dyn_into::<HtmlElement>()
        .ok()?;
    let icons = query_html(&root, "[data-dock-icon]");
    if icons.is_empty() {
        return None;
    }
    Some(DockBar {
        dock: Dock::new(icons.len(), state.settings().dock_spring),
        root,
        icons,
    })
}

fn listen<F>(
    target: &EventTarget,
    event: &'static str,
    handler: F,
) -> Option<(EventTarget, &'static str, Listener)>
where
    F: FnMut(MouseEvent) + 'static,
{
    let closure = Listener::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .ok()?;
    Some((target.clone(), event, closure))
}

fn wire_events(app: &Rc<RefCell<App>>) -> Vec<(EventTarget, &'static str, Listener)> {
    let (container, dock_root) = {
        let a = app.borrow();
        (a.container.clone(), a.dock.as_ref().map(|bar| bar.root.clone()))
    };
    let mut listeners = Vec::new();

    let handle = app.clone();
    listeners.extend(listen(&container, "mouseenter", move |_event| {
        let started = {
            let mut guard = handle.borrow_mut();
            let a = &mut *guard;
            a.frames.pointer_enter(&mut a.state)
        };
        if started {
            wake(&handle);
        }
    }));

    let handle = app.clone();
    listeners.extend(listen(&container, "mousemove", move |event| {
        let mut a = handle.borrow_mut();
        if !a.frames.is_mounted() {
            return;
        }
        let origin = dom_rect(&a.container);
        let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        a.frames
            .pointer_move(client - Vec2::new(origin.left, origin.top));
    }));

    let handle = app.clone();
    listeners.extend(listen(&container, "mouseleave", move |_event| {
        {
            let mut guard = handle.borrow_mut();
            let a = &mut *guard;
            if !a.frames.is_mounted() {
                return;
            }
            let changes = a.frames.pointer_leave(&mut a.state);
            a.apply_changes(&changes);
        }
        // Particles still have to glide back
        wake(&handle);
    }));

    if let Some(root) = dock_root {
        let handle = app.clone();
        listeners.extend(listen(&root, "mousemove", move |event| {
            if let Some(bar) = handle.borrow_mut().dock.as_mut() {
                bar.dock.pointer_move(event.client_x() as f32);
            }
            wake(&handle);
        }));

        let handle = app.clone();
        listeners.extend(listen(&root, "mouseleave", move |_event| {
            if let Some(bar) = handle.borrow_mut().dock.as_mut() {
                bar.dock.pointer_leave();
            }
            wake(&handle);
        }));
    }

    listeners
}

/// Handle to a running field
#[wasm_bindgen]
pub struct RevealField {
    app: Rc<RefCell<App>>,
}

#[wasm_bindgen]
impl RevealField {
    /// Attach to the element with id `container_id`
    #[wasm_bindgen(constructor)]
    pub fn new(container_id: &str) -> Result<RevealField, JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let container = document
            .get_element_by_id(container_id)
            .ok_or_else(|| JsValue::from_str("container not found"))?;

        let mut state = FieldState::new(Settings::load());
        let fragments = collect_fragments(&container);
        for (key, _) in &fragments {
            state.register_fragment(key.clone());
        }

        let panel = container
            .query_selector("[data-reveal-panel]")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        let layer = container
            .query_selector("[data-particle-layer]")
            .ok()
            .flatten()
            .unwrap_or_else(|| container.clone());
        let beam_layer = container
            .query_selector("[data-beam-layer]")
            .ok()
            .flatten()
            .unwrap_or_else(|| layer.clone());
        let beams = create_beams(&document, &beam_layer, &state);
        let dots = create_dots(&document, &layer, &state);
        let dock = find_dock(&document, &state);

        log::info!(
            "Reveal field attached: {} particles, {} fragments, {} beams, panel {}, dock {}",
            dots.len(),
            fragments.len(),
            beams.len(),
            if panel.is_some() { "found" } else { "missing" },
            dock.as_ref().map_or(0, |bar| bar.icons.len())
        );

        let app = Rc::new(RefCell::new(App {
            state,
            frames: FrameLoop::new(),
            container,
            panel,
            fragments,
            dots,
            beams,
            dock,
            listeners: Vec::new(),
            origin_ms: None,
            wall_time: 0.0,
            scheduled: false,
        }));
        let listeners = wire_events(&app);
        app.borrow_mut().listeners = listeners;
        app.borrow().render();
        wake(&app);

        Ok(RevealField { app })
    }

    /// Start tracking a word added after construction
    pub fn register_fragment(&self, key: &str, element: Element) {
        let mut a = self.app.borrow_mut();
        if a.state.register_fragment(key) {
            a.fragments.push((key.to_owned(), element));
        }
    }

    pub fn deregister_fragment(&self, key: &str) {
        let mut a = self.app.borrow_mut();
        let changes = a.state.deregister_fragment(key);
        a.apply_changes(&changes);
        a.fragments.retain(|(k, _)| k != key);
    }

    /// Current frame as JSON
    pub fn snapshot(&self) -> Result<String, JsValue> {
        let a = self.app.borrow();
        serde_json::to_string(&a.state.snapshot(a.wall_time))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Stop the loop for good and detach every listener
    pub fn destroy(&self) {
        let listeners = {
            let mut a = self.app.borrow_mut();
            if !a.frames.is_mounted() {
                return;
            }
            a.frames.unmount();
            for dot in a.dots.drain(..) {
                dot.remove();
            }
            for beam in a.beams.drain(..) {
                beam.remove();
            }
            std::mem::take(&mut a.listeners)
        };
        for (target, event, closure) in &listeners {
            let _ = target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
        log::info!("Reveal field destroyed");
    }
}
