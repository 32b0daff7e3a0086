//! Shared test fixtures.
//!
//! `TestPoolBuilder` wires a pool to in-memory stores the test keeps handles
//! to, so persisted state can be inspected or handed to a second pool.

#![allow(dead_code)]

use floating_viewer::geometry::{Point, Size};
use floating_viewer::layout::{LayoutManager, SharedLayouts, SlotPatch, SlotPosition, SlotSize};
use floating_viewer::pool::{OpenTrigger, RenderCommand, ViewerPool};
use floating_viewer::settings::Settings;
use floating_viewer::storage::{LayoutStore, MemoryStore, SessionStore};
use floating_viewer::viewer::{InstanceKey, PointerKind, PointerTarget, ViewerInput};

pub const VIEWPORT: Size = Size::new(1000.0, 800.0);

/// A pool plus the stores behind it.
pub struct TestPool {
    pub pool: ViewerPool,
    pub layouts: SharedLayouts,
    pub session_backend: MemoryStore,
    pub registry_backend: MemoryStore,
}

impl TestPool {
    /// Open `url` as an avatar and report it loaded at `natural` size.
    pub fn open_loaded(&mut self, url: &str, natural: Size) -> InstanceKey {
        let key = self
            .pool
            .handle_trigger(OpenTrigger::avatar(url))
            .expect("trigger accepted")
            .expect("trigger intercepted");
        self.pool.image_loaded(key, natural).expect("image loaded");
        key
    }

    /// Drag a viewer by `delta` pixels from its current top-left corner.
    pub fn drag_by(&mut self, key: InstanceKey, delta: Point) {
        let start = self.pool.viewer(key).expect("viewer open").frame().origin();
        let to = start.offset(delta);
        self.pool
            .handle_input(key, pointer_down(start, PointerTarget::Image))
            .unwrap();
        self.pool
            .handle_input(key, ViewerInput::PointerMove { pos: to })
            .unwrap();
        self.pool.handle_input(key, ViewerInput::PointerUp).unwrap();
    }

    /// A second pool over the same stores, as after a page reload.
    pub fn reopen(&self, settings: Settings) -> ViewerPool {
        let layouts = LayoutManager::new(LayoutStore::new(Box::new(self.registry_backend.clone())));
        let mut pool = ViewerPool::new(
            settings,
            layouts.into_shared(),
            SessionStore::new(Box::new(self.session_backend.clone())),
            VIEWPORT,
        );
        pool.set_template_ready(true);
        pool
    }
}

pub struct TestPoolBuilder {
    settings: Settings,
    viewport: Size,
    slots: Option<Vec<(SlotPosition, SlotSize)>>,
    template_ready: bool,
}

impl TestPoolBuilder {
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            viewport: VIEWPORT,
            slots: None,
            template_ready: true,
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn multi_image(mut self, max_instances: u32) -> Self {
        self.settings.multi_image = true;
        self.settings.max_instances = max_instances;
        self
    }

    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Create and activate a layout with one slot per entry, in order.
    pub fn with_layout(mut self, slots: &[(SlotPosition, SlotSize)]) -> Self {
        self.slots = Some(slots.to_vec());
        self
    }

    pub fn without_template(mut self) -> Self {
        self.template_ready = false;
        self
    }

    pub fn build(mut self) -> TestPool {
        let session_backend = MemoryStore::new();
        let registry_backend = MemoryStore::new();
        let mut manager = LayoutManager::new(LayoutStore::new(Box::new(registry_backend.clone())));

        if let Some(slots) = &self.slots {
            let id = manager.create_layout("Test Layout");
            for _ in 1..slots.len() {
                manager.add_slot(&id, slots.len() as u32).unwrap();
            }
            for (index, (position, size)) in slots.iter().enumerate() {
                manager
                    .update_slot(&id, index as u32 + 1, SlotPatch::geometry(*position, *size))
                    .unwrap();
            }
            self.settings.layout_enabled = true;
            self.settings.active_layout_id = Some(id);
        }

        let layouts = manager.into_shared();
        let mut pool = ViewerPool::new(
            self.settings,
            layouts.clone(),
            SessionStore::new(Box::new(session_backend.clone())),
            self.viewport,
        );
        pool.set_template_ready(self.template_ready);

        TestPool {
            pool,
            layouts,
            session_backend,
            registry_backend,
        }
    }
}

impl Default for TestPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn pointer_down(pos: Point, target: PointerTarget) -> ViewerInput {
    ViewerInput::PointerDown {
        pos,
        target,
        kind: PointerKind::Mouse,
    }
}

/// Names of the commands addressed to `key`, in emission order.
pub fn command_names(commands: &[RenderCommand], key: InstanceKey) -> Vec<&'static str> {
    commands
        .iter()
        .filter(|command| command.key() == key)
        .map(|command| match command {
            RenderCommand::Mount { .. } => "mount",
            RenderCommand::LoadImage { .. } => "load_image",
            RenderCommand::Bind { .. } => "bind",
            RenderCommand::Apply { .. } => "apply",
            RenderCommand::BeginClose { .. } => "begin_close",
            RenderCommand::Unbind { .. } => "unbind",
            RenderCommand::Unmount { .. } => "unmount",
        })
        .collect()
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}
