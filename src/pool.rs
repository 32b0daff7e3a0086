//! Viewer pool - the session coordinator.
//!
//! Owns every open viewer and is the only thing that mutates the active list.
//! Responsibilities:
//! - admission: intercept checks, eviction, smallest-free viewer id
//! - focus and keyboard dismissal
//! - z-index tiering against host panels
//! - batching of host DOM events into one processing pass
//! - the render-command and notice outboxes drained by the host

use crate::constants::{CLOSE_FADE_MS, COARSE_POINTER_SIZE_PERCENT, Z_TIER_HIGH, Z_TIER_LOW, Z_TIER_SPAN};
use crate::error::{ViewerError, ViewerResult};
use crate::geometry::{ObjectFit, Rect, Size};
use crate::layout::{Borders, SharedLayouts};
use crate::notifications::{Notice, NoticeQueue};
use crate::settings::Settings;
use crate::spatial_index::SpatialIndex;
use crate::storage::{LockRegistry, SessionStore};
use crate::viewer::{
    InputResponse, InstanceKey, InteractionContext, Placement, PlacementRequest, ViewerInput,
    ViewerInstance, compute_placement,
};
use serde::Serialize;
use std::fmt;
use tracing::{debug, error, info, warn};

// ============================================================================
// Inbound events
// ============================================================================

/// Host UI action that would normally open the host's own image popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerKind {
    AvatarOpened,
    GalleryOpened,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTrigger {
    pub kind: TriggerKind,
    pub image_url: String,
}

impl OpenTrigger {
    pub fn avatar(image_url: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::AvatarOpened,
            image_url: image_url.into(),
        }
    }

    pub fn gallery(image_url: impl Into<String>) -> Self {
        Self {
            kind: TriggerKind::GalleryOpened,
            image_url: image_url.into(),
        }
    }
}

/// Primary pointing device of the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerProfile {
    #[default]
    Fine,
    /// Touch-first device
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// DOM observations waiting for the next processing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Trigger(OpenTrigger),
    /// Whether any host panel (drawer, settings, etc.) is open
    PanelVisibility(bool),
}

/// Queue of host events. The host schedules one processing pass per batch.
#[derive(Debug, Clone, Default)]
pub struct HostEventBatch {
    pending: Vec<HostEvent>,
    scheduled: bool,
}

impl HostEventBatch {
    /// Queue an event. Returns `true` when the host must schedule a pass.
    pub fn enqueue(&mut self, event: HostEvent) -> bool {
        self.pending.push(event);
        !std::mem::replace(&mut self.scheduled, true)
    }

    pub fn take(&mut self) -> Vec<HostEvent> {
        self.scheduled = false;
        std::mem::take(&mut self.pending)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

// ============================================================================
// Outbound commands
// ============================================================================

/// Everything the render target needs to draw one viewer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerStyle {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub image_width: f64,
    pub image_height: f64,
    pub object_fit: ObjectFit,
    pub zoom_level: f64,
    pub pan_x: f64,
    pub pan_y: f64,
    pub minimized: bool,
    pub locked: bool,
    pub borders: Option<Borders>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum RenderCommand {
    /// Create a viewer element from the template
    Mount { key: InstanceKey, viewer_id: u32 },
    LoadImage { key: InstanceKey, url: String },
    /// Attach input listeners (touch listeners on coarse-pointer devices)
    Bind { key: InstanceKey, touch: bool },
    Apply { key: InstanceKey, style: ViewerStyle },
    /// Start the fade-out, then report back through `finish_close`. The
    /// viewer stays in the closing set until then, or until the host calls
    /// `dispose_closing`.
    BeginClose { key: InstanceKey, fade_ms: u64 },
    /// Release every listener bound for this viewer
    Unbind { key: InstanceKey },
    Unmount { key: InstanceKey },
}

impl RenderCommand {
    pub fn key(&self) -> InstanceKey {
        match self {
            Self::Mount { key, .. }
            | Self::LoadImage { key, .. }
            | Self::Bind { key, .. }
            | Self::Apply { key, .. }
            | Self::BeginClose { key, .. }
            | Self::Unbind { key }
            | Self::Unmount { key } => *key,
        }
    }
}

// ============================================================================
// Pool
// ============================================================================

pub struct ViewerPool {
    settings: Settings,
    layouts: SharedLayouts,
    session: SessionStore,
    locks: LockRegistry,
    /// Open viewers, oldest first
    active: Vec<ViewerInstance>,
    /// Viewers fading out, waiting for `finish_close`
    closing: Vec<ViewerInstance>,
    index: SpatialIndex,
    focused: Option<InstanceKey>,
    next_key: u64,
    viewport: Size,
    pointer: PointerProfile,
    template_ready: bool,
    host_panel_open: bool,
    host_events: HostEventBatch,
    commands: Vec<RenderCommand>,
    notices: NoticeQueue,
}

impl ViewerPool {
    /// Until the host reports the template as ready, intercepted triggers
    /// fail with [`ViewerError::ResourceMissing`].
    pub fn new(settings: Settings, layouts: SharedLayouts, session: SessionStore, viewport: Size) -> Self {
        let locks = LockRegistry::load(&session);
        let pool = Self {
            settings: settings.validated(),
            layouts,
            session,
            locks,
            active: Vec::new(),
            closing: Vec::new(),
            index: SpatialIndex::new(),
            focused: None,
            next_key: 1,
            viewport,
            pointer: PointerProfile::default(),
            template_ready: false,
            host_panel_open: false,
            host_events: HostEventBatch::default(),
            commands: Vec::new(),
            notices: NoticeQueue::new(),
        };
        pool.sync_active_layout();
        pool
    }

    // ==================== Host State ====================

    pub fn set_template_ready(&mut self, ready: bool) {
        self.template_ready = ready;
    }

    pub fn set_pointer_profile(&mut self, profile: PointerProfile) {
        self.pointer = profile;
    }

    /// Take a new settings snapshot and re-place open viewers.
    pub fn apply_settings(&mut self, settings: Settings) {
        self.settings = settings.validated();
        self.sync_active_layout();

        let keep = if self.settings.multi_image {
            self.effective_max_instances() as usize
        } else {
            1
        };
        while self.active.len() > keep {
            self.close_at(0);
        }
        self.replace_all();
        debug!(active = self.active.len(), "Applied settings");
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.replace_all();
    }

    /// Reconcile z-index tiers with host panel visibility.
    pub fn set_host_panel_open(&mut self, open: bool) {
        if open == self.host_panel_open {
            return;
        }
        self.host_panel_open = open;
        debug!(open, "Host panel visibility changed");
        for pos in 0..self.active.len() {
            if self.active[pos].lifecycle().is_interactive() {
                self.emit_apply(pos);
            }
        }
    }

    /// Queue a host event. Returns `true` when the host must schedule a
    /// call to [`ViewerPool::flush_host_events`].
    pub fn enqueue_host_event(&mut self, event: HostEvent) -> bool {
        self.host_events.enqueue(event)
    }

    /// Process every queued host event in one pass. Panel visibility reports
    /// collapse to the latest one. Returns the keys of viewers admitted.
    pub fn flush_host_events(&mut self) -> Vec<InstanceKey> {
        let events = self.host_events.take();
        let mut panel_open = None;
        let mut opened = Vec::new();
        for event in events {
            match event {
                HostEvent::Trigger(trigger) => match self.handle_trigger(trigger) {
                    Ok(Some(key)) => opened.push(key),
                    Ok(None) => {}
                    Err(e) => debug!(error = %e, "Trigger rejected"),
                },
                HostEvent::PanelVisibility(open) => panel_open = Some(open),
            }
        }
        if let Some(open) = panel_open {
            self.set_host_panel_open(open);
        }
        opened
    }

    // ==================== Admission ====================

    /// Slot count of the active layout, or the configured maximum.
    pub fn effective_max_instances(&self) -> u32 {
        if !self.settings.layout_enabled {
            return self.settings.max_instances;
        }
        self.layouts
            .read()
            .active_layout()
            .map(|layout| layout.slots.len() as u32)
            .unwrap_or(self.settings.max_instances)
    }

    /// Open a viewer for an intercepted trigger.
    ///
    /// Returns `Ok(None)` when the trigger is not intercepted and the host
    /// should fall through to its own popup.
    pub fn handle_trigger(&mut self, trigger: OpenTrigger) -> ViewerResult<Option<InstanceKey>> {
        if !self.settings.intercepts(trigger.kind) {
            debug!(kind = ?trigger.kind, "Trigger not intercepted");
            return Ok(None);
        }
        if !self.template_ready {
            error!("Viewer template not available");
            self.notices.push(Notice::error("Image viewer is not ready"));
            return Err(ViewerError::ResourceMissing);
        }

        let max = self.effective_max_instances();
        if self.settings.multi_image {
            while !self.active.is_empty() && self.active.len() >= max as usize {
                self.close_at(0);
            }
        } else {
            self.close_all();
        }

        let Some(viewer_id) = (1..=max).find(|id| !self.active.iter().any(|v| v.viewer_id() == *id))
        else {
            warn!(max, "No free viewer id");
            self.notices
                .push(Notice::warning(format!("Maximum of {max} viewers reached")));
            return Err(ViewerError::CapacityExceeded { max });
        };

        let key = InstanceKey(self.next_key);
        self.next_key += 1;
        let locked = self.locks.is_locked(viewer_id);
        let url = trigger.image_url;
        self.active
            .push(ViewerInstance::new(key, viewer_id, url.clone(), locked));
        self.focused = Some(key);

        self.commands.push(RenderCommand::Mount { key, viewer_id });
        self.commands.push(RenderCommand::LoadImage { key, url });
        self.commands.push(RenderCommand::Bind {
            key,
            touch: self.pointer == PointerProfile::Coarse,
        });
        info!(%key, viewer_id, locked, "Opened viewer");
        Ok(Some(key))
    }

    /// Natural image dimensions arrived. Results for viewers closed while
    /// loading are ignored.
    pub fn image_loaded(&mut self, key: InstanceKey, natural: Size) -> ViewerResult<()> {
        let Some(pos) = self.position(key) else {
            debug!(%key, "Ignoring load result for closed viewer");
            return Ok(());
        };
        if natural.aspect_ratio().is_none() {
            return self.image_failed(key, "image has no dimensions");
        }

        let placement = self.placement_for(self.active[pos].viewer_id(), natural);
        let viewer = &mut self.active[pos];
        viewer.on_loaded(natural, placement);
        self.index.upsert(viewer.viewer_id(), viewer.visible_frame());
        self.emit_apply(pos);
        Ok(())
    }

    /// Tear down a viewer whose image failed to load. Nothing is persisted.
    /// Returns [`ViewerError::LoadFailed`] unless the key was already stale.
    pub fn image_failed(&mut self, key: InstanceKey, reason: &str) -> ViewerResult<()> {
        let Some(pos) = self.position(key) else {
            debug!(%key, "Ignoring load failure for closed viewer");
            return Ok(());
        };
        let mut viewer = self.active.remove(pos);
        viewer.dispose();
        self.index.remove(viewer.viewer_id());
        error!(%key, url = viewer.image_url(), reason, "Failed to load image");

        self.commands.push(RenderCommand::Unbind { key });
        self.commands.push(RenderCommand::Unmount { key });
        self.notices.push(Notice::error("Failed to load image"));
        self.refocus_after_removal(key);
        Err(ViewerError::LoadFailed(reason.to_string()))
    }

    // ==================== Interaction ====================

    pub fn handle_input(&mut self, key: InstanceKey, input: ViewerInput) -> ViewerResult<InputResponse> {
        let pos = self.require(key)?;
        if input.takes_focus() {
            self.focused = Some(key);
        }

        let ctx = InteractionContext {
            settings: &self.settings,
            viewport: self.viewport,
            others: &self.index,
            prevent_overlap: self.prevent_overlap(),
        };
        let response = self.active[pos].handle_input(input, &ctx);

        if response.frame_changed {
            let viewer = &self.active[pos];
            self.index.upsert(viewer.viewer_id(), viewer.visible_frame());
        }
        if response.changed() {
            self.emit_apply(pos);
        }
        Ok(response)
    }

    /// Flip the lock on a viewer. The lock is stored per viewer id.
    pub fn toggle_lock(&mut self, key: InstanceKey) -> ViewerResult<bool> {
        let pos = self.require(key)?;
        let viewer = &mut self.active[pos];
        let locked = !viewer.is_locked();
        viewer.set_locked(locked);
        self.locks
            .set_locked(viewer.viewer_id(), locked, &mut self.session);
        debug!(%key, locked, "Toggled lock");
        self.emit_apply(pos);
        Ok(locked)
    }

    pub fn toggle_minimize(&mut self, key: InstanceKey) -> ViewerResult<bool> {
        let pos = self.require(key)?;
        let viewer = &mut self.active[pos];
        let minimized = viewer.toggle_minimize(self.viewport);
        if viewer.lifecycle().is_interactive() {
            self.index.upsert(viewer.viewer_id(), viewer.visible_frame());
        }
        self.emit_apply(pos);
        Ok(minimized)
    }

    /// Dismiss the focused viewer on Escape. Returns whether one was closed.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match (key, self.focused) {
            (Key::Escape, Some(focused)) => self.close(focused).is_ok(),
            _ => false,
        }
    }

    // ==================== Closing ====================

    /// Remember the viewer's geometry (when enabled) and start its fade-out.
    pub fn close(&mut self, key: InstanceKey) -> ViewerResult<()> {
        let pos = self.require(key)?;
        self.close_at(pos);
        Ok(())
    }

    /// The fade-out finished: unmount the viewer.
    pub fn finish_close(&mut self, key: InstanceKey) -> ViewerResult<()> {
        let pos = self
            .closing
            .iter()
            .position(|v| v.key() == key)
            .ok_or(ViewerError::UnknownInstance(key.0))?;
        let mut viewer = self.closing.remove(pos);
        viewer.dispose();
        self.commands.push(RenderCommand::Unmount { key });
        debug!(%key, "Viewer disposed");
        Ok(())
    }

    /// Unmount every viewer still fading out. For hosts tearing down without
    /// waiting on fade callbacks.
    pub fn dispose_closing(&mut self) -> usize {
        let count = self.closing.len();
        for mut viewer in self.closing.drain(..) {
            viewer.dispose();
            self.commands.push(RenderCommand::Unmount { key: viewer.key() });
        }
        if count > 0 {
            debug!(count, "Disposed fading viewers");
        }
        count
    }

    pub fn close_all(&mut self) {
        while !self.active.is_empty() {
            self.close_at(0);
        }
    }

    fn close_at(&mut self, pos: usize) {
        let mut viewer = self.active.remove(pos);
        let key = viewer.key();
        if viewer.lifecycle().is_interactive() {
            self.remember_geometry(&viewer);
        }
        viewer.begin_close();
        self.index.remove(viewer.viewer_id());

        self.commands.push(RenderCommand::BeginClose {
            key,
            fade_ms: CLOSE_FADE_MS,
        });
        self.commands.push(RenderCommand::Unbind { key });
        info!(%key, viewer_id = viewer.viewer_id(), "Closing viewer");
        self.closing.push(viewer);
        self.refocus_after_removal(key);
    }

    fn remember_geometry(&mut self, viewer: &ViewerInstance) {
        if !self.settings.remember_position {
            return;
        }
        let rect = viewer.frame();
        if self.settings.remember_layout {
            self.session.save_layout_position(viewer.viewer_id(), rect);
        } else {
            self.session.save_last_position(rect);
        }
    }

    fn refocus_after_removal(&mut self, removed: InstanceKey) {
        if self.focused == Some(removed) {
            self.focused = self.active.last().map(ViewerInstance::key);
        }
    }

    // ==================== Placement ====================

    fn sync_active_layout(&self) {
        let target = if self.settings.layout_enabled {
            self.settings.active_layout_id.as_deref()
        } else {
            None
        };
        self.layouts.write().set_active_layout(target);
    }

    fn prevent_overlap(&self) -> bool {
        if self.settings.prevent_overlap {
            return true;
        }
        self.settings.layout_enabled
            && self
                .layouts
                .read()
                .active_layout()
                .is_some_and(|layout| layout.collision_settings.prevent_overlap)
    }

    fn size_percent(&self) -> f64 {
        match self.pointer {
            PointerProfile::Fine => self.settings.default_size,
            PointerProfile::Coarse => COARSE_POINTER_SIZE_PERCENT,
        }
    }

    fn remembered_geometry(&self, viewer_id: u32) -> Option<Rect> {
        if !self.settings.remember_position {
            return None;
        }
        if self.settings.remember_layout {
            self.session.layout_position(viewer_id)
        } else {
            self.session.last_position()
        }
    }

    fn placement_for(&self, viewer_id: u32, natural: Size) -> Placement {
        let layouts = self.layouts.read();
        let enabled = self.settings.layout_enabled;
        let config = layouts
            .get_viewer_config(viewer_id, self.viewport)
            .filter(|_| enabled);
        let prevent_offscreen = layouts
            .active_layout()
            .filter(|_| enabled)
            .map_or(true, |layout| layout.collision_settings.prevent_offscreen);
        let remembered = match config {
            Some(_) => None,
            None => self.remembered_geometry(viewer_id),
        };

        compute_placement(&PlacementRequest {
            viewer_id,
            natural,
            viewport: self.viewport,
            slot: config.as_ref(),
            fit_mode: self.settings.fit_mode,
            prevent_offscreen,
            size_percent: self.size_percent(),
            remembered,
        })
    }

    /// Re-place slot-governed viewers and clamp free ones into the viewport.
    fn replace_all(&mut self) {
        for pos in 0..self.active.len() {
            let viewer = &self.active[pos];
            let Some(natural) = viewer.natural() else {
                continue;
            };
            let viewer_id = viewer.viewer_id();
            let has_slot = self.settings.layout_enabled
                && self.layouts.read().get_slot_for_viewer(viewer_id).is_some();

            if has_slot || viewer.is_slotted() {
                let placement = self.placement_for(viewer_id, natural);
                let free_pan = self.settings.free_pan;
                self.active[pos].apply_placement(placement, free_pan);
            } else {
                self.active[pos].clamp_into(self.viewport);
            }
            self.index
                .upsert(viewer_id, self.active[pos].visible_frame());
            self.emit_apply(pos);
        }
    }

    fn z_index(&self, viewer: &ViewerInstance) -> i32 {
        let tier = if self.host_panel_open {
            Z_TIER_LOW
        } else {
            Z_TIER_HIGH
        };
        let offset = match viewer.slot() {
            Some(slot) => slot.z_index.clamp(0, Z_TIER_SPAN),
            None => (viewer.viewer_id() as i32).min(Z_TIER_SPAN),
        };
        tier + offset
    }

    fn style(&self, viewer: &ViewerInstance) -> ViewerStyle {
        let frame = viewer.visible_frame();
        let image = viewer.image_size();
        ViewerStyle {
            left: frame.left,
            top: frame.top,
            width: frame.width,
            height: frame.height,
            z_index: self.z_index(viewer),
            image_width: image.width,
            image_height: image.height,
            object_fit: viewer.object_fit(),
            zoom_level: viewer.zoom_level(),
            pan_x: viewer.pan().x,
            pan_y: viewer.pan().y,
            minimized: viewer.is_minimized(),
            locked: viewer.is_locked(),
            borders: viewer
                .slot()
                .map(|slot| slot.borders.clone())
                .filter(|borders| borders.enabled),
        }
    }

    fn emit_apply(&mut self, pos: usize) {
        let viewer = &self.active[pos];
        let command = RenderCommand::Apply {
            key: viewer.key(),
            style: self.style(viewer),
        };
        self.commands.push(command);
    }

    // ==================== Queries ====================

    fn position(&self, key: InstanceKey) -> Option<usize> {
        self.active.iter().position(|v| v.key() == key)
    }

    fn require(&self, key: InstanceKey) -> ViewerResult<usize> {
        self.position(key).ok_or(ViewerError::UnknownInstance(key.0))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn layouts(&self) -> SharedLayouts {
        self.layouts.clone()
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn active_viewers(&self) -> &[ViewerInstance] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn closing_count(&self) -> usize {
        self.closing.len()
    }

    /// An open or fading-out viewer.
    pub fn viewer(&self, key: InstanceKey) -> Option<&ViewerInstance> {
        self.active
            .iter()
            .chain(self.closing.iter())
            .find(|v| v.key() == key)
    }

    pub fn viewer_style(&self, key: InstanceKey) -> Option<ViewerStyle> {
        self.position(key).map(|pos| self.style(&self.active[pos]))
    }

    pub fn focused(&self) -> Option<InstanceKey> {
        self.focused
    }

    pub fn host_panel_open(&self) -> bool {
        self.host_panel_open
    }

    pub fn locks(&self) -> &LockRegistry {
        &self.locks
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn drain_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }
}

impl fmt::Debug for ViewerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerPool")
            .field("active", &self.active.len())
            .field("closing", &self.closing.len())
            .field("focused", &self.focused)
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}
