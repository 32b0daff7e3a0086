//! Initial and re-placement of a viewer window.
//!
//! One entry point covers both the slot-governed and the free-floating case.

use crate::constants::STAGGER_OFFSET_PX;
use crate::geometry::{
    FitMode, ObjectFit, Point, Rect, Size, clamp_to_viewport, compute_fit_mode, fit_within_box,
};
use crate::layout::{Borders, ViewerConfig};

/// Inputs to [`compute_placement`].
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub viewer_id: u32,
    pub natural: Size,
    pub viewport: Size,
    /// Slot bound to this viewer in the active layout
    pub slot: Option<&'a ViewerConfig>,
    pub fit_mode: FitMode,
    /// Keep a slot-governed frame on screen
    pub prevent_offscreen: bool,
    /// Free viewers: image bounds in percent of the viewport
    pub size_percent: f64,
    /// Free viewers: geometry remembered from a previous session
    pub remembered: Option<Rect>,
}

/// Slot properties a placed viewer carries into its style.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotBinding {
    pub z_index: i32,
    pub borders: Borders,
}

/// Where and how large a viewer is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    /// Window box in viewport pixels
    pub frame: Rect,
    /// Image element size
    pub image: Size,
    pub object_fit: ObjectFit,
    pub slot: Option<SlotBinding>,
}

impl Placement {
    pub fn is_slotted(&self) -> bool {
        self.slot.is_some()
    }
}

pub fn compute_placement(request: &PlacementRequest<'_>) -> Placement {
    match request.slot {
        Some(config) => place_in_slot(request, config),
        None => place_free(request),
    }
}

fn place_in_slot(request: &PlacementRequest<'_>, config: &ViewerConfig) -> Placement {
    let slot = config.rect();
    let fit = compute_fit_mode(request.fit_mode, slot.size(), request.natural, config.aspect_ratio);

    let mut origin = slot.origin();
    if request.prevent_offscreen {
        origin = clamp_to_viewport(
            origin.x,
            origin.y,
            fit.container.width,
            fit.container.height,
            request.viewport,
        );
    }

    Placement {
        frame: Rect::from_parts(origin, fit.container),
        image: fit.render,
        object_fit: fit.object_fit,
        slot: Some(SlotBinding {
            z_index: config.z_index,
            borders: config.borders.clone(),
        }),
    }
}

fn place_free(request: &PlacementRequest<'_>) -> Placement {
    let viewport = request.viewport;
    let bounds = viewport.scale(request.size_percent / 100.0);

    let (origin, image) = match request.remembered {
        Some(rect) if rect.width > 0.0 => {
            let height = match request.natural.aspect_ratio() {
                Some(aspect) => rect.width / aspect,
                None => rect.height,
            };
            (rect.origin(), Size::new(rect.width, height))
        }
        _ => {
            let image = fit_within_box(request.natural, bounds);
            let stagger = request.viewer_id.saturating_sub(1) as f64 * STAGGER_OFFSET_PX;
            let origin = Point::new(
                (viewport.width - image.width) / 2.0 + stagger,
                (viewport.height - image.height) / 2.0 + stagger,
            );
            (origin, image)
        }
    };

    let origin = clamp_to_viewport(origin.x, origin.y, image.width, image.height, viewport);
    Placement {
        frame: Rect::from_parts(origin, image),
        image,
        object_fit: ObjectFit::Fill,
        slot: None,
    }
}
