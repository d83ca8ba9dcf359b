//! The crop controller.
//!
//! [`Cropper`] owns all crop state: metrics, constraints, the committed
//! rectangle, zoom, rotation, feature flags and the running gesture. Hosts feed
//! it pointer events and metric updates; it reports accepted changes to its
//! observers synchronously and hands out [`ExtractionRequest`] snapshots.
//!
//! # Lifecycle
//!
//! The cropper starts without an image. Once it knows both a non-empty
//! container and the image's natural size it places the initial rectangle
//! (the configured initial crop, or the container inset by 10% on each side),
//! solves it and reports it. Until then, pointer input is ignored.

use std::fmt;
use std::mem;

use serde::{Deserialize, Serialize};

use crate::constraints::{resolve, Constraints};
use crate::encode::{OutputFormat, DEFAULT_QUALITY};
use crate::events::{CropEvent, CropObserver};
use crate::extract::{ExtractError, ExtractionRequest};
use crate::features::{Feature, FeatureConfig, Features, LegacyToggles};
use crate::geometry::{
    clamp, clamp_zoom, normalize_degrees, ContainerMetrics, ImageMetrics, Point, Rect,
};
use crate::gesture::{
    follow_cursor, FreehandPath, Gesture, GestureContext, GestureMode, ResizeHandle,
};

/// Inset of the default rectangle, as a fraction of the container.
const DEFAULT_INSET: f64 = 0.1;

/// Construction options. Every field has a default, so hosts can pass a
/// partial object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropperOptions {
    /// Rectangle placed when the cropper initializes, in container space.
    pub initial_crop: Option<Rect>,
    pub constraints: Constraints,
    pub zoom: f64,
    pub rotation: f64,
    pub features: FeatureConfig,
    /// Fallback for `features.zoom`.
    pub zoomable: bool,
    /// Fallback for `features.rotation`.
    pub rotatable: bool,
    /// Fallback for `features.grid`.
    pub show_grid: bool,
    pub disabled: bool,
    pub image_format: OutputFormat,
    /// Lossy encoding quality in `[0, 1]`.
    pub image_quality: f32,
}

impl Default for CropperOptions {
    fn default() -> Self {
        let legacy = LegacyToggles::default();
        Self {
            initial_crop: None,
            constraints: Constraints::default(),
            zoom: 1.0,
            rotation: 0.0,
            features: FeatureConfig::default(),
            zoomable: legacy.zoomable,
            rotatable: legacy.rotatable,
            show_grid: legacy.show_grid,
            disabled: false,
            image_format: OutputFormat::default(),
            image_quality: DEFAULT_QUALITY,
        }
    }
}

impl CropperOptions {
    pub fn legacy_toggles(&self) -> LegacyToggles {
        LegacyToggles {
            zoomable: self.zoomable,
            rotatable: self.rotatable,
            show_grid: self.show_grid,
        }
    }
}

/// One rule-of-thirds line, in container space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub from: Point,
    pub to: Point,
}

/// Interactive crop state machine.
pub struct Cropper {
    constraints: Constraints,
    container: Option<ContainerMetrics>,
    image: Option<ImageMetrics>,
    initial_crop: Option<Rect>,
    rect: Rect,
    initialized: bool,
    zoom: f64,
    rotation: f64,
    feature_config: FeatureConfig,
    legacy: LegacyToggles,
    features: Features,
    disabled: bool,
    gesture: Gesture,
    image_format: OutputFormat,
    image_quality: f32,
    observers: Vec<Box<dyn CropObserver>>,
}

impl fmt::Debug for Cropper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cropper")
            .field("rect", &self.rect)
            .field("zoom", &self.zoom)
            .field("rotation", &self.rotation)
            .field("container", &self.container)
            .field("image", &self.image)
            .field("mode", &self.mode())
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl Default for Cropper {
    fn default() -> Self {
        Self::new(CropperOptions::default())
    }
}

impl Cropper {
    pub fn new(options: CropperOptions) -> Self {
        if options.constraints.has_invalid_aspect() {
            log::warn!(
                "ignoring invalid aspect ratio {:?}",
                options.constraints.aspect_ratio
            );
        }

        let legacy = options.legacy_toggles();
        let zoom = if options.zoom.is_finite() {
            clamp_zoom(options.zoom)
        } else {
            1.0
        };
        let rotation = if options.rotation.is_finite() {
            normalize_degrees(options.rotation)
        } else {
            0.0
        };

        Self {
            constraints: options.constraints,
            container: None,
            image: None,
            initial_crop: options.initial_crop,
            rect: Rect::default(),
            initialized: false,
            zoom,
            rotation,
            feature_config: options.features,
            legacy,
            features: Features::resolve(&options.features, &legacy),
            disabled: options.disabled,
            gesture: Gesture::Idle,
            image_format: options.image_format,
            image_quality: sanitize_quality(options.image_quality),
            observers: Vec::new(),
        }
    }

    /// Register an observer for every subsequent change.
    pub fn subscribe<O>(&mut self, observer: O)
    where
        O: CropObserver + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Update the display container size.
    ///
    /// An initialized rectangle is not re-solved here; the next gesture step or
    /// explicit update solves against the new container.
    pub fn set_container_metrics(&mut self, container: ContainerMetrics) {
        log::debug!("container {}x{}", container.width, container.height);
        self.container = Some(container);
        self.try_initialize();
    }

    /// A new source image finished loading.
    pub fn set_image_metrics(&mut self, image: ImageMetrics) {
        if image.is_empty() {
            log::warn!("image reported zero size, treating as load failure");
            self.image_load_failed();
            return;
        }

        log::debug!("image {}x{}", image.natural_width, image.natural_height);
        self.image = Some(image);
        self.initialized = false;
        self.gesture = Gesture::Idle;
        self.try_initialize();
    }

    /// The source could not be decoded; drop back to the no-image state.
    pub fn image_load_failed(&mut self) {
        self.image = None;
        self.initialized = false;
        self.gesture = Gesture::Idle;
    }

    pub fn container_metrics(&self) -> Option<ContainerMetrics> {
        self.container
    }

    pub fn image_metrics(&self) -> Option<ImageMetrics> {
        self.image
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Whether the rectangle has been placed for the current image.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    /// Replace the constraints and re-solve the current rectangle.
    pub fn set_constraints(&mut self, constraints: Constraints) {
        if constraints.has_invalid_aspect() {
            log::warn!("ignoring invalid aspect ratio {:?}", constraints.aspect_ratio);
        }
        self.constraints = constraints;

        if let Some(container) = self.placed_container() {
            if !self.rect.is_empty() {
                self.commit(resolve(self.rect, container, &self.constraints));
            }
        }
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.accepts_input() {
            return;
        }
        if !self.gesture.is_idle() {
            log::debug!("pointer down during {:?}, ignored", self.gesture.mode());
            return;
        }

        self.gesture = Gesture::begin(Point::new(x, y), &self.rect, &self.features);
        log::debug!("gesture start: {:?}", self.gesture.mode());
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.accepts_input() {
            return;
        }
        let Some(container) = self.placed_container() else {
            return;
        };

        let point = Point::new(x, y);
        let ctx = GestureContext {
            rect: self.rect,
            container,
            constraints: &self.constraints,
        };

        let next = if self.gesture.is_idle() {
            self.features
                .cursor_follow
                .then(|| follow_cursor(point, &ctx))
        } else {
            self.gesture.update(point, &ctx)
        };

        if let Some(rect) = next {
            self.commit(rect);
        }
    }

    /// Finish the running gesture. Always returns to idle.
    pub fn pointer_up(&mut self) {
        let gesture = mem::take(&mut self.gesture);
        if gesture.is_idle() {
            return;
        }
        log::debug!("gesture end: {:?}", gesture.mode());

        if !self.accepts_input() {
            return;
        }
        let Some(container) = self.placed_container() else {
            return;
        };

        let ctx = GestureContext {
            rect: self.rect,
            container,
            constraints: &self.constraints,
        };
        if let Some(rect) = gesture.finish(&ctx) {
            self.commit(rect);
        }
    }

    /// Abandon the running gesture without committing anything.
    pub fn cancel_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Solve and commit `rect`. Before initialization it becomes the initial
    /// crop instead.
    pub fn set_rect(&mut self, rect: Rect) {
        match self.placed_container() {
            Some(container) => self.commit(resolve(rect, container, &self.constraints)),
            None => self.initial_crop = Some(rect),
        }
    }

    /// Back to the container inset by 10% on each side, solved.
    pub fn reset_rect(&mut self) {
        match self.placed_container() {
            Some(container) => {
                self.commit(resolve(default_rect(container), container, &self.constraints))
            }
            None => self.initial_crop = None,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor, clamped to `[0.1, 5]`. Non-finite values are
    /// ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            log::warn!("ignoring non-finite zoom {}", zoom);
            return;
        }
        let zoom = clamp_zoom(zoom);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.notify(CropEvent::ZoomChanged(zoom));
        }
    }

    /// Interactive zoom step; a no-op while zoom is off or the cropper is
    /// disabled.
    pub fn zoom_by(&mut self, delta: f64) {
        if self.disabled || !self.features.zoom {
            return;
        }
        self.set_zoom(self.zoom + delta);
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Set the rotation in degrees, normalized into `[0, 360)`. Non-finite
    /// values are ignored.
    pub fn set_rotation(&mut self, degrees: f64) {
        if !degrees.is_finite() {
            log::warn!("ignoring non-finite rotation {}", degrees);
            return;
        }
        let rotation = normalize_degrees(degrees);
        if rotation != self.rotation {
            self.rotation = rotation;
            self.notify(CropEvent::RotationChanged(rotation));
        }
    }

    /// Interactive rotation step; a no-op while rotation is off or the cropper
    /// is disabled.
    pub fn rotate_by(&mut self, delta: f64) {
        if self.disabled || !self.features.rotation {
            return;
        }
        self.set_rotation(self.rotation + delta);
    }

    pub fn features(&self) -> Features {
        self.features
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        self.features.is_enabled(feature)
    }

    /// Toggle one feature. A gesture already running keeps its mode.
    pub fn set_feature(&mut self, feature: Feature, enabled: bool) {
        self.features.set(feature, enabled);
        self.feature_config = self.features.to_config();
    }

    /// Replace the host feature config, re-resolving against the legacy
    /// toggles.
    pub fn set_features(&mut self, config: FeatureConfig) {
        self.feature_config = config;
        self.features = Features::resolve(&self.feature_config, &self.legacy);
    }

    pub fn set_legacy_toggles(&mut self, legacy: LegacyToggles) {
        self.legacy = legacy;
        self.features = Features::resolve(&self.feature_config, &self.legacy);
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// While disabled, pointer input and interactive zoom/rotation steps are
    /// ignored. Disabling abandons the running gesture.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled && !self.gesture.is_idle() {
            log::debug!("disabled during {:?}, gesture dropped", self.gesture.mode());
            self.gesture = Gesture::Idle;
        }
    }

    pub fn mode(&self) -> GestureMode {
        if self.gesture.is_idle() && self.features.cursor_follow && self.accepts_input() {
            GestureMode::CursorFollowing
        } else {
            self.gesture.mode()
        }
    }

    /// The lasso path while a freehand gesture runs, for drawing it.
    pub fn freehand_path(&self) -> Option<&FreehandPath> {
        self.gesture.freehand_path()
    }

    /// Visible resize handles and their anchor points.
    pub fn handles(&self) -> Vec<(ResizeHandle, Point)> {
        if self.disabled || !self.features.resize || !self.initialized {
            return Vec::new();
        }
        ResizeHandle::ALL
            .into_iter()
            .map(|handle| (handle, handle.anchor(&self.rect)))
            .collect()
    }

    /// Rule-of-thirds lines over the rectangle, when the grid is on.
    pub fn grid_lines(&self) -> Vec<GridLine> {
        if !self.features.grid || !self.initialized || self.rect.is_empty() {
            return Vec::new();
        }
        let r = self.rect;
        let mut lines = Vec::with_capacity(4);
        for third in [1.0 / 3.0, 2.0 / 3.0] {
            let x = r.x + r.width * third;
            let y = r.y + r.height * third;
            lines.push(GridLine {
                from: Point::new(x, r.y),
                to: Point::new(x, r.bottom()),
            });
            lines.push(GridLine {
                from: Point::new(r.x, y),
                to: Point::new(r.right(), y),
            });
        }
        lines
    }

    pub fn image_format(&self) -> OutputFormat {
        self.image_format
    }

    pub fn image_quality(&self) -> f32 {
        self.image_quality
    }

    /// Default encoding used by hosts that do not pass one per extraction.
    pub fn set_output(&mut self, format: OutputFormat, quality: f32) {
        self.image_format = format;
        self.image_quality = sanitize_quality(quality);
    }

    /// Snapshot the state extraction needs.
    pub fn extraction_request(&self) -> Result<ExtractionRequest, ExtractError> {
        let image = self.image.ok_or(ExtractError::NoImage)?;
        let container = self
            .placed_container()
            .ok_or(ExtractError::NothingToExtract)?;
        if self.rect.is_empty() {
            return Err(ExtractError::NothingToExtract);
        }
        Ok(ExtractionRequest::new(
            self.rect,
            self.zoom,
            self.rotation,
            image,
            container,
        ))
    }

    fn accepts_input(&self) -> bool {
        !self.disabled && self.image.is_some() && self.placed_container().is_some()
    }

    /// The container, once the rectangle has been placed in it.
    fn placed_container(&self) -> Option<ContainerMetrics> {
        if !self.initialized {
            return None;
        }
        self.container.filter(|c| !c.is_empty())
    }

    fn try_initialize(&mut self) {
        if self.initialized || self.image.is_none() {
            return;
        }
        let Some(container) = self.container.filter(|c| !c.is_empty()) else {
            return;
        };

        let start = self.initial_crop.unwrap_or_else(|| default_rect(container));
        self.initialized = true;
        log::debug!("initialized in {}x{}", container.width, container.height);
        self.commit(resolve(start, container, &self.constraints));
    }

    fn commit(&mut self, rect: Rect) {
        if rect == self.rect {
            return;
        }
        log::debug!("crop {:?}", rect);
        self.rect = rect;
        self.notify(CropEvent::RectChanged(rect));
    }

    fn notify(&mut self, event: CropEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }
}

/// The container inset by 10% on each side.
pub fn default_rect(container: ContainerMetrics) -> Rect {
    Rect::new(
        container.width * DEFAULT_INSET,
        container.height * DEFAULT_INSET,
        container.width * (1.0 - 2.0 * DEFAULT_INSET),
        container.height * (1.0 - 2.0 * DEFAULT_INSET),
    )
}

fn sanitize_quality(quality: f32) -> f32 {
    if quality.is_finite() {
        clamp(quality as f64, 0.0, 1.0) as f32
    } else {
        DEFAULT_QUALITY
    }
}
