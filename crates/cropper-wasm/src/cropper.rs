//! The `Cropper` class exported to JavaScript.
//!
//! Wraps [`cropper_core::Cropper`] together with the decoded source image and
//! the host's callbacks. Core events go through a channel and are dispatched
//! to the callbacks once the core call that produced them has returned.
//!
//! # Example
//!
//! ```typescript
//! import init, { Cropper } from '@cropper/wasm';
//!
//! await init();
//! const cropper = new Cropper({ constraints: { aspect_ratio: 16 / 9 } });
//! cropper.onCropChange((rect) => draw(rect));
//! cropper.setContainerSize(el.clientWidth, el.clientHeight);
//! cropper.loadImage(new Uint8Array(await file.arrayBuffer()));
//!
//! el.onpointerdown = (e) => cropper.pointerDown(e.offsetX, e.offsetY);
//! el.onpointermove = (e) => cropper.pointerMove(e.offsetX, e.offsetY);
//! el.onpointerup = () => cropper.pointerUp();
//!
//! const blob = await cropper.getCroppedImageBlob();
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver};

use cropper_core::image::RgbaImage;
use cropper_core::{
    decode, Constraints, ContainerMetrics, CropEvent, Cropper, CropperOptions, ExtractError,
    ExtractionRequest, Feature, FeatureConfig, ImageMetrics, OutputFormat, Rect,
};
use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::encode::to_blob;
use crate::types::{HandleJs, JsRaster};

/// Host callbacks, one slot per event kind.
#[derive(Default)]
struct Callbacks {
    crop_change: Option<Function>,
    zoom_change: Option<Function>,
    rotation_change: Option<Function>,
    crop_blob: Option<Function>,
}

/// Interactive crop controller for JavaScript.
#[wasm_bindgen(js_name = Cropper)]
pub struct JsCropper {
    inner: Cropper,
    source: Option<Rc<RgbaImage>>,
    events: Receiver<CropEvent>,
    callbacks: Rc<RefCell<Callbacks>>,
}

#[wasm_bindgen(js_class = Cropper)]
impl JsCropper {
    /// Create a cropper. `options` may be `undefined` or any subset of the
    /// option fields (snake_case).
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsCropper, JsValue> {
        let options = if options.is_undefined() || options.is_null() {
            CropperOptions::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
        };
        Ok(Self::with_options(options))
    }

    /// Decode and load a new source image (PNG, JPEG or WebP bytes).
    ///
    /// On failure the cropper returns to the no-image state and ignores
    /// pointer input until a later load succeeds.
    #[wasm_bindgen(js_name = loadImage)]
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        match decode::decode_image(bytes) {
            Ok(raster) => {
                self.set_source(raster);
                Ok(())
            }
            Err(e) => {
                log::warn!("image load failed: {}", e);
                self.image_load_failed();
                Err(to_js_error(e))
            }
        }
    }

    /// Load an already decoded RGBA raster as the source image.
    #[wasm_bindgen(js_name = loadRaster)]
    pub fn load_raster(&mut self, raster: &JsRaster) -> Result<(), JsValue> {
        let raster = raster
            .to_raster()
            .ok_or_else(|| JsValue::from_str("Pixel buffer does not match width * height * 4"))?;
        self.set_source(raster);
        Ok(())
    }

    /// Report that the host failed to load the image.
    #[wasm_bindgen(js_name = imageLoadFailed)]
    pub fn image_load_failed(&mut self) {
        self.source = None;
        self.inner.image_load_failed();
    }

    #[wasm_bindgen(js_name = setContainerSize)]
    pub fn set_container_size(&mut self, width: f64, height: f64) {
        self.inner
            .set_container_metrics(ContainerMetrics::new(width, height));
        self.dispatch();
    }

    #[wasm_bindgen(js_name = setConstraints)]
    pub fn set_constraints(&mut self, constraints: JsValue) -> Result<(), JsValue> {
        let constraints: Constraints =
            serde_wasm_bindgen::from_value(constraints).map_err(to_js_error)?;
        self.inner.set_constraints(constraints);
        self.dispatch();
        Ok(())
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.inner.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.inner.pointer_move(x, y);
        self.dispatch();
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.inner.pointer_up();
        self.dispatch();
    }

    #[wasm_bindgen(js_name = cancelGesture)]
    pub fn cancel_gesture(&mut self) {
        self.inner.cancel_gesture();
    }

    /// Current crop rectangle as `{ x, y, width, height }`.
    #[wasm_bindgen(js_name = getCrop)]
    pub fn get_crop(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.rect())
    }

    #[wasm_bindgen(js_name = setCrop)]
    pub fn set_crop(&mut self, rect: JsValue) -> Result<(), JsValue> {
        let rect: Rect = serde_wasm_bindgen::from_value(rect).map_err(to_js_error)?;
        self.inner.set_rect(rect);
        self.dispatch();
        Ok(())
    }

    #[wasm_bindgen(js_name = resetCrop)]
    pub fn reset_crop(&mut self) {
        self.inner.reset_rect();
        self.dispatch();
    }

    #[wasm_bindgen(getter)]
    pub fn zoom(&self) -> f64 {
        self.inner.zoom()
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, zoom: f64) {
        self.inner.set_zoom(zoom);
        self.dispatch();
    }

    #[wasm_bindgen(js_name = zoomBy)]
    pub fn zoom_by(&mut self, delta: f64) {
        self.inner.zoom_by(delta);
        self.dispatch();
    }

    #[wasm_bindgen(getter)]
    pub fn rotation(&self) -> f64 {
        self.inner.rotation()
    }

    #[wasm_bindgen(js_name = setRotation)]
    pub fn set_rotation(&mut self, degrees: f64) {
        self.inner.set_rotation(degrees);
        self.dispatch();
    }

    #[wasm_bindgen(js_name = rotateBy)]
    pub fn rotate_by(&mut self, delta: f64) {
        self.inner.rotate_by(delta);
        self.dispatch();
    }

    /// All feature flags as `{ drag: true, resize: true, ... }`.
    #[wasm_bindgen(js_name = getFeatures)]
    pub fn get_features(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.features())
    }

    /// Toggle one feature by name (`"free_style"`, `"cursor_follow"`, ...).
    #[wasm_bindgen(js_name = setFeature)]
    pub fn set_feature(&mut self, name: &str, enabled: bool) -> Result<(), JsValue> {
        let feature: Feature = name.parse().map_err(to_js_error)?;
        self.inner.set_feature(feature, enabled);
        Ok(())
    }

    /// Replace all features from a partial `{ name: bool }` object.
    #[wasm_bindgen(js_name = setFeatures)]
    pub fn set_features(&mut self, config: JsValue) -> Result<(), JsValue> {
        let config: FeatureConfig = serde_wasm_bindgen::from_value(config).map_err(to_js_error)?;
        self.inner.set_features(config);
        Ok(())
    }

    #[wasm_bindgen(js_name = isFeatureEnabled)]
    pub fn is_feature_enabled(&self, name: &str) -> Result<bool, JsValue> {
        let feature: Feature = name.parse().map_err(to_js_error)?;
        Ok(self.inner.is_enabled(feature))
    }

    #[wasm_bindgen(getter)]
    pub fn disabled(&self) -> bool {
        self.inner.is_disabled()
    }

    #[wasm_bindgen(js_name = setDisabled)]
    pub fn set_disabled(&mut self, disabled: bool) {
        self.inner.set_disabled(disabled);
    }

    /// Interaction mode as `{ mode: "resizing", handle: "se" }` and similar.
    pub fn mode(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.mode())
    }

    /// Visible resize handles as `[{ handle, x, y }]`.
    pub fn handles(&self) -> Result<JsValue, JsValue> {
        let handles: Vec<HandleJs> = self.inner.handles().into_iter().map(Into::into).collect();
        to_js(&handles)
    }

    /// Rule-of-thirds lines as `[{ from: {x, y}, to: {x, y} }]`.
    #[wasm_bindgen(js_name = gridLines)]
    pub fn grid_lines(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.grid_lines())
    }

    /// The lasso points while a freehand gesture runs, otherwise `null`.
    #[wasm_bindgen(js_name = freehandPath)]
    pub fn freehand_path(&self) -> Result<JsValue, JsValue> {
        match self.inner.freehand_path() {
            Some(path) => to_js(path.points()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Default output format and quality for extraction.
    #[wasm_bindgen(js_name = setOutput)]
    pub fn set_output(&mut self, format: &str, quality: f32) -> Result<(), JsValue> {
        let format: OutputFormat = format.parse().map_err(to_js_error)?;
        self.inner.set_output(format, quality);
        Ok(())
    }

    #[wasm_bindgen(js_name = onCropChange)]
    pub fn on_crop_change(&mut self, callback: Option<Function>) {
        self.callbacks.borrow_mut().crop_change = callback;
    }

    #[wasm_bindgen(js_name = onZoomChange)]
    pub fn on_zoom_change(&mut self, callback: Option<Function>) {
        self.callbacks.borrow_mut().zoom_change = callback;
    }

    #[wasm_bindgen(js_name = onRotationChange)]
    pub fn on_rotation_change(&mut self, callback: Option<Function>) {
        self.callbacks.borrow_mut().rotation_change = callback;
    }

    /// Receive a freshly encoded `Blob` after every crop change.
    #[wasm_bindgen(js_name = onCropBlob)]
    pub fn on_crop_blob(&mut self, callback: Option<Function>) {
        self.callbacks.borrow_mut().crop_blob = callback;
    }

    /// Render and encode the current crop. Resolves to a `Blob`, or `null`
    /// when the crop is empty.
    #[wasm_bindgen(js_name = getCroppedImageBlob)]
    pub fn get_cropped_image_blob(&self, format: Option<String>, quality: Option<f32>) -> Promise {
        let job = self.job(format.as_deref(), quality);
        future_to_promise(async move {
            match job.encode() {
                Ok(encoded) => Ok(to_blob(&encoded)?.into()),
                Err(ExtractError::NothingToExtract) => Ok(JsValue::NULL),
                Err(e) => Err(to_js_error(e)),
            }
        })
    }

    /// Render and encode the current crop. Resolves to a base64 data URL, or
    /// `null` when the crop is empty.
    #[wasm_bindgen(js_name = getCroppedImageBase64)]
    pub fn get_cropped_image_base64(
        &self,
        format: Option<String>,
        quality: Option<f32>,
    ) -> Promise {
        let job = self.job(format.as_deref(), quality);
        future_to_promise(async move {
            match job.encode() {
                Ok(encoded) => Ok(JsValue::from_str(&encoded.to_data_url())),
                Err(ExtractError::NothingToExtract) => Ok(JsValue::NULL),
                Err(e) => Err(to_js_error(e)),
            }
        })
    }

    /// Render the current crop without encoding. Resolves to a `JsRaster`, or
    /// `null` when the crop is empty.
    #[wasm_bindgen(js_name = getCroppedImageRaster)]
    pub fn get_cropped_image_raster(&self) -> Promise {
        let job = self.job(None, None);
        future_to_promise(async move {
            match job.render() {
                Ok(raster) => Ok(JsRaster::from_raster(raster).into()),
                Err(ExtractError::NothingToExtract) => Ok(JsValue::NULL),
                Err(e) => Err(to_js_error(e)),
            }
        })
    }
}

/// A snapshot of everything one extraction needs. Owns its inputs so it can
/// outlive the call that created it.
pub(crate) struct ExtractJob {
    request: Result<ExtractionRequest, ExtractError>,
    source: Option<Rc<RgbaImage>>,
    format: OutputFormat,
    quality: f32,
}

impl ExtractJob {
    pub(crate) fn render(&self) -> Result<RgbaImage, ExtractError> {
        let request = self.request_and_source()?;
        Ok(request.0.render(request.1)?.into_raster())
    }

    pub(crate) fn encode(&self) -> Result<cropper_core::EncodedImage, ExtractError> {
        let (request, source) = self.request_and_source()?;
        request.render(source)?.encode(self.format, self.quality)
    }

    fn request_and_source(&self) -> Result<(ExtractionRequest, &RgbaImage), ExtractError> {
        let source = self.source.as_deref().ok_or(ExtractError::NoImage)?;
        match &self.request {
            Ok(request) => Ok((*request, source)),
            Err(ExtractError::NoImage) => Err(ExtractError::NoImage),
            Err(_) => Err(ExtractError::NothingToExtract),
        }
    }
}

impl JsCropper {
    pub(crate) fn with_options(options: CropperOptions) -> Self {
        let (tx, rx) = channel();
        let mut inner = Cropper::new(options);
        inner.subscribe(tx);
        Self {
            inner,
            source: None,
            events: rx,
            callbacks: Rc::new(RefCell::new(Callbacks::default())),
        }
    }

    pub(crate) fn set_source(&mut self, raster: RgbaImage) {
        let metrics = ImageMetrics::new(raster.width(), raster.height());
        self.source = Some(Rc::new(raster));
        self.inner.set_image_metrics(metrics);
        self.dispatch();
    }

    /// Snapshot for one extraction. Format and quality fall back to the
    /// cropper's output settings; an unknown format name falls back too.
    pub(crate) fn job(&self, format: Option<&str>, quality: Option<f32>) -> ExtractJob {
        let format = match format {
            Some(name) => name.parse().unwrap_or_else(|_| {
                log::warn!("unknown output format {:?}, using {}", name, self.inner.image_format());
                self.inner.image_format()
            }),
            None => self.inner.image_format(),
        };
        ExtractJob {
            request: self.inner.extraction_request(),
            source: self.source.clone(),
            format,
            quality: quality.unwrap_or_else(|| self.inner.image_quality()),
        }
    }

    /// Deliver queued core events to the JS callbacks.
    fn dispatch(&mut self) {
        let events: Vec<CropEvent> = self.events.try_iter().collect();
        if events.is_empty() {
            return;
        }

        // Callbacks may re-register handlers, so none are borrowed while they run
        let (crop_change, zoom_change, rotation_change, wants_blob) = {
            let callbacks = self.callbacks.borrow();
            (
                callbacks.crop_change.clone(),
                callbacks.zoom_change.clone(),
                callbacks.rotation_change.clone(),
                callbacks.crop_blob.is_some(),
            )
        };

        for event in events {
            match event {
                CropEvent::RectChanged(rect) => {
                    if let Some(callback) = &crop_change {
                        call_with(callback, to_js(&rect));
                    }
                    if wants_blob {
                        self.spawn_crop_blob();
                    }
                }
                CropEvent::ZoomChanged(zoom) => {
                    if let Some(callback) = &zoom_change {
                        call_with(callback, Ok(JsValue::from_f64(zoom)));
                    }
                }
                CropEvent::RotationChanged(rotation) => {
                    if let Some(callback) = &rotation_change {
                        call_with(callback, Ok(JsValue::from_f64(rotation)));
                    }
                }
            }
        }
    }

    /// Encode the current crop in the background and hand it to the
    /// `onCropBlob` callback.
    fn spawn_crop_blob(&self) {
        if self.source.is_none() {
            return;
        }
        let job = self.job(None, None);
        let callbacks = Rc::clone(&self.callbacks);

        spawn_local(async move {
            let blob = match job.encode() {
                Ok(encoded) => to_blob(&encoded),
                Err(ExtractError::NothingToExtract) => return,
                Err(e) => {
                    log::warn!("crop blob failed: {}", e);
                    return;
                }
            };
            // The callback may have been replaced or removed meanwhile
            let callback = callbacks.borrow().crop_blob.clone();
            if let Some(callback) = callback {
                call_with(&callback, blob.map(JsValue::from));
            }
        });
    }
}

fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(to_js_error)
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn call_with(callback: &Function, arg: Result<JsValue, JsValue>) {
    let result = arg.and_then(|arg| callback.call1(&JsValue::NULL, &arg));
    if let Err(e) = result {
        log::warn!("callback failed: {:?}", e);
    }
}
