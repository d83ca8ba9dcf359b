//! Change notifications from the cropper to its host.

use std::sync::mpsc::Sender;

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A committed state change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum CropEvent {
    RectChanged(Rect),
    ZoomChanged(f64),
    RotationChanged(f64),
}

/// Receives [`CropEvent`]s synchronously, inside the call that caused them.
pub trait CropObserver {
    fn notify(&mut self, event: &CropEvent);
}

impl<F> CropObserver for F
where
    F: FnMut(&CropEvent),
{
    fn notify(&mut self, event: &CropEvent) {
        self(event)
    }
}

/// Forward events over a channel. A dropped receiver is not an error for the
/// cropper; the event is discarded.
impl CropObserver for Sender<CropEvent> {
    fn notify(&mut self, event: &CropEvent) {
        if self.send(*event).is_err() {
            log::debug!("crop event receiver dropped, discarding {:?}", event);
        }
    }
}
