use captcha_core::{CaptchaError, CaptureTransform, FrameSupplier};
use tracing::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack, Window,
};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`.
const HAVE_CURRENT_DATA: u16 = 2;

/// Both views of one camera frame. Handles are cheap JS references.
#[derive(Clone)]
pub struct CameraFrame {
    /// Capture space, fed to the hand tracker.
    pub capture: HtmlCanvasElement,
    /// Display space, cut into tiles.
    pub display: HtmlCanvasElement,
}

/// Webcam stream plus the two offscreen canvases it is drawn through.
/// Tracks are stopped when this is dropped.
pub struct Camera {
    video: HtmlVideoElement,
    stream: MediaStream,
    transform: CaptureTransform,
    capture: HtmlCanvasElement,
    capture_ctx: CanvasRenderingContext2d,
    display: HtmlCanvasElement,
    display_ctx: CanvasRenderingContext2d,
    released: bool,
}

impl Camera {
    pub async fn open(
        window: &Window,
        document: &Document,
        transform: CaptureTransform,
    ) -> Result<Camera, JsValue> {
        let devices = window.navigator().media_devices()?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&JsValue::TRUE);
        constraints.set_audio(&JsValue::FALSE);
        let stream: MediaStream =
            JsFuture::from(devices.get_user_media_with_constraints(&constraints)?)
                .await?
                .dyn_into()?;

        let video: HtmlVideoElement = document.create_element("video")?.dyn_into()?;
        video.set_muted(true);
        video.set_attribute("playsinline", "")?;
        video.set_src_object(Some(&stream));
        JsFuture::from(video.play()?).await?;

        let size = transform.size() as u32;
        let (capture, capture_ctx) = offscreen_canvas(document, size)?;
        let (display, display_ctx) = offscreen_canvas(document, size)?;
        info!(
            width = video.video_width(),
            height = video.video_height(),
            "camera opened"
        );
        Ok(Camera {
            video,
            stream,
            transform,
            capture,
            capture_ctx,
            display,
            display_ctx,
            released: false,
        })
    }

    /// Stop every track. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.video.set_src_object(None);
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
        info!("camera released");
    }

    fn draw_with(
        ctx: &CanvasRenderingContext2d,
        m: [f64; 6],
        draw: impl FnOnce(&CanvasRenderingContext2d) -> Result<(), JsValue>,
    ) -> Result<(), JsValue> {
        let [a, b, c, d, e, f] = m;
        ctx.set_transform(a, b, c, d, e, f)?;
        let res = draw(ctx);
        ctx.reset_transform()?;
        res
    }
}

impl FrameSupplier for Camera {
    type Frame = CameraFrame;

    fn next_frame(&mut self) -> captcha_core::Result<CameraFrame> {
        if self.released {
            return Err(CaptchaError::device("camera released"));
        }
        if !self.stream.active() || self.video.ended() {
            return Err(CaptchaError::device("media stream ended"));
        }
        // A stalled stream keeps showing the last frame.
        if self.video.ready_state() >= HAVE_CURRENT_DATA {
            let size = f64::from(self.transform.size());
            let video = &self.video;
            let capture = &self.capture;
            Self::draw_with(&self.capture_ctx, self.transform.capture_matrix(), |ctx| {
                ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, size, size)
            })
            .and_then(|()| {
                Self::draw_with(&self.display_ctx, self.transform.canvas_matrix(), |ctx| {
                    ctx.draw_image_with_html_canvas_element(capture, 0.0, 0.0)
                })
            })
            .map_err(|e| {
                warn!(error = ?e, "frame draw failed");
                CaptchaError::device("frame draw failed")
            })?;
        }
        Ok(CameraFrame {
            capture: self.capture.clone(),
            display: self.display.clone(),
        })
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.release();
    }
}

fn offscreen_canvas(
    document: &Document,
    size: u32,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    cv.set_width(size);
    cv.set_height(size);
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}
