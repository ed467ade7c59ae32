use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::assets::decode::PreparedImage;
use crate::assets::store::{AssetKind, AssetState, AssetStore};
use crate::displacement::DisplacementSettings;
use crate::foundation::core::{ElementId, PlaceholderId, Rgb8};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::notice::Notice;
use crate::geometry::units::{CanvasLayout, ViewGeometry, fit_contain};
use crate::model::blend::BlendMode;
use crate::model::element::{CanvasElement, ElementKind};
use crate::model::placeholder::ClipShape;
use crate::model::view::{DesignUrlMap, ViewSpec};
use crate::render::backend::FrameRGBA;
use crate::render::composite::{
    composite_over_rgba8_premul, mask_apply_alpha_in_place, tint_multiply_in_place,
};
use crate::render::overlay::OverlayScene;
use crate::render::raster::{DrawInputs, Rasterizer};
use crate::render::scene::{LayerKey, ViewScene};
use crate::render::surface_pool::{SurfacePool, SurfacePoolOpts, SurfaceSize};
use crate::text::layout::FontBook;
use crate::text::measure::TextMeasure;

/// Whether the interactive overlay is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    #[default]
    Edit,
    Preview,
}

/// Blend applied to layers without an explicit mode, picked from the garment tint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlendDefaults {
    pub dark_threshold: f32,
    pub light_opacity: f32,
}

impl Default for BlendDefaults {
    fn default() -> Self {
        Self {
            dark_threshold: 0.5,
            light_opacity: 0.9,
        }
    }
}

impl BlendDefaults {
    /// Screen at full opacity on dark garments, multiply at `light_opacity` otherwise.
    /// An untinted garment counts as white.
    pub fn for_tint(&self, tint: Option<Rgb8>) -> (BlendMode, f32) {
        let lum = tint.unwrap_or(Rgb8::WHITE).luminance();
        if lum < self.dark_threshold {
            (BlendMode::Screen, 1.0)
        } else {
            (BlendMode::Multiply, self.light_opacity)
        }
    }
}

/// Everything one view frame is rendered from.
pub struct ViewFrameInputs<'a> {
    pub view: &'a ViewSpec,
    pub layout: CanvasLayout,
    pub geometry: ViewGeometry,
    /// Effective elements for the view, already in z order.
    pub elements: &'a [CanvasElement],
    pub designs: &'a DesignUrlMap,
    pub tint: Option<Rgb8>,
    pub settings: DisplacementSettings,
    pub assets: &'a AssetStore,
    pub fonts: &'a FontBook,
    pub measure: &'a dyn TextMeasure,
    pub blend: BlendDefaults,
    pub mode: RenderMode,
    pub selected: Option<&'a ElementId>,
}

/// One rendered view.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    /// Premultiplied composite.
    pub frame: FrameRGBA,
    /// Present in [`RenderMode::Edit`] only.
    pub overlay: Option<OverlayScene>,
    /// Asset failures hit while drawing, one per URL.
    pub notices: Vec<Notice>,
}

/// Rasterizer and scratch surfaces reused across frames.
#[derive(Debug, Default)]
pub struct ViewRenderer {
    raster: Rasterizer,
    pool: SurfacePool,
}

struct FrameState<'s> {
    frame: vello_cpu::Pixmap,
    size: SurfaceSize,
    scene: &'s mut ViewScene,
    settings: DisplacementSettings,
    clips: BTreeMap<PlaceholderId, ClipShape>,
    live: Vec<LayerKey>,
    notices: Vec<Notice>,
    notified: BTreeSet<String>,
}

impl FrameState<'_> {
    fn notify(&mut self, err: &DrapeError) {
        let key = match err {
            DrapeError::AssetLoad { url, .. } => url.clone(),
            other => other.to_string(),
        };
        if self.notified.insert(key) {
            tracing::warn!(error = %err, "layer skipped");
            self.notices.push(Notice::from(err));
        }
    }
}

impl ViewRenderer {
    pub fn new() -> Self {
        Self {
            raster: Rasterizer::new(),
            pool: SurfacePool::new(SurfacePoolOpts::default()),
        }
    }

    /// Drop pooled surfaces and cached paints.
    pub fn purge(&mut self) {
        self.pool.purge();
        self.raster.clear_paints();
    }

    /// Render one view: tinted garment, design uploads, then elements in z order, each warped,
    /// clipped to its region, and blended.
    #[tracing::instrument(skip_all, fields(view = %inputs.view.id, mode = ?inputs.mode))]
    pub fn render_view(
        &mut self,
        scene: &mut ViewScene,
        inputs: &ViewFrameInputs<'_>,
    ) -> DrapeResult<RenderOutput> {
        let (w, h) = inputs.layout.pixel_size();
        let size = SurfaceSize::new(w, h)?;
        let clips: BTreeMap<PlaceholderId, ClipShape> = inputs
            .view
            .placeholders
            .iter()
            .map(|p| (p.id.clone(), p.clip_shape(&inputs.geometry)))
            .collect();

        let mut st = FrameState {
            frame: self.pool.borrow(size),
            size,
            scene,
            settings: inputs.settings.clamped(),
            clips,
            live: Vec::new(),
            notices: Vec::new(),
            notified: BTreeSet::new(),
        };

        self.sync_garment(&mut st, inputs);
        if let Some(g) = st.scene.garment().cloned() {
            match self.raster.draw_image_into(&g.image, g.placement, &mut st.frame) {
                Ok(()) => {
                    if let Some(tint) = inputs.tint {
                        tint_multiply_in_place(st.frame.data_as_u8_slice_mut(), tint);
                    }
                }
                Err(e) => st.notify(&image_error(&g.url, e)),
            }
        }
        st.scene.ensure_filter(st.settings.contrast_boost);

        let (default_mode, default_opacity) = inputs.blend.for_tint(inputs.tint);

        for (pid, url) in inputs.designs {
            let Some(clip) = st.clips.get(pid).cloned() else {
                continue;
            };
            let Some(img) = lookup_image(&mut st, inputs.assets, url) else {
                continue;
            };
            let rect = fit_contain(f64::from(img.width), f64::from(img.height), clip.bounds());
            let mut layer = self.pool.borrow(size);
            if let Err(e) = self.raster.draw_image_into(&img, rect, &mut layer) {
                st.notify(&image_error(url, e));
                self.pool.release(layer);
                continue;
            }
            self.composite_layer(
                &mut st,
                layer,
                LayerKey::Design(pid.clone()),
                Some(&clip),
                default_mode,
                default_opacity,
            )?;
        }

        for el in inputs.elements {
            if !el.visible || !el.shows_on(&inputs.view.id) {
                continue;
            }
            let image = match &el.kind {
                ElementKind::Image(props) => match lookup_image(&mut st, inputs.assets, &props.src)
                {
                    Some(img) => Some(img),
                    None => continue,
                },
                _ => None,
            };
            let draw = DrawInputs {
                fonts: inputs.fonts,
                measure: inputs.measure,
                image: image.as_ref(),
            };
            let mut layer = self.pool.borrow(size);
            match self.raster.draw_element(el, &draw, &mut layer) {
                Ok(true) => {}
                Ok(false) => {
                    self.pool.release(layer);
                    continue;
                }
                Err(e) => {
                    let e = match &el.kind {
                        ElementKind::Image(props) => image_error(&props.src, e),
                        _ => e,
                    };
                    st.notify(&e);
                    self.pool.release(layer);
                    continue;
                }
            }
            let clip = el
                .placeholder_id
                .as_ref()
                .and_then(|pid| st.clips.get(pid))
                .cloned();
            let (mode, opacity) = match el.blend_mode {
                Some(mode) => (mode, el.opacity),
                None => (default_mode, default_opacity * el.opacity),
            };
            self.composite_layer(
                &mut st,
                layer,
                LayerKey::Element(el.id.clone()),
                clip.as_ref(),
                mode,
                opacity,
            )?;
        }

        st.scene.retain_layers(&st.live);

        let frame = FrameRGBA {
            width: w,
            height: h,
            data: st.frame.data_as_u8_slice().to_vec(),
            premultiplied: true,
        };
        let overlay = (inputs.mode == RenderMode::Edit).then(|| {
            OverlayScene::build(
                inputs.view,
                &inputs.geometry,
                inputs.elements,
                inputs.measure,
                inputs.selected,
            )
        });
        self.pool.release(st.frame);
        self.raster.sweep_paints();
        tracing::trace!(view = %inputs.view.id, pool = ?self.pool.stats(), "frame rendered");

        Ok(RenderOutput {
            frame,
            overlay,
            notices: st.notices,
        })
    }

    /// Bring the scene's garment in line with the view's garment asset.
    fn sync_garment(&mut self, st: &mut FrameState<'_>, inputs: &ViewFrameInputs<'_>) {
        let Some(url) = inputs.view.garment_url.as_deref() else {
            st.scene.teardown();
            return;
        };
        match inputs.assets.state(AssetKind::Garment, url) {
            Some(AssetState::Ready(img)) => {
                if st.scene.garment_url() != Some(url) {
                    self.raster.clear_paints();
                }
                st.scene.set_garment(url, img.clone(), &inputs.layout);
            }
            Some(AssetState::Failed(reason)) => {
                st.scene.teardown();
                st.notify(&DrapeError::asset_load(url, reason.as_str()));
            }
            Some(AssetState::Pending) | None => {
                if st.scene.garment_url() != Some(url) {
                    st.scene.teardown();
                }
            }
        }
    }

    /// Warp, clip, and blend a canvas-sized layer onto the frame. The layer returns to the pool.
    fn composite_layer(
        &mut self,
        st: &mut FrameState<'_>,
        mut layer: vello_cpu::Pixmap,
        key: LayerKey,
        clip: Option<&ClipShape>,
        mode: BlendMode,
        opacity: f32,
    ) -> DrapeResult<()> {
        st.scene.bind(key.clone());
        st.live.push(key);

        if let Some(filter) = st.scene.filter() {
            let mut warped = self.pool.borrow(st.size);
            let res = filter.apply(
                layer.data_as_u8_slice(),
                warped.data_as_u8_slice_mut(),
                u32::from(st.size.width),
                u32::from(st.size.height),
                &st.settings,
            );
            self.pool.release(std::mem::replace(&mut layer, warped));
            if let Err(e) = res {
                self.pool.release(layer);
                return Err(e);
            }
        }

        if let Some(clip) = clip {
            let mut mask = self.pool.borrow(st.size);
            let res = self.raster.draw_clip_mask(clip, &mut mask).and_then(|()| {
                mask_apply_alpha_in_place(layer.data_as_u8_slice_mut(), mask.data_as_u8_slice())
            });
            self.pool.release(mask);
            if let Err(e) = res {
                self.pool.release(layer);
                return Err(e);
            }
        }

        let res = composite_over_rgba8_premul(
            st.frame.data_as_u8_slice_mut(),
            layer.data_as_u8_slice(),
            opacity,
            mode,
        );
        self.pool.release(layer);
        res
    }
}

fn lookup_image(
    st: &mut FrameState<'_>,
    assets: &AssetStore,
    url: &str,
) -> Option<Arc<PreparedImage>> {
    match assets.state(AssetKind::Design, url) {
        Some(AssetState::Ready(img)) => Some(img.clone()),
        Some(AssetState::Failed(reason)) => {
            st.notify(&DrapeError::asset_load(url, reason.as_str()));
            None
        }
        Some(AssetState::Pending) => None,
        None => {
            st.notify(&DrapeError::asset_load(url, "not loaded"));
            None
        }
    }
}

/// A draw failure attributed to the image at `url`, so it is reported once per asset.
fn image_error(url: &str, err: DrapeError) -> DrapeError {
    match err {
        e @ DrapeError::AssetLoad { .. } => e,
        other => DrapeError::asset_load(url, other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
