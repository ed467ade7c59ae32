use std::collections::{BTreeMap, BTreeSet};

use crate::assets::decode::{PreparedImage, decode_design, decode_image};
use crate::assets::loader::{
    Clock, LoadTarget, LoadTicket, LoadTracker, SystemClock, TicketRejection,
};
use crate::assets::source::AssetSource;
use crate::assets::store::{AssetKind, AssetState, AssetStore};
use crate::cache::{
    CacheDecision, CacheKey, PreviewCacheManager, Signature, design_signature, settings_signature,
};
use crate::config::EngineConfig;
use crate::displacement::DisplacementSettings;
use crate::document::history::History;
use crate::document::persisted::PersistedDesign;
use crate::document::{DesignDocument, ElementsSnapshot};
use crate::foundation::core::{ElementId, PlaceholderId, Point, Rgb8, ViewId};
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::notice::Notice;
use crate::geometry::units::ViewGeometry;
use crate::interaction::commands;
use crate::interaction::controller::{
    EditOutcome, GestureEnd, GestureState, InteractionController, PointerTarget,
};
use crate::interaction::scope::EditScope;
use crate::model::element::{ElementKind, ShapeKind};
use crate::model::update::ElementUpdate;
use crate::model::view::ViewSpec;
use crate::persist::{PersistenceSink, SnapshotRef};
use crate::render::backend::FrameRGBA;
use crate::render::overlay::OverlayScene;
use crate::render::pipeline::{
    BlendDefaults, RenderMode, RenderOutput, ViewFrameInputs, ViewRenderer,
};
use crate::render::scene::ViewScene;
use crate::text::layout::FontBook;
use crate::text::measure::{ApproxTextMeasure, ParleyTextMeasure, TextMeasure};

/// Pixels shown for a frame.
#[derive(Clone, Debug)]
pub enum FrameImage {
    /// A persisted snapshot still describes the view.
    Cached(SnapshotRef),
    Live(FrameRGBA),
}

#[derive(Clone, Debug)]
pub struct FrameResult {
    pub view: ViewId,
    pub image: FrameImage,
    /// Present in [`RenderMode::Edit`].
    pub overlay: Option<OverlayScene>,
    /// Snapshot stored by this frame's auto-persist.
    pub persisted: Option<SnapshotRef>,
}

/// Outcome of an explicit save.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SaveReport {
    pub snapshots: Vec<SnapshotRef>,
    /// Views whose capture failed; they stay dirty.
    pub failed: Vec<ViewId>,
}

/// One editing session over a garment's views.
///
/// Owns the design document, decoded assets, per-view render scenes, the gesture controller,
/// undo history, and the preview cache. Hosts drive it with pointer events and commands, feed it
/// asset bytes, and pull frames.
pub struct MockupSession {
    config: EngineConfig,
    doc: DesignDocument,
    active: ViewId,
    assets: AssetStore,
    loads: LoadTracker,
    clock: Box<dyn Clock>,
    fonts: FontBook,
    measure: ParleyTextMeasure,
    scenes: BTreeMap<ViewId, ViewScene>,
    renderer: ViewRenderer,
    controller: InteractionController,
    history: History<ElementsSnapshot>,
    gesture_before: Option<(ElementsSnapshot, BTreeMap<ViewId, Signature>)>,
    cache: PreviewCacheManager,
    notices: Vec<Notice>,
    reported_urls: BTreeSet<String>,
}

impl MockupSession {
    pub fn new(config: EngineConfig, views: Vec<ViewSpec>) -> DrapeResult<Self> {
        config.validate()?;
        let doc = DesignDocument::new(views)?;
        Self::with_document(config, doc)
    }

    /// Resume a saved design over the catalog's current views.
    pub fn from_saved(config: EngineConfig, views: Vec<ViewSpec>, json: &str) -> DrapeResult<Self> {
        config.validate()?;
        let persisted = PersistedDesign::from_json(json)?;
        let doc = DesignDocument::from_persisted(views, persisted)?;
        Self::with_document(config, doc)
    }

    fn with_document(config: EngineConfig, doc: DesignDocument) -> DrapeResult<Self> {
        let active = doc
            .view_ids()
            .first()
            .cloned()
            .ok_or_else(|| DrapeError::validation("a design needs at least one view"))?;
        let scenes = doc
            .view_ids()
            .iter()
            .map(|v| (v.clone(), ViewScene::new(v.clone())))
            .collect();
        let fonts = FontBook::new();
        Ok(Self {
            measure: ParleyTextMeasure::new(fonts.clone(), approx_measure(&config)),
            loads: LoadTracker::new(config.load_timeout_ms),
            history: History::new(config.history_depth),
            config,
            doc,
            active,
            assets: AssetStore::new(),
            clock: Box::new(SystemClock::new()),
            fonts,
            scenes,
            renderer: ViewRenderer::new(),
            controller: InteractionController::new(),
            gesture_before: None,
            cache: PreviewCacheManager::new(),
            notices: Vec::new(),
            reported_urls: BTreeSet::new(),
        })
    }

    /// Replace the clock that load timeouts are measured against.
    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Make a font available to text elements. Views re-render without auto-persisting.
    pub fn register_font(&mut self, family: impl Into<String>, bytes: Vec<u8>) {
        self.fonts.insert(family, bytes);
        self.measure = ParleyTextMeasure::new(self.fonts.clone(), approx_measure(&self.config));
        self.renderer.purge();
        self.cache.mark_color_changed(self.doc.view_ids());
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn document(&self) -> &DesignDocument {
        &self.doc
    }

    pub fn active_view(&self) -> &ViewId {
        &self.active
    }

    pub fn selected(&self) -> Option<&ElementId> {
        self.controller.selected()
    }

    pub fn select(&mut self, id: Option<ElementId>) {
        self.controller.select(id);
    }

    pub fn gesture(&self) -> &GestureState {
        self.controller.state()
    }

    pub fn cache(&self) -> &PreviewCacheManager {
        &self.cache
    }

    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    pub fn scene(&self, view: &ViewId) -> Option<&ViewScene> {
        self.scenes.get(view)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.history.undo_label()
    }

    pub fn geometry(&self, view: &ViewId) -> DrapeResult<ViewGeometry> {
        Ok(view_geometry(&self.config, &self.doc.require_view(view)?.spec))
    }

    /// Make `view` active. An in-flight gesture ends first, and loads issued for the previous
    /// view are cancelled so their late results are dropped.
    #[tracing::instrument(level = "debug", skip(self), fields(from = %self.active))]
    pub fn switch_view(&mut self, view: &ViewId) -> DrapeResult<()> {
        self.doc.require_view(view)?;
        if *view == self.active {
            return Ok(());
        }
        self.pointer_up()?;
        self.invalidate_loads();
        self.controller.select(None);
        self.active = view.clone();
        Ok(())
    }

    /// Set the garment tint from `#RRGGBB`. Invalid input clears the tint.
    ///
    /// Every view becomes dirty, but nothing is persisted until a design edit or save.
    pub fn set_garment_color(&mut self, hex: Option<&str>) {
        let color = hex.and_then(|s| match Rgb8::from_hex(s) {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(input = s, error = %e, "ignoring garment colour");
                None
            }
        });
        if color == self.doc.garment_color {
            return;
        }
        self.doc.garment_color = color;
        self.cache.mark_color_changed(self.doc.view_ids());
    }

    pub fn set_settings(&mut self, settings: DisplacementSettings) {
        let settings = settings.clamped();
        if settings == self.doc.settings {
            return;
        }
        self.doc.settings = settings;
        self.cache.mark_color_changed(self.doc.view_ids());
    }

    /// Point `view` at a new garment photo. The view's scene is torn down and outstanding loads
    /// are cancelled.
    pub fn set_garment_url(&mut self, view: &ViewId, url: Option<String>) -> DrapeResult<()> {
        let spec = &mut self.doc.view_mut(view)?.spec;
        if spec.garment_url == url {
            return Ok(());
        }
        spec.garment_url = url;
        if let Some(scene) = self.scenes.get_mut(view) {
            scene.teardown();
        }
        self.invalidate_loads();
        self.cache.mark_color_changed(std::iter::once(view));
        Ok(())
    }

    /// Attach an uploaded design to a region of the active view.
    pub fn upload_design(&mut self, placeholder: &PlaceholderId, url: &str) -> DrapeResult<()> {
        let before = self.design_signatures();
        self.doc.set_design(&self.active, placeholder, url)?;
        self.mark_changed_views(&before);
        Ok(())
    }

    pub fn clear_design(&mut self, placeholder: &PlaceholderId) -> DrapeResult<bool> {
        let before = self.design_signatures();
        let removed = self.doc.clear_design(&self.active, placeholder)?;
        self.mark_changed_views(&before);
        Ok(removed)
    }

    pub fn add_text(
        &mut self,
        placeholder: Option<&PlaceholderId>,
        text: &str,
    ) -> DrapeResult<ElementId> {
        let id = self.edit("add text", |s, _| commands::add_text(s, placeholder, text, None))?;
        self.controller.select(Some(id.clone()));
        Ok(id)
    }

    pub fn add_shape(
        &mut self,
        placeholder: Option<&PlaceholderId>,
        kind: ShapeKind,
    ) -> DrapeResult<ElementId> {
        let id = self.edit("add shape", |s, _| commands::add_shape(s, placeholder, kind))?;
        self.controller.select(Some(id.clone()));
        Ok(id)
    }

    /// Load `src` now, then add it fitted to the target region.
    pub fn add_image(
        &mut self,
        placeholder: Option<&PlaceholderId>,
        src: &str,
        source: &dyn AssetSource,
    ) -> DrapeResult<ElementId> {
        let (w, h) = match self.assets.state(AssetKind::Design, src) {
            Some(AssetState::Ready(img)) => (img.width, img.height),
            _ => {
                let img = source
                    .fetch(src)
                    .and_then(|bytes| decode_design(&bytes))
                    .map_err(|e| load_error(src, &e));
                match img {
                    Ok(img) => {
                        let dims = (img.width, img.height);
                        self.assets.insert_ready(AssetKind::Design, src, img);
                        self.reported_urls.remove(src);
                        dims
                    }
                    Err(e) => {
                        self.assets
                            .insert_failed(AssetKind::Design, src, failure_reason(&e));
                        self.report(Notice::from(&e));
                        return Err(e);
                    }
                }
            }
        };
        let id = self.edit("add image", |s, _| commands::add_image(s, placeholder, src, w, h))?;
        self.controller.select(Some(id.clone()));
        Ok(id)
    }

    pub fn duplicate(&mut self, id: &ElementId) -> DrapeResult<ElementId> {
        let copy = self.edit("duplicate", |s, _| commands::duplicate(s, id))?;
        self.controller.select(Some(copy.clone()));
        Ok(copy)
    }

    pub fn delete(&mut self, id: &ElementId) -> DrapeResult<()> {
        if self.controller.is_busy(id) {
            return Err(DrapeError::validation(format!("element '{id}' is being edited")));
        }
        self.edit("delete", |s, _| commands::delete(s, id))?;
        if self.controller.selected() == Some(id) {
            self.controller.select(None);
        }
        Ok(())
    }

    pub fn nudge(&mut self, id: &ElementId, steps_x: i32, steps_y: i32) -> DrapeResult<bool> {
        if self.controller.is_busy(id) {
            return Ok(false);
        }
        let moved = self.edit("nudge", |s, _| commands::nudge(s, id, steps_x, steps_y))?;
        Ok(moved.is_some())
    }

    pub fn bring_to_front(&mut self, id: &ElementId) -> DrapeResult<bool> {
        Ok(self
            .edit("bring to front", |s, _| commands::bring_to_front(s, id))?
            .is_some())
    }

    pub fn send_to_back(&mut self, id: &ElementId) -> DrapeResult<bool> {
        Ok(self
            .edit("send to back", |s, _| commands::send_to_back(s, id))?
            .is_some())
    }

    /// A property-panel edit. Refused while the element is mid-gesture.
    pub fn update_element(
        &mut self,
        id: &ElementId,
        update: &ElementUpdate,
    ) -> DrapeResult<EditOutcome> {
        self.edit("edit", |s, c| c.property_edit(s, id, update))
    }

    /// An edit issued by the host rather than the user. Deferred while the element is
    /// mid-gesture.
    pub fn programmatic_update(
        &mut self,
        id: &ElementId,
        update: ElementUpdate,
    ) -> DrapeResult<EditOutcome> {
        self.edit("update", |s, c| c.programmatic_update(s, id, update))
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(true)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(false)
    }

    fn step_history(&mut self, back: bool) -> bool {
        if !matches!(self.controller.state(), GestureState::Idle) {
            return false;
        }
        let before = self.design_signatures();
        let current = self.doc.elements_snapshot();
        let restored = if back {
            self.history.undo(current)
        } else {
            self.history.redo(current)
        };
        let Some(snap) = restored else {
            return false;
        };
        self.doc.restore_elements(snap);
        if let Some(sel) = self.controller.selected()
            && self.doc.element(sel).is_none()
        {
            self.controller.select(None);
        }
        self.mark_changed_views(&before);
        true
    }

    /// Overlay for the active view as the document stands now.
    pub fn overlay(&self) -> DrapeResult<OverlayScene> {
        let state = self.doc.require_view(&self.active)?;
        let geometry = view_geometry(&self.config, &state.spec);
        let elements = self.doc.effective_elements(&self.active);
        Ok(OverlayScene::build(
            &state.spec,
            &geometry,
            &elements,
            &self.measure,
            self.controller.selected(),
        ))
    }

    pub fn pointer_down(&mut self, p: Point) -> DrapeResult<PointerTarget> {
        self.pointer_up()?;
        let overlay = self.overlay()?;
        let before = (self.doc.elements_snapshot(), self.design_signatures());
        let scope = edit_scope(&mut self.doc, &self.active, &self.config, &self.measure)?;
        let target = self.controller.pointer_down(&scope, &overlay, p)?;
        if matches!(target, PointerTarget::Gesture(_)) {
            self.gesture_before = Some(before);
        }
        Ok(target)
    }

    pub fn pointer_move(&mut self, p: Point) -> DrapeResult<Option<ElementUpdate>> {
        let mut scope = edit_scope(&mut self.doc, &self.active, &self.config, &self.measure)?;
        self.controller.pointer_move(&mut scope, p)
    }

    /// End the gesture, flush deferred updates, and record one undo step if anything changed.
    pub fn pointer_up(&mut self) -> DrapeResult<Option<GestureEnd>> {
        let mut scope = edit_scope(&mut self.doc, &self.active, &self.config, &self.measure)?;
        let end = self.controller.pointer_up(&mut scope)?;
        let before = self.gesture_before.take();
        if let (Some(end), Some((snapshot, signatures))) = (&end, before)
            && end.changed
        {
            self.history.record(end.kind.label(), snapshot);
            self.mark_changed_views(&signatures);
        }
        Ok(end)
    }

    pub fn pending_loads(&self) -> usize {
        self.loads.pending_count()
    }

    /// Issue tickets for every asset `view` needs that is not loaded or loading.
    pub fn request_loads(&mut self, view: &ViewId) -> DrapeResult<Vec<LoadTicket>> {
        let state = self.doc.require_view(view)?;
        let mut wanted: Vec<(String, LoadTarget)> = Vec::new();
        if let Some(url) = &state.spec.garment_url {
            wanted.push((url.clone(), LoadTarget::Garment { view: view.clone() }));
        }
        for (pid, url) in &state.designs {
            wanted.push((
                url.clone(),
                LoadTarget::Design {
                    placeholder: pid.clone(),
                },
            ));
        }
        for el in self.doc.effective_elements(view) {
            if let ElementKind::Image(img) = &el.kind {
                wanted.push((img.src.clone(), LoadTarget::ElementImage));
            }
        }

        let now = self.clock.now_ms();
        let mut issued = Vec::new();
        for (url, target) in wanted {
            let kind = target.asset_kind();
            if !self.assets.needs_load(kind, &url) {
                continue;
            }
            self.assets.mark_pending(kind, &url);
            issued.push(self.loads.begin(url, target, now));
        }
        Ok(issued)
    }

    /// Fetch and decode every outstanding ticket from `source`. Returns how many were applied.
    pub fn pump_loads(&mut self, source: &dyn AssetSource) -> usize {
        let tickets: Vec<LoadTicket> = self.loads.pending().cloned().collect();
        let mut applied = 0;
        for t in tickets {
            let decoded = source.fetch(&t.url).and_then(|bytes| match t.target.asset_kind() {
                AssetKind::Garment => decode_image(&bytes),
                AssetKind::Design => decode_design(&bytes),
            });
            if self.complete_load(&t, decoded) {
                applied += 1;
            }
        }
        applied
    }

    /// Deliver a load result. Results for stale, unknown, or late tickets are dropped; late ones
    /// are reported as failures. Returns whether the result was applied.
    pub fn complete_load(
        &mut self,
        ticket: &LoadTicket,
        result: DrapeResult<PreparedImage>,
    ) -> bool {
        let kind = ticket.target.asset_kind();
        let url = ticket.url.as_str();
        match self.loads.complete(ticket, self.clock.now_ms()) {
            Ok(()) => match result {
                Ok(img) => {
                    self.assets.insert_ready(kind, url, img);
                    self.reported_urls.remove(url);
                    true
                }
                Err(e) => {
                    let err = load_error(url, &e);
                    self.assets.insert_failed(kind, url, failure_reason(&err));
                    self.report(Notice::from(&err));
                    true
                }
            },
            Err(TicketRejection::TimedOut) => {
                self.fail_timed_out(ticket);
                false
            }
            Err(reason) => {
                tracing::debug!(url, ?reason, "load result dropped");
                false
            }
        }
    }

    /// Forget failed assets so the next frame requests them again.
    pub fn retry_failed_loads(&mut self) {
        let failed: Vec<(AssetKind, String)> = self
            .doc
            .view_ids()
            .iter()
            .flat_map(|v| self.asset_urls(v))
            .filter(|(kind, url)| self.assets.failure(*kind, url).is_some())
            .collect();
        for (kind, url) in failed {
            self.assets.release(kind, &url);
            self.reported_urls.remove(&url);
        }
    }

    fn asset_urls(&self, view: &ViewId) -> Vec<(AssetKind, String)> {
        let Some(state) = self.doc.view(view) else {
            return Vec::new();
        };
        let mut out: Vec<(AssetKind, String)> = state
            .spec
            .garment_url
            .iter()
            .map(|u| (AssetKind::Garment, u.clone()))
            .collect();
        out.extend(state.designs.values().map(|u| (AssetKind::Design, u.clone())));
        out.extend(
            self.doc
                .effective_elements(view)
                .into_iter()
                .filter_map(|el| match el.kind {
                    ElementKind::Image(img) => Some((AssetKind::Design, img.src)),
                    _ => None,
                }),
        );
        out
    }

    fn expire_loads(&mut self) {
        for t in self.loads.take_expired(self.clock.now_ms()) {
            self.fail_timed_out(&t);
        }
    }

    fn fail_timed_out(&mut self, ticket: &LoadTicket) {
        let reason = format!("timed out after {} ms", self.loads.timeout_ms());
        self.assets
            .insert_failed(ticket.target.asset_kind(), &ticket.url, reason.as_str());
        self.report(Notice::asset_load(ticket.url.as_str(), reason));
    }

    fn invalidate_loads(&mut self) {
        self.loads.invalidate();
        self.assets.clear_pending();
    }

    /// Produce the active view's frame.
    ///
    /// Dirty views render live. A view with a pending design change is captured and stored
    /// through `sink` once all of its assets have settled; if that fails the view stays dirty
    /// and a retryable notice is queued.
    #[tracing::instrument(level = "debug", skip(self, sink), fields(view = %self.active))]
    pub fn render_frame(
        &mut self,
        mode: RenderMode,
        sink: &mut dyn PersistenceSink,
    ) -> DrapeResult<FrameResult> {
        let view = self.active.clone();
        self.expire_loads();
        self.request_loads(&view)?;
        let key = self.cache_key(&view)?;

        if let CacheDecision::Cached(snapshot) = self.cache.decide(&key) {
            let overlay = match mode {
                RenderMode::Edit => Some(self.overlay()?),
                RenderMode::Preview => None,
            };
            return Ok(FrameResult {
                view,
                image: FrameImage::Cached(snapshot),
                overlay,
                persisted: None,
            });
        }

        let output = self.render_live(&view, mode)?;
        for n in output.notices {
            self.report(n);
        }
        let persisted = if self.cache.should_auto_persist(&view) && self.loads.pending_count() == 0
        {
            self.capture(key, &output.frame, sink)
        } else {
            None
        };
        Ok(FrameResult {
            view,
            image: FrameImage::Live(output.frame),
            overlay: output.overlay,
            persisted,
        })
    }

    /// Store the design JSON, then capture every dirty view with assets from `source`.
    ///
    /// A failed design store is returned as an error; failed captures are reported and leave
    /// their views dirty.
    pub fn save(
        &mut self,
        sink: &mut dyn PersistenceSink,
        source: &dyn AssetSource,
    ) -> DrapeResult<SaveReport> {
        let json = self.doc.to_persisted().to_json()?;
        if let Err(e) = sink.store_design(&json) {
            self.report(Notice::from(&e));
            return Err(e);
        }

        let mut report = SaveReport::default();
        for view in self.cache.dirty_views() {
            self.request_loads(&view)?;
            self.pump_loads(source);
            let key = self.cache_key(&view)?;
            let output = self.render_live(&view, RenderMode::Preview)?;
            for n in output.notices {
                self.report(n);
            }
            match self.capture(key, &output.frame, sink) {
                Some(snap) => report.snapshots.push(snap),
                None => report.failed.push(view),
            }
        }
        tracing::info!(
            captured = report.snapshots.len(),
            failed = report.failed.len(),
            "design saved"
        );
        Ok(report)
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn capture(
        &mut self,
        key: CacheKey,
        frame: &FrameRGBA,
        sink: &mut dyn PersistenceSink,
    ) -> Option<SnapshotRef> {
        match frame
            .to_png()
            .and_then(|png| sink.store_snapshot(&key.view, &png))
        {
            Ok(snapshot) => {
                tracing::debug!(view = %key.view, location = %snapshot.location, "snapshot stored");
                self.cache.record_capture(key, snapshot.clone());
                Some(snapshot)
            }
            Err(e) => {
                tracing::warn!(view = %key.view, error = %e, "snapshot not stored");
                self.report(Notice::from(&e));
                None
            }
        }
    }

    fn render_live(&mut self, view: &ViewId, mode: RenderMode) -> DrapeResult<RenderOutput> {
        let state = self.doc.require_view(view)?;
        let elements = self.doc.effective_elements(view);
        let scene = self
            .scenes
            .entry(view.clone())
            .or_insert_with(|| ViewScene::new(view.clone()));
        let inputs = ViewFrameInputs {
            view: &state.spec,
            layout: self.config.canvas,
            geometry: view_geometry(&self.config, &state.spec),
            elements: &elements,
            designs: &state.designs,
            tint: self.doc.garment_color,
            settings: self.doc.settings,
            assets: &self.assets,
            fonts: &self.fonts,
            measure: &self.measure,
            blend: BlendDefaults {
                dark_threshold: self.config.dark_luminance_threshold,
                light_opacity: self.config.light_default_opacity,
            },
            mode,
            selected: self.controller.selected(),
        };
        self.renderer.render_view(scene, &inputs)
    }

    fn cache_key(&self, view: &ViewId) -> DrapeResult<CacheKey> {
        let state = self.doc.require_view(view)?;
        Ok(CacheKey {
            view: view.clone(),
            color: self.doc.garment_color,
            design: design_signature(view, &state.designs, &self.doc.effective_elements(view)),
            settings: settings_signature(&self.doc.settings),
        })
    }

    /// Run one edit against the active view. A change records an undo step and dirties every
    /// view whose design it touched.
    fn edit<R>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut EditScope<'_>, &mut InteractionController) -> DrapeResult<R>,
    ) -> DrapeResult<R> {
        let signatures = self.design_signatures();
        let before = self.doc.elements_snapshot();
        let out = {
            let mut scope = edit_scope(&mut self.doc, &self.active, &self.config, &self.measure)?;
            f(&mut scope, &mut self.controller)?
        };
        if self.doc.elements_snapshot() != before {
            self.history.record(label, before);
            self.mark_changed_views(&signatures);
        }
        Ok(out)
    }

    fn design_signatures(&self) -> BTreeMap<ViewId, Signature> {
        self.doc
            .view_ids()
            .iter()
            .filter_map(|v| {
                let state = self.doc.view(v)?;
                let sig = design_signature(v, &state.designs, &self.doc.effective_elements(v));
                Some((v.clone(), sig))
            })
            .collect()
    }

    fn mark_changed_views(&mut self, before: &BTreeMap<ViewId, Signature>) {
        for (view, sig) in self.design_signatures() {
            if before.get(&view) != Some(&sig) {
                self.cache.mark_design_changed(&view);
            }
        }
    }

    /// Queue a notice. Asset failures are reported once per URL until the URL loads again.
    fn report(&mut self, notice: Notice) {
        if let Some(url) = &notice.url
            && !self.reported_urls.insert(url.clone())
        {
            return;
        }
        self.notices.push(notice);
    }
}

fn approx_measure(config: &EngineConfig) -> ApproxTextMeasure {
    ApproxTextMeasure {
        advance_em: config.glyph_advance_em,
        line_height: config.line_height,
    }
}

fn view_geometry(config: &EngineConfig, spec: &ViewSpec) -> ViewGeometry {
    spec.geometry(
        &config.canvas,
        config.default_physical_size,
        config.fallback_px_per_inch,
    )
}

fn edit_scope<'a>(
    doc: &'a mut DesignDocument,
    view: &ViewId,
    config: &'a EngineConfig,
    measure: &'a dyn TextMeasure,
) -> DrapeResult<EditScope<'a>> {
    let geometry = view_geometry(config, &doc.require_view(view)?.spec);
    Ok(EditScope {
        doc,
        view: view.clone(),
        geometry,
        config,
        measure,
    })
}

/// Any fetch or decode failure, as an asset-load error for `url`.
fn load_error(url: &str, e: &DrapeError) -> DrapeError {
    match e {
        DrapeError::AssetLoad { url, reason } => {
            DrapeError::asset_load(url.as_str(), reason.as_str())
        }
        other => DrapeError::asset_load(url, other.to_string()),
    }
}

fn failure_reason(e: &DrapeError) -> String {
    match e {
        DrapeError::AssetLoad { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/mockup.rs"]
mod tests;
